use leptos::prelude::*;

use hexworld_shared::api::{MAX_MAP_SIZE, MIN_MAP_SIZE, clamp_map_size};
use hexworld_shared::terrain::TERRAIN_TYPES;

use crate::app::{AppConfig, Brush, EditMode, GenerateSize, HexSize, ShowCoords, Store};
use crate::map_view::center_on_home;
use crate::viewport::{ViewportController, ZOOM_STEP};

const BAR_STYLE: &str = "position: absolute; top: 0; left: 0; right: 0; z-index: 10; display: flex; flex-wrap: wrap; align-items: center; gap: 8px; padding: 8px 12px; background: rgba(16,19,28,0.92); border-bottom: 1px solid #282c3e; font-family: 'Inter', system-ui, sans-serif; font-size: 0.8rem; color: #e2e0d8;";
const READOUT_STYLE: &str =
    "font-family: 'JetBrains Mono', monospace; font-size: 0.72rem; color: #7c829e; min-width: 42px; text-align: center;";

fn button_style(active: bool) -> String {
    format!(
        "padding: 4px 10px; border: 1px solid #282c3e; border-radius: 4px; background: {}; color: {}; cursor: pointer; font-size: 0.75rem;",
        if active { "rgba(245,197,66,0.12)" } else { "#1a1d2a" },
        if active { "#f5c542" } else { "#c8c6be" },
    )
}

/// Parse the generate-size input. Out-of-range numbers are clamped; anything
/// unparseable is rejected.
pub(crate) fn parse_map_size(raw: &str) -> Option<u32> {
    let value: i64 = raw.trim().parse().ok()?;
    let bounded = value.clamp(0, i64::from(MAX_MAP_SIZE));
    u32::try_from(bounded).ok().map(clamp_map_size)
}

/// Header bar: admin editing tools, navigation and status readouts.
#[component]
pub fn MapHeader() -> impl IntoView {
    let store = expect_context::<Store>();
    let controller = expect_context::<ViewportController>();
    let config = expect_context::<AppConfig>();
    let ShowCoords(show_coords) = expect_context::<ShowCoords>();
    let HexSize(hex_size) = expect_context::<HexSize>();
    let EditMode(edit_mode) = expect_context::<EditMode>();
    let Brush(brush) = expect_context::<Brush>();
    let GenerateSize(generate_size) = expect_context::<GenerateSize>();
    let world = store.world();
    let status = store.status();
    let zoom = controller.zoom_percent();

    let on_save = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if store.save().await {
                    leptos::logging::log!(
                        "worldmap saved at version {}",
                        store.world().with_untracked(|w| w.version)
                    );
                }
            });
        }
    };

    let on_generate = {
        let store = store.clone();
        move |_| {
            let size = clamp_map_size(generate_size.get_untracked());
            generate_size.set(size);
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if store.generate(size).await {
                    controller.reset();
                }
            });
        }
    };

    let on_home = {
        let store = store.clone();
        move |_| center_on_home(&store, controller, hex_size.get_untracked())
    };

    let admin_tools = config.is_admin.then(|| {
        view! {
            <button
                style=move || button_style(edit_mode.get())
                on:click=move |_| edit_mode.update(|v| *v = !*v)
            >
                {move || if edit_mode.get() { "Editing" } else { "Edit" }}
            </button>
            <Show when=move || edit_mode.get()>
                <select
                    style="padding: 3px 6px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; color: #e2e0d8; font-size: 0.75rem;"
                    prop:value=move || brush.get()
                    on:change=move |ev| {
                        let key = event_target_value(&ev);
                        if let Some(t) = TERRAIN_TYPES.iter().find(|t| t.key == key) {
                            brush.set(t.key);
                        }
                    }
                >
                    {TERRAIN_TYPES
                        .iter()
                        .map(|t| view! { <option value=t.key>{format!("{} {}", t.icon, t.name)}</option> })
                        .collect_view()}
                </select>
            </Show>
            <button style=button_style(false) on:click=on_save.clone()>"Save"</button>
            <input
                type="number"
                min=MIN_MAP_SIZE.to_string()
                max=MAX_MAP_SIZE.to_string()
                style="width: 56px; padding: 3px 6px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; color: #e2e0d8; font-size: 0.75rem;"
                prop:value=move || generate_size.get().to_string()
                on:change=move |ev| {
                    if let Some(size) = parse_map_size(&event_target_value(&ev)) {
                        generate_size.set(size);
                    }
                }
            />
            <button style=button_style(false) on:click=on_generate.clone()>"Generate"</button>
        }
    });

    view! {
        <div class="map-header" style=BAR_STYLE>
            {admin_tools}
            <button style=button_style(false) on:click=on_home title="Center on home (h)">
                "Home"
            </button>
            <button
                style=move || button_style(show_coords.get())
                on:click=move |_| show_coords.update(|v| *v = !*v)
                title="Toggle coordinates (c)"
            >
                "Coords"
            </button>
            <button style=button_style(false) on:click=move |_| controller.zoom_by(-ZOOM_STEP)>
                "\u{2212}"
            </button>
            <span style=READOUT_STYLE>{move || format!("{}%", zoom.get())}</span>
            <button style=button_style(false) on:click=move |_| controller.zoom_by(ZOOM_STEP)>
                "+"
            </button>
            <span style=READOUT_STYLE>{move || format!("v{}", world.with(|w| w.version))}</span>
            <Show when=move || status.with(|s| s.loading())>
                <span class="status-pulse" style="font-size: 0.72rem; color: #7c829e;">"Loading..."</span>
            </Show>
            <ErrorBanner />
        </div>
    }
}

#[component]
fn ErrorBanner() -> impl IntoView {
    let store = expect_context::<Store>();
    let status = store.status();
    let world = store.world();

    move || {
        let message = status.with(|s| s.error.clone())?;
        // The full-screen retry already shows this one.
        if world.with(|w| w.is_empty()) {
            return None;
        }
        let store = store.clone();
        Some(view! {
            <div
                role="alert"
                style="display: flex; align-items: center; gap: 8px; margin-left: auto; padding: 4px 10px; background: rgba(229,115,115,0.12); border: 1px solid #e57373; border-radius: 4px; color: #e57373; font-size: 0.75rem;"
            >
                <span>{message}</span>
                <button
                    style="border: none; background: transparent; color: #e57373; cursor: pointer;"
                    on:click=move |_| store.clear_error()
                >
                    "\u{00D7}"
                </button>
            </div>
        })
    }
}
