use leptos::ev;
use leptos::prelude::*;
use web_sys::{PointerEvent, WheelEvent};

use hexworld_shared::{Hex, Tile, hex_path};

use crate::app::{Brush, EditMode, HexSize, ShowCoords, Store};
use crate::controls::MapHeader;
use crate::detail_panel::DetailPanel;
use crate::tile_cell::{CellProps, TileCell, pattern_defs};
use crate::viewport::ViewportController;

/// Scroll the scene to the current user's home tile and select it.
pub(crate) fn center_on_home(store: &Store, controller: ViewportController, hex_size: f64) {
    let Some(home) = store.find_player_tile() else {
        leptos::logging::log!("no home tile for the current user");
        return;
    };
    controller.center_on(home.q, home.r, hex_size);
    store.select_tile(Some(home));
}

#[component]
pub fn MapView() -> impl IntoView {
    let store = expect_context::<Store>();
    let status = store.status();

    let retry = {
        let store = store.clone();
        move |_| {
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                store.load(None).await;
            });
        }
    };

    let needs_retry = {
        let store = store.clone();
        move || store.needs_retry()
    };

    view! {
        <MapHeader />
        <HexScene />
        <DetailPanel />
        <Show when=needs_retry>
            <div class="retry-screen" style="position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 12px; background: #10131c; color: #e2e0d8; z-index: 20;">
                <p style="margin: 0; font-size: 1.1rem;">"The world map could not be loaded."</p>
                <p style="margin: 0; color: #e57373;">
                    {move || status.with(|s| s.error.clone().unwrap_or_default())}
                </p>
                <button class="btn" on:click=retry.clone()>"Retry"</button>
            </div>
        </Show>
    }
}

/// The SVG map. Offsets and zoom are written straight onto the scene group by
/// the viewport controller, so panning never re-renders cells.
#[component]
fn HexScene() -> impl IntoView {
    let store = expect_context::<Store>();
    let controller = expect_context::<ViewportController>();
    let ShowCoords(show_coords) = expect_context::<ShowCoords>();
    let HexSize(hex_size) = expect_context::<HexSize>();
    let EditMode(edit_mode) = expect_context::<EditMode>();
    let Brush(brush) = expect_context::<Brush>();
    let world = store.world();
    let selected = store.selected();

    let container_ref = NodeRef::<leptos::html::Div>::new();
    let scene_ref = NodeRef::<leptos::svg::G>::new();
    let path = Memo::new(move |_| hex_path(hex_size.get()));
    // Set on pointerup when the press moved the map, cleared once the click
    // event has bubbled through.
    let just_dragged = StoredValue::new(false);

    Effect::new(move || {
        if scene_ref.get().is_some() {
            controller.attach(scene_ref);
        }
    });

    let resize = window_event_listener(ev::resize, move |_| controller.request_frame());
    on_cleanup(move || resize.remove());

    let on_pick = Callback::new({
        let store = store.clone();
        move |hex: Hex| {
            if just_dragged.get_value() {
                return;
            }
            let tile = world.with_untracked(|w| w.tiles.get(hex).cloned());
            if edit_mode.get_untracked() {
                let store = store.clone();
                let terrain = brush.get_untracked();
                wasm_bindgen_futures::spawn_local(async move {
                    store.update_tile(hex.q, hex.r, terrain).await;
                });
            }
            store.select_tile(tile);
        }
    });

    let on_pointer_down = move |e: PointerEvent| {
        if e.button() != 0 {
            return;
        }
        if controller.begin_drag(
            e.client_x() as f64,
            e.client_y() as f64,
            edit_mode.get_untracked(),
        ) {
            set_cursor(container_ref, "grabbing");
        }
    };

    let on_pointer_move = move |e: PointerEvent| {
        if controller.is_dragging() {
            controller.drag_to(e.client_x() as f64, e.client_y() as f64);
        }
    };

    let on_pointer_up = move |_: PointerEvent| {
        just_dragged.set_value(controller.end_drag());
        set_cursor(container_ref, "grab");
    };

    let on_pointer_leave = move |_: PointerEvent| {
        controller.end_drag();
        set_cursor(container_ref, "grab");
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        controller.zoom_wheel(e.delta_y());
    };

    let tile_keys = move || {
        world.with(|w| {
            w.tiles_sorted()
                .into_iter()
                .map(Tile::coord)
                .collect::<Vec<Hex>>()
        })
    };

    view! {
        <div
            node_ref=container_ref
            class="hex-scene"
            style="position: absolute; inset: 0; touch-action: none; cursor: grab;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:click=move |_| just_dragged.set_value(false)
        >
            <svg width="100%" height="100%" style="display: block;">
                <defs inner_html=pattern_defs() />
                <g node_ref=scene_ref>
                    <For
                        each=tile_keys
                        key=|hex| *hex
                        children=move |hex: Hex| {
                            let tile = Memo::new(move |_| world.with(|w| w.tiles.get(hex).cloned()));
                            let is_selected = Memo::new(move |_| {
                                selected.with(|s| s.as_ref().is_some_and(|t| t.coord() == hex))
                            });
                            let cell = Memo::new(move |_| {
                                tile.get().map(|tile| CellProps {
                                    tile,
                                    size: hex_size.get(),
                                    is_selected: is_selected.get(),
                                    is_edit_mode: edit_mode.get(),
                                    show_coords: show_coords.get(),
                                })
                            });
                            view! { <TileCell hex=hex cell=cell path=path on_pick=on_pick /> }
                        }
                    />
                </g>
            </svg>
        </div>
    }
}

fn set_cursor(container: NodeRef<leptos::html::Div>, cursor: &str) {
    if let Some(el) = container.get_untracked() {
        web_sys::HtmlElement::style(&el)
            .set_property("cursor", cursor)
            .ok();
    }
}
