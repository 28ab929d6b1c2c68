use std::cell::RefCell;

use gloo_storage::Storage;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use hexworld_shared::terrain::DEFAULT_TERRAIN;

use crate::map_view::{MapView, center_on_home};
use crate::store::MapStore;
use crate::transport::HttpTransport;
use crate::viewport::{ViewportController, ZOOM_STEP};

pub(crate) const SETTINGS_KEY: &str = "hexworld_settings";
pub(crate) const IDENTITY_KEY: &str = "hexworld_identity";

pub(crate) const DEFAULT_HEX_SIZE: f64 = 40.0;
pub(crate) const MIN_HEX_SIZE: f64 = 20.0;
pub(crate) const MAX_HEX_SIZE: f64 = 80.0;
const DEFAULT_GENERATE_SIZE: u32 = 30;

pub(crate) type Store = MapStore<HttpTransport>;

/// Newtype wrappers so each signal gets its own context slot.
#[derive(Clone, Copy)]
pub(crate) struct ShowCoords(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct HexSize(pub RwSignal<f64>);
#[derive(Clone, Copy)]
pub(crate) struct EditMode(pub RwSignal<bool>);
/// Terrain painted by edit-mode clicks.
#[derive(Clone, Copy)]
pub(crate) struct Brush(pub RwSignal<&'static str>);
#[derive(Clone, Copy)]
pub(crate) struct GenerateSize(pub RwSignal<u32>);

/// Capabilities handed to the map by whoever signed the user in.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct AppConfig {
    pub user_id: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub show_coords: bool,
    pub hex_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_coords: false,
            hex_size: DEFAULT_HEX_SIZE,
        }
    }
}

impl Settings {
    fn sanitized(mut self) -> Self {
        self.hex_size = if self.hex_size.is_finite() {
            self.hex_size.clamp(MIN_HEX_SIZE, MAX_HEX_SIZE)
        } else {
            DEFAULT_HEX_SIZE
        };
        self
    }
}

/// Identity record written by the login flow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Identity {
    pub user_id: Option<String>,
    pub is_admin: bool,
}

impl From<Identity> for AppConfig {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id.filter(|id| !id.trim().is_empty()),
            is_admin: identity.is_admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shortcut {
    ClearSelection,
    ZoomIn,
    ZoomOut,
    ToggleCoords,
    CenterHome,
    ToggleEditMode,
}

pub(crate) fn shortcut_for(key: &str, is_admin: bool) -> Option<Shortcut> {
    match key {
        "Escape" => Some(Shortcut::ClearSelection),
        "+" | "=" => Some(Shortcut::ZoomIn),
        "-" | "_" => Some(Shortcut::ZoomOut),
        "c" | "C" => Some(Shortcut::ToggleCoords),
        "h" | "H" => Some(Shortcut::CenterHome),
        "e" | "E" if is_admin => Some(Shortcut::ToggleEditMode),
        _ => None,
    }
}

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// Root component. Reads persisted settings and identity, provides the store
/// and view state through context, and kicks off the initial load.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get::<Settings>(SETTINGS_KEY)
        .unwrap_or_default()
        .sanitized();
    let config: AppConfig = gloo_storage::LocalStorage::get::<Identity>(IDENTITY_KEY)
        .unwrap_or_default()
        .into();

    let store: Store = MapStore::new(HttpTransport::default());
    store.set_user(config.user_id.clone());
    let controller = ViewportController::new();

    let show_coords = RwSignal::new(saved.show_coords);
    let hex_size = RwSignal::new(saved.hex_size);
    let edit_mode = RwSignal::new(false);
    let brush: RwSignal<&'static str> = RwSignal::new(DEFAULT_TERRAIN);
    let generate_size = RwSignal::new(DEFAULT_GENERATE_SIZE);

    provide_context(store.clone());
    provide_context(controller);
    provide_context(config.clone());
    provide_context(ShowCoords(show_coords));
    provide_context(HexSize(hex_size));
    provide_context(EditMode(edit_mode));
    provide_context(Brush(brush));
    provide_context(GenerateSize(generate_size));

    // Persist settings on change
    Effect::new(move || {
        let settings = Settings {
            show_coords: show_coords.get(),
            hex_size: hex_size.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    // Initial load
    Effect::new({
        let store = store.clone();
        move || {
            let store = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if store.load(None).await {
                    leptos::logging::log!(
                        "worldmap loaded: {} tiles",
                        store.world().with_untracked(|w| w.tiles.len())
                    );
                }
            });
        }
    });

    // Global keyboard shortcuts
    Effect::new({
        let store = store.clone();
        let is_admin = config.is_admin;
        move || {
            use wasm_bindgen::JsCast;
            use wasm_bindgen::prelude::*;

            let Some(window) = web_sys::window() else {
                return;
            };

            KEYDOWN_BINDING.with(|slot| {
                if let Some(old) = slot.borrow_mut().take() {
                    let _ = old.window.remove_event_listener_with_callback(
                        "keydown",
                        old._handler.as_ref().unchecked_ref(),
                    );
                }
            });

            let store = store.clone();
            let handler =
                Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                    let target_tag = e
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                        .map(|el| el.tag_name())
                        .unwrap_or_default();
                    // Leave typing in the size input alone
                    if target_tag == "INPUT" || target_tag == "SELECT" {
                        return;
                    }
                    if e.ctrl_key() || e.meta_key() || e.alt_key() {
                        return;
                    }
                    let Some(shortcut) = shortcut_for(&e.key(), is_admin) else {
                        return;
                    };
                    e.prevent_default();
                    match shortcut {
                        Shortcut::ClearSelection => store.select_tile(None),
                        Shortcut::ZoomIn => controller.zoom_by(ZOOM_STEP),
                        Shortcut::ZoomOut => controller.zoom_by(-ZOOM_STEP),
                        Shortcut::ToggleCoords => show_coords.update(|v| *v = !*v),
                        Shortcut::CenterHome => {
                            center_on_home(&store, controller, hex_size.get_untracked())
                        }
                        Shortcut::ToggleEditMode => edit_mode.update(|v| *v = !*v),
                    }
                });

            if window
                .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
                .is_ok()
            {
                KEYDOWN_BINDING.with(|slot| {
                    *slot.borrow_mut() = Some(KeydownBinding {
                        window: window.clone(),
                        _handler: handler,
                    });
                });
            }
        }
    });

    view! {
        <div class="hexworld-app" style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #10131c;">
            <MapView />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let parsed: Settings = serde_json::from_str(r#"{"show_coords":true}"#).expect("settings");
        assert!(parsed.show_coords);
        assert_eq!(parsed.hex_size, DEFAULT_HEX_SIZE);
    }

    #[test]
    fn settings_clamp_hex_size() {
        let tiny = Settings {
            show_coords: false,
            hex_size: 2.0,
        };
        assert_eq!(tiny.sanitized().hex_size, MIN_HEX_SIZE);
        let broken = Settings {
            show_coords: false,
            hex_size: f64::NAN,
        };
        assert_eq!(broken.sanitized().hex_size, DEFAULT_HEX_SIZE);
    }

    #[test]
    fn identity_maps_to_config() {
        let identity: Identity =
            serde_json::from_str(r#"{"user_id":"u-9","is_admin":true}"#).expect("identity");
        let config = AppConfig::from(identity);
        assert_eq!(config.user_id.as_deref(), Some("u-9"));
        assert!(config.is_admin);

        let anonymous = AppConfig::from(Identity {
            user_id: Some("  ".to_string()),
            is_admin: false,
        });
        assert_eq!(anonymous, AppConfig::default());
    }

    #[test]
    fn edit_shortcut_requires_admin() {
        assert_eq!(shortcut_for("e", false), None);
        assert_eq!(shortcut_for("e", true), Some(Shortcut::ToggleEditMode));
    }

    #[test]
    fn shortcuts_map_keys() {
        assert_eq!(shortcut_for("Escape", false), Some(Shortcut::ClearSelection));
        assert_eq!(shortcut_for("+", false), Some(Shortcut::ZoomIn));
        assert_eq!(shortcut_for("=", false), Some(Shortcut::ZoomIn));
        assert_eq!(shortcut_for("-", false), Some(Shortcut::ZoomOut));
        assert_eq!(shortcut_for("C", false), Some(Shortcut::ToggleCoords));
        assert_eq!(shortcut_for("h", false), Some(Shortcut::CenterHome));
        assert_eq!(shortcut_for("x", true), None);
    }
}
