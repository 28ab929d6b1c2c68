use leptos::prelude::*;

use hexworld_shared::terrain::TERRAIN_TYPES;
use hexworld_shared::{Tile, terrain_type};

use crate::app::{EditMode, Store};

/// Text shown for the selected tile.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TileDetails {
    pub coords: String,
    pub terrain: &'static str,
    pub owner: String,
    pub resources: String,
    pub buildings: String,
    /// Hex steps from the player's home tile, when there is one.
    pub distance: Option<u32>,
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn describe_tile(tile: &Tile, home: Option<&Tile>) -> TileDetails {
    TileDetails {
        coords: format!("({}, {})", tile.q, tile.r),
        terrain: terrain_type(&tile.terrain).name,
        owner: tile
            .owner
            .as_ref()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "Unclaimed".to_string()),
        resources: list_or_none(&tile.resources),
        buildings: list_or_none(&tile.buildings),
        distance: home.map(|h| Store::distance(h.coord(), tile.coord())),
    }
}

const PANEL_STYLE: &str = "position: absolute; right: 12px; bottom: 12px; z-index: 10; width: 260px; padding: 12px 14px; background: rgba(16,19,28,0.95); border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif; font-size: 0.8rem;";
const LABEL_STYLE: &str = "color: #7c829e; font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.05em;";

/// Panel for the selected tile. In edit mode it also offers a terrain palette.
#[component]
pub fn DetailPanel() -> impl IntoView {
    let store = expect_context::<Store>();
    let EditMode(edit_mode) = expect_context::<EditMode>();
    let world = store.world();
    let selected = store.selected();
    let user_id = store.user_id();

    move || {
        let tile = selected.get()?;
        let home = {
            let user = user_id.get();
            world.with(|w| w.player_tile(user.as_deref()).cloned())
        };
        let details = describe_tile(&tile, home.as_ref());
        let store = store.clone();

        let row = |label: &'static str, value: String| {
            view! {
                <div style="display: flex; justify-content: space-between; gap: 8px; padding: 2px 0;">
                    <span style=LABEL_STYLE>{label}</span>
                    <span style="text-align: right;">{value}</span>
                </div>
            }
        };

        let palette = edit_mode.get().then(|| {
            let (q, r) = (tile.q, tile.r);
            let current = tile.terrain.clone();
            let buttons = TERRAIN_TYPES
                .iter()
                .map(|t| {
                    let store = store.clone();
                    let active = t.key == current;
                    let style = format!(
                        "padding: 3px 6px; border: 1px solid {}; border-radius: 4px; background: {}; color: #e2e0d8; cursor: pointer; font-size: 0.72rem;",
                        if active { "#f5c542" } else { "#282c3e" },
                        t.color,
                    );
                    let key = t.key;
                    view! {
                        <button
                            style=style
                            title=t.name
                            on:click=move |_| {
                                let store = store.clone();
                                wasm_bindgen_futures::spawn_local(async move {
                                    store.update_tile(q, r, key).await;
                                });
                            }
                        >
                            {t.icon}
                        </button>
                    }
                })
                .collect_view();
            view! {
                <div style="margin-top: 10px;">
                    <div style=LABEL_STYLE>"Terrain"</div>
                    <div style="display: flex; flex-wrap: wrap; gap: 4px; margin-top: 4px;">
                        {buttons}
                    </div>
                </div>
            }
        });

        let on_close = {
            let store = store.clone();
            move |_| store.select_tile(None)
        };

        Some(view! {
            <div class="panel-reveal" style=PANEL_STYLE>
                <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 6px;">
                    <span style="font-weight: 600;">{details.terrain}</span>
                    <button
                        style="border: none; background: transparent; color: #7c829e; cursor: pointer; font-size: 1rem;"
                        on:click=on_close
                    >
                        "\u{00D7}"
                    </button>
                </div>
                {row("Coordinates", details.coords)}
                {row("Owner", details.owner)}
                {row("Resources", details.resources)}
                {row("Buildings", details.buildings)}
                {details.distance.map(|d| row("From home", format!("{d} hexes")))}
                {palette}
            </div>
        })
    }
}

#[cfg(test)]
mod tests {
    use hexworld_shared::Owner;

    use super::*;

    #[test]
    fn unowned_tile_details() {
        let details = describe_tile(&Tile::new(3, -2, "swamp"), None);
        assert_eq!(details.coords, "(3, -2)");
        assert_eq!(details.terrain, terrain_type("swamp").name);
        assert_eq!(details.owner, "Unclaimed");
        assert_eq!(details.resources, "None");
        assert_eq!(details.buildings, "None");
        assert_eq!(details.distance, None);
    }

    #[test]
    fn owned_tile_lists_contents_and_distance() {
        let mut tile = Tile::new(2, 0, "village");
        tile.owner = Some(Owner {
            id: "u-1".to_string(),
            name: "Rin".to_string(),
            color: None,
        });
        tile.resources = vec!["wood".to_string(), "stone".to_string()];
        tile.buildings = vec!["farm".to_string()];
        let home = Tile::new(0, 0, "castle");

        let details = describe_tile(&tile, Some(&home));
        assert_eq!(details.owner, "Rin");
        assert_eq!(details.resources, "wood, stone");
        assert_eq!(details.buildings, "farm");
        assert_eq!(details.distance, Some(2));
    }

    #[test]
    fn home_tile_is_zero_steps_away() {
        let home = Tile::new(-4, 1, "castle");
        assert_eq!(describe_tile(&home, Some(&home)).distance, Some(0));
    }
}
