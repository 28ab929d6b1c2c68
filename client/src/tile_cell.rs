use leptos::prelude::*;

use hexworld_shared::colors::{hex_css, is_light, parse_hex_color};
use hexworld_shared::terrain::{TERRAIN_TYPES, TerrainType};
use hexworld_shared::{Hex, Owner, Tile, axial_to_pixel, owner_color, terrain_type};

const SELECTED_STROKE: &str = "#ffeb3b";
const DEFAULT_STROKE: &str = "rgba(0, 0, 0, 0.35)";

/// Everything one hex cell renders from. Cells only re-render when this
/// changes by value.
#[derive(Debug, Clone, PartialEq)]
pub struct CellProps {
    pub tile: Tile,
    pub size: f64,
    pub is_selected: bool,
    pub is_edit_mode: bool,
    pub show_coords: bool,
}

/// Owner marker drawn in the upper-right of the hex.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub fill: String,
    pub text_color: &'static str,
    pub initial: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellVisual {
    pub x: f64,
    pub y: f64,
    pub fill: String,
    pub stroke: &'static str,
    pub stroke_width: f64,
    pub icon: Option<&'static str>,
    pub icon_size: f64,
    pub badge: Option<Badge>,
    pub label: Option<String>,
    pub cursor: &'static str,
    pub title: String,
}

impl CellVisual {
    pub fn derive(props: &CellProps) -> Self {
        let tile = &props.tile;
        let size = props.size;
        let terrain = terrain_type(&tile.terrain);
        let (x, y) = axial_to_pixel(tile.q, tile.r, size);

        let fill = match terrain.texture {
            Some(id) => format!("url(#{id})"),
            None => terrain.color.to_string(),
        };
        let (stroke, stroke_width) = if props.is_selected {
            (SELECTED_STROKE, 3.0)
        } else {
            (DEFAULT_STROKE, 1.0)
        };

        let title = match &tile.owner {
            Some(owner) => format!("{} ({}, {}) - {}", terrain.name, tile.q, tile.r, owner.name),
            None => format!("{} ({}, {})", terrain.name, tile.q, tile.r),
        };

        Self {
            x,
            y,
            fill,
            stroke,
            stroke_width,
            icon: terrain.texture.is_none().then_some(terrain.icon),
            icon_size: size * 0.5,
            badge: tile.owner.as_ref().map(|owner| Badge::for_owner(owner, size)),
            label: props
                .show_coords
                .then(|| format!("{},{}", tile.q, tile.r)),
            cursor: if props.is_edit_mode {
                "crosshair"
            } else {
                "pointer"
            },
            title,
        }
    }
}

impl Badge {
    fn for_owner(owner: &Owner, size: f64) -> Self {
        let (r, g, b) = owner
            .color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or_else(|| owner_color(&owner.id));
        Self {
            cx: size * 0.4,
            cy: -size * 0.4,
            radius: size * 0.22,
            fill: hex_css(r, g, b),
            text_color: if is_light(r, g, b) { "#111" } else { "#fff" },
            initial: owner.initial(),
        }
    }
}

fn num(value: f64) -> String {
    format!("{value:.2}")
}

/// `<pattern>` markup for every textured terrain, for the scene's `<defs>`.
pub fn pattern_defs() -> String {
    TERRAIN_TYPES
        .iter()
        .filter_map(|t| t.texture.map(|id| pattern_markup(t, id)))
        .collect()
}

fn pattern_markup(terrain: &TerrainType, id: &str) -> String {
    let motif = match terrain.key {
        "forest" => {
            r#"<circle cx="4" cy="4" r="3" fill="rgba(0,0,0,0.25)"/><circle cx="12" cy="11" r="3" fill="rgba(0,0,0,0.2)"/>"#
        }
        "water" => {
            r#"<path d="M0 5 Q4 2 8 5 T16 5 M0 12 Q4 9 8 12 T16 12" fill="none" stroke="rgba(255,255,255,0.35)" stroke-width="1.2"/>"#
        }
        "mountain" => {
            r#"<path d="M1 14 L6 4 L11 14 Z M8 14 L12 7 L16 14 Z" fill="rgba(255,255,255,0.22)"/>"#
        }
        _ => "",
    };
    format!(
        r#"<pattern id="{id}" patternUnits="userSpaceOnUse" width="16" height="16"><rect width="16" height="16" fill="{}"/>{motif}</pattern>"#,
        terrain.color
    )
}

/// One hex of the map. `path` is the shared polygon for the current size.
#[component]
pub fn TileCell(
    hex: Hex,
    cell: Memo<Option<CellProps>>,
    path: Memo<String>,
    on_pick: Callback<Hex>,
) -> impl IntoView {
    let visual = Memo::new(move |_| cell.with(|p| p.as_ref().map(CellVisual::derive)));

    move || {
        let v = visual.get()?;
        let badge = v.badge.map(|b| {
            let (cx, cy) = (num(b.cx), num(b.cy));
            view! {
                <g class="owner-badge">
                    <circle
                        cx=cx.clone()
                        cy=cy.clone()
                        r=num(b.radius)
                        fill=b.fill
                        stroke="#000"
                        stroke-width="0.5"
                    />
                    <text
                        x=cx
                        y=cy
                        fill=b.text_color
                        font-size=num(b.radius * 1.2)
                        font-weight="bold"
                        text-anchor="middle"
                        dominant-baseline="central"
                    >
                        {b.initial}
                    </text>
                </g>
            }
        });
        let icon = v.icon.map(|icon| {
            view! {
                <text font-size=num(v.icon_size) text-anchor="middle" dominant-baseline="central">
                    {icon}
                </text>
            }
        });
        let label_y = num(v.icon_size * 1.15);
        let label_size = num(v.icon_size * 0.45);
        let label = v.label.map(|label| {
            view! {
                <text
                    y=label_y
                    font-size=label_size
                    fill="rgba(0,0,0,0.7)"
                    text-anchor="middle"
                    class="coord-label"
                >
                    {label}
                </text>
            }
        });

        Some(view! {
            <g
                class="hex-tile"
                transform=format!("translate({:.2},{:.2})", v.x, v.y)
                style=format!("cursor: {};", v.cursor)
                aria-label=v.title
                on:click=move |_| on_pick.run(hex)
            >
                <path
                    d=move || path.get()
                    fill=v.fill
                    stroke=v.stroke
                    stroke-width=num(v.stroke_width)
                />
                {icon}
                {badge}
                {label}
            </g>
        })
    }
}
