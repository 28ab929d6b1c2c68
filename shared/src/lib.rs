pub mod api;
pub mod colors;
pub mod hex;
pub mod terrain;
pub mod tile;

pub use colors::owner_color;
pub use hex::{Bounds, Hex, axial_distance, axial_to_pixel, hex_path};
pub use terrain::{TerrainType, terrain_type};
pub use tile::{MergeStats, Owner, Tile, TileMap, WorldMap};
