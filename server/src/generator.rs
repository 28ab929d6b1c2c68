use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hexworld_shared::hex::hexes_within;
use hexworld_shared::{Hex, Tile, TileMap, WorldMap};

/// Relative frequency of each terrain on the map interior.
const TERRAIN_WEIGHTS: &[(&str, u32)] = &[
    ("grass", 30),
    ("forest", 20),
    ("hills", 10),
    ("water", 10),
    ("mountain", 8),
    ("desert", 6),
    ("swamp", 5),
    ("snow", 4),
    ("village", 3),
];

const RESOURCE_CHANCE: f64 = 0.35;

fn pick_terrain(rng: &mut impl Rng) -> &'static str {
    let total: u32 = TERRAIN_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for (terrain, weight) in TERRAIN_WEIGHTS {
        if roll < *weight {
            return terrain;
        }
        roll -= weight;
    }
    "grass"
}

fn resource_for(terrain: &str) -> Option<&'static str> {
    match terrain {
        "forest" => Some("wood"),
        "hills" => Some("stone"),
        "mountain" => Some("ore"),
        "water" => Some("fish"),
        "grass" => Some("grain"),
        "swamp" => Some("herbs"),
        _ => None,
    }
}

fn buildings_for(terrain: &str) -> Vec<String> {
    match terrain {
        "castle" => vec!["keep".to_string(), "barracks".to_string()],
        "village" => vec!["houses".to_string()],
        _ => Vec::new(),
    }
}

/// Fill a hexagon of radius `map_size` around the origin. The centre is a
/// castle and the outer ring is water.
pub fn generate_tiles(map_size: u32, rng: &mut impl Rng) -> TileMap {
    let origin = Hex::new(0, 0);
    hexes_within(origin, map_size)
        .into_iter()
        .map(|hex| {
            let terrain = if hex == origin {
                "castle"
            } else if hex.distance(origin) == map_size {
                "water"
            } else {
                pick_terrain(rng)
            };
            let mut tile = Tile::new(hex.q, hex.r, terrain);
            if let Some(resource) = resource_for(terrain)
                && rng.random_bool(RESOURCE_CHANCE)
            {
                tile.resources.push(resource.to_string());
            }
            tile.buildings = buildings_for(terrain);
            tile
        })
        .collect()
}

/// A fresh map at `version`. A fixed `seed` is mixed with the version so
/// successive generations differ but stay reproducible.
pub fn generate_world(map_size: u32, seed: Option<u64>, version: u64) -> WorldMap {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(version)),
        None => StdRng::from_os_rng(),
    };
    WorldMap {
        tiles: generate_tiles(map_size, &mut rng),
        map_size,
        version,
    }
}
