use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hex::Hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub name: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Owner {
    /// Uppercased first character of the display name, for the map badge.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }
}

/// One map cell. `(q, r)` is the identity; everything else is state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub q: i32,
    pub r: i32,
    pub terrain: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buildings: Vec<String>,
}

impl Tile {
    pub fn new(q: i32, r: i32, terrain: impl Into<String>) -> Self {
        Self {
            q,
            r,
            terrain: terrain.into(),
            owner: None,
            resources: Vec::new(),
            buildings: Vec::new(),
        }
    }

    pub const fn coord(&self) -> Hex {
        Hex::new(self.q, self.r)
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_ref().is_some_and(|o| o.id == user_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub replaced: usize,
}

/// Tile collection keyed by coordinate. Duplicate coordinates cannot exist;
/// inserting an existing coordinate replaces the previous tile.
///
/// On the wire this is a plain JSON array of tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tile>", into = "Vec<Tile>")]
pub struct TileMap {
    tiles: HashMap<Hex, Tile>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.tiles.contains_key(&hex)
    }

    /// Returns the tile previously stored at the same coordinate.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.coord(), tile)
    }

    /// Upsert every incoming tile by coordinate, keeping everything else.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Tile>) -> MergeStats {
        let mut stats = MergeStats::default();
        for tile in incoming {
            if self.insert(tile).is_some() {
                stats.replaced += 1;
            } else {
                stats.added += 1;
            }
        }
        stats
    }

    /// Replace the tile at an existing coordinate. Returns false, leaving the
    /// map untouched, when the coordinate is not present.
    pub fn replace_existing(&mut self, tile: Tile) -> bool {
        match self.tiles.get_mut(&tile.coord()) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    /// Set the terrain of an existing tile. Returns false when absent.
    pub fn set_terrain(&mut self, hex: Hex, terrain: &str) -> bool {
        let Some(tile) = self.tiles.get_mut(&hex) else {
            return false;
        };
        tile.terrain = terrain.to_string();
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Tiles in row-major order (`r`, then `q`). Stable across reloads so
    /// keyed rendering does not reshuffle cells.
    pub fn sorted(&self) -> Vec<&Tile> {
        let mut tiles: Vec<&Tile> = self.tiles.values().collect();
        tiles.sort_by_key(|t| (t.r, t.q));
        tiles
    }

    pub fn to_vec(&self) -> Vec<Tile> {
        self.sorted().into_iter().cloned().collect()
    }

    /// First match in render order, without sorting the whole map.
    pub fn find(&self, predicate: impl Fn(&Tile) -> bool) -> Option<&Tile> {
        self.tiles
            .values()
            .filter(|t| predicate(t))
            .min_by_key(|t| (t.r, t.q))
    }
}

impl From<Vec<Tile>> for TileMap {
    fn from(tiles: Vec<Tile>) -> Self {
        tiles.into_iter().collect()
    }
}

impl From<TileMap> for Vec<Tile> {
    fn from(map: TileMap) -> Self {
        let mut tiles: Vec<Tile> = map.tiles.into_values().collect();
        tiles.sort_by_key(|t| (t.r, t.q));
        tiles
    }
}

impl FromIterator<Tile> for TileMap {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut map = TileMap::new();
        map.merge(iter);
        map
    }
}

/// A versioned snapshot of the whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMap {
    #[serde(default)]
    pub tiles: TileMap,
    #[serde(default)]
    pub map_size: u32,
    #[serde(default)]
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(q: i32, r: i32, owner_id: &str) -> Tile {
        Tile {
            owner: Some(Owner {
                id: owner_id.to_string(),
                name: "edda".to_string(),
                color: None,
            }),
            ..Tile::new(q, r, "castle")
        }
    }

    #[test]
    fn merge_replaces_existing_coordinate() {
        let mut map: TileMap = vec![Tile::new(0, 0, "grass"), Tile::new(1, 0, "forest")].into();
        let stats = map.merge([Tile::new(0, 0, "water")]);

        assert_eq!(stats, MergeStats { added: 0, replaced: 1 });
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(Hex::new(0, 0)).map(|t| t.terrain.as_str()), Some("water"));
    }

    #[test]
    fn merge_appends_new_coordinate() {
        let mut map: TileMap = vec![Tile::new(0, 0, "grass")].into();
        let stats = map.merge([Tile::new(0, 1, "snow")]);

        assert_eq!(stats, MergeStats { added: 1, replaced: 0 });
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn duplicate_coordinates_collapse_on_construction() {
        let map: TileMap = vec![Tile::new(2, 2, "grass"), Tile::new(2, 2, "desert")].into();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(Hex::new(2, 2)).map(|t| t.terrain.as_str()), Some("desert"));
    }

    #[test]
    fn set_terrain_only_touches_present_tiles() {
        let mut map: TileMap = vec![Tile::new(0, 0, "grass")].into();
        assert!(map.set_terrain(Hex::new(0, 0), "water"));
        assert!(!map.set_terrain(Hex::new(9, 9), "water"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn replace_existing_never_inserts() {
        let mut map: TileMap = vec![Tile::new(0, 0, "grass")].into();
        assert!(map.replace_existing(Tile::new(0, 0, "water")));
        assert!(!map.replace_existing(Tile::new(4, 4, "water")));
        assert_eq!(map.len(), 1);
        assert!(!map.contains(Hex::new(4, 4)));
        assert_eq!(map.get(Hex::new(0, 0)).map(|t| t.terrain.as_str()), Some("water"));
    }

    #[test]
    fn find_returns_first_match_in_row_order() {
        let map: TileMap = vec![owned(3, 2, "u-1"), owned(-2, 2, "u-1"), owned(0, 0, "u-2")].into();
        assert_eq!(map.find(|t| t.is_owned_by("u-1")).map(Tile::coord), Some(Hex::new(-2, 2)));
        assert!(map.find(|t| t.is_owned_by("u-3")).is_none());
    }

    #[test]
    fn sorted_is_row_major() {
        let map: TileMap = vec![
            Tile::new(1, 1, "grass"),
            Tile::new(-1, 1, "grass"),
            Tile::new(5, -2, "grass"),
        ]
        .into();
        let order: Vec<(i32, i32)> = map.sorted().iter().map(|t| (t.q, t.r)).collect();
        assert_eq!(order, vec![(5, -2), (-1, 1), (1, 1)]);
    }

    #[test]
    fn world_map_decodes_camel_case_and_optional_fields() {
        let json = r#"{"tiles":[{"q":0,"r":0,"terrain":"grass"}],"mapSize":30,"version":1}"#;
        let world: WorldMap = serde_json::from_str(json).expect("world map should parse");
        assert_eq!(world.map_size, 30);
        assert_eq!(world.version, 1);
        let tile = world.tiles.get(Hex::new(0, 0)).expect("origin tile");
        assert!(tile.owner.is_none());
        assert!(tile.resources.is_empty());
    }

    #[test]
    fn tile_encoding_omits_empty_optionals() {
        let json = serde_json::to_string(&Tile::new(3, -1, "hills")).expect("encode tile");
        assert_eq!(json, r#"{"q":3,"r":-1,"terrain":"hills"}"#);
    }

    #[test]
    fn owner_initial_and_ownership() {
        let tile = owned(0, 0, "u-7");
        assert!(tile.is_owned_by("u-7"));
        assert!(!tile.is_owned_by("u-8"));
        assert_eq!(tile.owner.as_ref().map(Owner::initial).as_deref(), Some("E"));
        assert!(!Tile::new(0, 0, "grass").is_owned_by("u-7"));
    }
}
