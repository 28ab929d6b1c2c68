/// A static terrain catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainType {
    pub key: &'static str,
    pub name: &'static str,
    /// CSS hex color, used as the solid fill and as the pattern background.
    pub color: &'static str,
    /// Pattern id for textured terrain; `None` means a solid fill plus icon.
    pub texture: Option<&'static str>,
    pub icon: &'static str,
}

pub const DEFAULT_TERRAIN: &str = "grass";

pub const TERRAIN_TYPES: &[TerrainType] = &[
    TerrainType {
        key: "grass",
        name: "Grassland",
        color: "#7cb342",
        texture: None,
        icon: "\u{1F33F}",
    },
    TerrainType {
        key: "forest",
        name: "Forest",
        color: "#2e7d32",
        texture: Some("forest-texture"),
        icon: "\u{1F332}",
    },
    TerrainType {
        key: "water",
        name: "Water",
        color: "#1e88e5",
        texture: Some("water-texture"),
        icon: "\u{1F30A}",
    },
    TerrainType {
        key: "mountain",
        name: "Mountains",
        color: "#757575",
        texture: Some("mountain-texture"),
        icon: "\u{26F0}",
    },
    TerrainType {
        key: "desert",
        name: "Desert",
        color: "#fdd835",
        texture: None,
        icon: "\u{1F3DC}",
    },
    TerrainType {
        key: "swamp",
        name: "Swamp",
        color: "#558b2f",
        texture: None,
        icon: "\u{1F438}",
    },
    TerrainType {
        key: "snow",
        name: "Snowfield",
        color: "#eceff1",
        texture: None,
        icon: "\u{2744}",
    },
    TerrainType {
        key: "hills",
        name: "Hills",
        color: "#a1887f",
        texture: None,
        icon: "\u{26F0}",
    },
    TerrainType {
        key: "castle",
        name: "Castle",
        color: "#8d6e63",
        texture: None,
        icon: "\u{1F3F0}",
    },
    TerrainType {
        key: "village",
        name: "Village",
        color: "#ffb74d",
        texture: None,
        icon: "\u{1F3D8}",
    },
];

/// Look up a terrain by key; unknown keys resolve to the default terrain.
pub fn terrain_type(key: &str) -> &'static TerrainType {
    find_terrain(key).unwrap_or(&TERRAIN_TYPES[0])
}

/// Strict lookup, for validating edits.
pub fn find_terrain(key: &str) -> Option<&'static TerrainType> {
    TERRAIN_TYPES.iter().find(|t| t.key == key)
}

pub fn is_known_terrain(key: &str) -> bool {
    find_terrain(key).is_some()
}

/// Terrain types that define a texture pattern (rendered once as SVG `<defs>`).
pub fn textured_terrains() -> impl Iterator<Item = &'static TerrainType> {
    TERRAIN_TYPES.iter().filter(|t| t.texture.is_some())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn default_terrain_is_first_entry() {
        assert_eq!(TERRAIN_TYPES[0].key, DEFAULT_TERRAIN);
    }

    #[test]
    fn unknown_key_falls_back_to_default() {
        assert_eq!(terrain_type("lava").key, DEFAULT_TERRAIN);
        assert_eq!(terrain_type("").key, DEFAULT_TERRAIN);
        assert!(find_terrain("lava").is_none());
    }

    #[test]
    fn known_keys_resolve_to_their_entry() {
        assert_eq!(terrain_type("water").name, "Water");
        assert_eq!(terrain_type("castle").icon, "\u{1F3F0}");
        assert!(is_known_terrain("forest"));
    }

    #[test]
    fn catalog_keys_and_textures_are_unique() {
        let keys: HashSet<_> = TERRAIN_TYPES.iter().map(|t| t.key).collect();
        assert_eq!(keys.len(), TERRAIN_TYPES.len());

        let textures: Vec<_> = textured_terrains().filter_map(|t| t.texture).collect();
        let unique: HashSet<_> = textures.iter().collect();
        assert_eq!(unique.len(), textures.len());
        assert_eq!(textures.len(), 3);
    }
}
