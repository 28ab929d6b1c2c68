//! Request and response bodies for the `/api/worldmap` endpoints.

use serde::{Deserialize, Serialize};

use crate::tile::{Tile, TileMap, WorldMap};

pub const MIN_MAP_SIZE: u32 = 10;
pub const MAX_MAP_SIZE: u32 = 100;

/// Clamp a requested map radius into the supported generation range.
pub fn clamp_map_size(size: u32) -> u32 {
    size.clamp(MIN_MAP_SIZE, MAX_MAP_SIZE)
}

pub fn is_valid_map_size(size: u32) -> bool {
    (MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&size)
}

/// `GET /api/worldmap` returns the world map itself.
pub type WorldMapResponse = WorldMap;

/// `GET /api/worldmap/tiles/{q}/{r}/{radius}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilesResponse {
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

/// `PUT /api/worldmap/tile`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTileRequest {
    pub q: i32,
    pub r: i32,
    pub terrain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTileResponse {
    pub tile: Tile,
}

/// `POST /api/worldmap/save`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub tiles: TileMap,
    pub map_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub version: u64,
}

/// `POST /api/worldmap/generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub map_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub world_map: WorldMap,
}

/// Body of every non-2xx response. Clients read `message`, then `details`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            details: None,
        }
    }

    /// Human-readable failure for a non-2xx status. `body` may be anything,
    /// including an empty or non-JSON payload.
    pub fn describe(status: u16, body: &str) -> String {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let non_blank = |m: &String| !m.trim().is_empty();
        parsed
            .message
            .filter(non_blank)
            .or(parsed.details.filter(non_blank))
            .unwrap_or_else(|| format!("request failed with status {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_map_size_enforces_generation_range() {
        assert_eq!(clamp_map_size(0), MIN_MAP_SIZE);
        assert_eq!(clamp_map_size(50), 50);
        assert_eq!(clamp_map_size(1_000), MAX_MAP_SIZE);
        assert!(is_valid_map_size(10));
        assert!(!is_valid_map_size(101));
    }

    #[test]
    fn describe_prefers_message_then_details() {
        assert_eq!(
            ErrorBody::describe(403, r#"{"message":"admins only","details":"x"}"#),
            "admins only"
        );
        assert_eq!(
            ErrorBody::describe(500, r#"{"details":"db down"}"#),
            "db down"
        );
    }

    #[test]
    fn blank_message_falls_through_to_details() {
        assert_eq!(
            ErrorBody::describe(500, r#"{"message":"  ","details":"db down"}"#),
            "db down"
        );
        assert_eq!(
            ErrorBody::describe(500, r#"{"message":"","details":" "}"#),
            "request failed with status 500"
        );
    }

    #[test]
    fn describe_falls_back_to_status() {
        assert_eq!(
            ErrorBody::describe(502, "<html>bad gateway</html>"),
            "request failed with status 502"
        );
        assert_eq!(ErrorBody::describe(404, ""), "request failed with status 404");
        assert_eq!(
            ErrorBody::describe(400, r#"{"message":"  "}"#),
            "request failed with status 400"
        );
    }

    #[test]
    fn generate_response_nests_world_map() {
        let json = r#"{"worldMap":{"tiles":[],"mapSize":50,"version":4}}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).expect("generate response");
        assert_eq!(parsed.world_map.map_size, 50);
        assert_eq!(parsed.world_map.version, 4);
    }

    #[test]
    fn save_request_uses_camel_case() {
        let body = SaveRequest {
            tiles: vec![Tile::new(0, 0, "grass")].into(),
            map_size: 12,
        };
        let json = serde_json::to_value(&body).expect("encode save request");
        assert_eq!(json["mapSize"], 12);
        assert_eq!(json["tiles"][0]["terrain"], "grass");
    }
}
