use std::collections::HashSet;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use hexworld_shared::api::{
    GenerateRequest, GenerateResponse, MAX_MAP_SIZE, MIN_MAP_SIZE, SaveResponse, TilesResponse,
    UpdateTileRequest, UpdateTileResponse, WorldMapResponse, is_valid_map_size,
};
use hexworld_shared::terrain::is_known_terrain;
use hexworld_shared::{Bounds, Hex, Tile, TileMap, WorldMap};

use crate::config::MAX_FETCH_RADIUS;
use crate::generator::generate_world;
use crate::routes::api::{ApiError, authorize};
use crate::state::AppState;

/// Save body as sent. Kept as a list so duplicate coordinates can be
/// rejected instead of silently collapsed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSaveRequest {
    pub tiles: Vec<Tile>,
    pub map_size: u32,
}

fn size_error(size: u32) -> ApiError {
    ApiError::bad_request(format!(
        "mapSize must be between {MIN_MAP_SIZE} and {MAX_MAP_SIZE}, got {size}"
    ))
}

pub(crate) fn filter_bounds(world: &WorldMap, bounds: Bounds) -> WorldMap {
    WorldMap {
        tiles: world
            .tiles
            .iter()
            .filter(|t| bounds.contains(t.coord()))
            .cloned()
            .collect(),
        map_size: world.map_size,
        version: world.version,
    }
}

pub(crate) fn tiles_around(tiles: &TileMap, center: Hex, radius: u32) -> Vec<Tile> {
    let radius = radius.min(MAX_FETCH_RADIUS);
    tiles
        .sorted()
        .into_iter()
        .filter(|t| center.distance(t.coord()) <= radius)
        .cloned()
        .collect()
}

pub(crate) fn validate_save(request: RawSaveRequest) -> Result<(TileMap, u32), ApiError> {
    if !is_valid_map_size(request.map_size) {
        return Err(size_error(request.map_size));
    }
    let mut seen = HashSet::with_capacity(request.tiles.len());
    for tile in &request.tiles {
        if !seen.insert(tile.coord()) {
            return Err(ApiError::bad_request(format!(
                "duplicate tile at ({}, {})",
                tile.q, tile.r
            )));
        }
        if !is_known_terrain(&tile.terrain) {
            return Err(ApiError::bad_request(format!(
                "unknown terrain '{}' at ({}, {})",
                tile.terrain, tile.q, tile.r
            )));
        }
    }
    Ok((request.tiles.into(), request.map_size))
}

pub async fn get_worldmap(
    State(state): State<AppState>,
    Query(bounds): Query<Bounds>,
) -> Json<WorldMapResponse> {
    let world = state.world.read().await;
    if bounds == Bounds::default() {
        return Json(world.clone());
    }
    Json(filter_bounds(&world, bounds))
}

pub async fn get_tiles_around(
    State(state): State<AppState>,
    Path((q, r, radius)): Path<(i32, i32, u32)>,
) -> Json<TilesResponse> {
    let world = state.world.read().await;
    Json(TilesResponse {
        tiles: tiles_around(&world.tiles, Hex::new(q, r), radius),
    })
}

pub async fn update_tile(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<UpdateTileRequest>, JsonRejection>,
) -> Result<Json<UpdateTileResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(request) = body?;
    if !is_known_terrain(&request.terrain) {
        return Err(ApiError::bad_request(format!(
            "unknown terrain '{}'",
            request.terrain
        )));
    }

    let hex = Hex::new(request.q, request.r);
    let updated = {
        let mut world = state.world.write().await;
        if world.tiles.set_terrain(hex, &request.terrain) {
            world.tiles.get(hex).cloned()
        } else {
            None
        }
    };
    let Some(tile) = updated else {
        return Err(ApiError::not_found(format!(
            "no tile at ({}, {})",
            request.q, request.r
        )));
    };

    tracing::info!(q = request.q, r = request.r, terrain = %request.terrain, "tile updated");
    Ok(Json(UpdateTileResponse { tile }))
}

pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RawSaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(request) = body?;
    let (tiles, map_size) = validate_save(request)?;
    let tile_count = tiles.len();

    let version = {
        let mut world = state.world.write().await;
        world.tiles = tiles;
        world.map_size = map_size;
        world.version += 1;
        world.version
    };

    tracing::info!(tiles = tile_count, map_size, version, "world map saved");
    Ok(Json(SaveResponse { version }))
}

pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    authorize(&state, &headers)?;
    let Json(request) = body?;
    if !is_valid_map_size(request.map_size) {
        return Err(size_error(request.map_size));
    }

    // Generation runs outside the lock; the version is assigned on swap.
    let seed_version = state.world.read().await.version + 1;
    let generated = generate_world(request.map_size, state.seed, seed_version);

    let world_map = {
        let mut world = state.world.write().await;
        let version = world.version + 1;
        *world = WorldMap {
            version,
            ..generated
        };
        world.clone()
    };

    tracing::info!(
        map_size = world_map.map_size,
        tiles = world_map.tiles.len(),
        version = world_map.version,
        "world map generated"
    );
    Ok(Json(GenerateResponse { world_map }))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    fn sample_world() -> WorldMap {
        WorldMap {
            tiles: vec![
                Tile::new(0, 0, "castle"),
                Tile::new(1, 0, "forest"),
                Tile::new(0, 1, "water"),
                Tile::new(-2, 1, "hills"),
                Tile::new(3, -3, "snow"),
            ]
            .into(),
            map_size: 10,
            version: 1,
        }
    }

    async fn spawn_test_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = crate::app::build_app(state, "client/dist");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    #[test]
    fn bounds_filter_is_inclusive() {
        let world = sample_world();
        let filtered = filter_bounds(
            &world,
            Bounds {
                min_q: Some(0),
                max_q: Some(1),
                ..Bounds::default()
            },
        );
        assert_eq!(filtered.tiles.len(), 3);
        assert_eq!(filtered.version, 1);
        assert!(!filtered.tiles.contains(Hex::new(-2, 1)));
    }

    #[test]
    fn radius_fetch_uses_hex_distance_and_cap() {
        let world = sample_world();
        let near = tiles_around(&world.tiles, Hex::new(0, 0), 1);
        assert_eq!(near.len(), 3);
        let all = tiles_around(&world.tiles, Hex::new(0, 0), u32::MAX);
        assert_eq!(all.len(), 5);
        assert_eq!(tiles_around(&world.tiles, Hex::new(40, 40), 0).len(), 0);
    }

    #[test]
    fn save_rejects_duplicates_and_bad_sizes() {
        let dup = RawSaveRequest {
            tiles: vec![Tile::new(0, 0, "grass"), Tile::new(0, 0, "water")],
            map_size: 10,
        };
        let err = validate_save(dup).expect_err("duplicate");
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("duplicate"));

        let small = RawSaveRequest {
            tiles: vec![Tile::new(0, 0, "grass")],
            map_size: 9,
        };
        assert!(validate_save(small).is_err());

        let ok = RawSaveRequest {
            tiles: vec![Tile::new(0, 0, "grass"), Tile::new(1, 0, "water")],
            map_size: 10,
        };
        let (tiles, size) = validate_save(ok).expect("valid save");
        assert_eq!((tiles.len(), size), (2, 10));
    }

    #[tokio::test]
    async fn worldmap_round_trip_over_http() {
        let state = AppState::new(sample_world(), None, Some(3));
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let world = client
            .get(format!("{base_url}/api/worldmap?minQ=0&maxQ=1"))
            .send()
            .await
            .expect("worldmap request")
            .error_for_status()
            .expect("worldmap status")
            .json::<WorldMap>()
            .await
            .expect("parse worldmap");
        assert_eq!(world.tiles.len(), 3);
        assert_eq!(world.map_size, 10);

        let around = client
            .get(format!("{base_url}/api/worldmap/tiles/-2/1/0"))
            .send()
            .await
            .expect("tiles request")
            .json::<TilesResponse>()
            .await
            .expect("parse tiles");
        assert_eq!(around.tiles, vec![Tile::new(-2, 1, "hills")]);

        let updated = client
            .put(format!("{base_url}/api/worldmap/tile"))
            .json(&serde_json::json!({"q": 1, "r": 0, "terrain": "water"}))
            .send()
            .await
            .expect("update request")
            .error_for_status()
            .expect("update status")
            .json::<UpdateTileResponse>()
            .await
            .expect("parse update");
        assert_eq!(updated.tile.terrain, "water");

        let saved = client
            .post(format!("{base_url}/api/worldmap/save"))
            .json(&serde_json::json!({"tiles": [{"q": 0, "r": 0, "terrain": "grass"}], "mapSize": 12}))
            .send()
            .await
            .expect("save request")
            .error_for_status()
            .expect("save status")
            .json::<SaveResponse>()
            .await
            .expect("parse save");
        assert_eq!(saved.version, 2);

        let generated = client
            .post(format!("{base_url}/api/worldmap/generate"))
            .json(&serde_json::json!({"mapSize": 10}))
            .send()
            .await
            .expect("generate request")
            .error_for_status()
            .expect("generate status")
            .json::<GenerateResponse>()
            .await
            .expect("parse generate");
        assert_eq!(generated.world_map.version, 3);
        assert_eq!(generated.world_map.tiles.len(), 331);

        let health = client
            .get(format!("{base_url}/api/health"))
            .send()
            .await
            .expect("health request")
            .json::<serde_json::Value>()
            .await
            .expect("parse health");
        assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("ok"));
        assert_eq!(health.get("tiles").and_then(|v| v.as_u64()), Some(331));
        assert_eq!(health.get("version").and_then(|v| v.as_u64()), Some(3));

        server_handle.abort();
        let _ = server_handle.await;
    }

    #[tokio::test]
    async fn mutations_report_errors_as_messages() {
        let state = AppState::new(sample_world(), Some("s3cret".to_string()), None);
        let (addr, server_handle) = spawn_test_server(state).await;
        let base_url = format!("http://{addr}");
        let client = reqwest::Client::new();

        let unauthorized = client
            .put(format!("{base_url}/api/worldmap/tile"))
            .json(&serde_json::json!({"q": 0, "r": 0, "terrain": "water"}))
            .send()
            .await
            .expect("unauthorized request");
        assert_eq!(unauthorized.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body = unauthorized
            .json::<serde_json::Value>()
            .await
            .expect("error body");
        assert_eq!(
            body.get("message").and_then(|v| v.as_str()),
            Some("admin token required")
        );

        let unknown_terrain = client
            .put(format!("{base_url}/api/worldmap/tile"))
            .bearer_auth("s3cret")
            .json(&serde_json::json!({"q": 0, "r": 0, "terrain": "lava"}))
            .send()
            .await
            .expect("unknown terrain request");
        assert_eq!(unknown_terrain.status(), reqwest::StatusCode::BAD_REQUEST);

        let missing = client
            .put(format!("{base_url}/api/worldmap/tile"))
            .bearer_auth("s3cret")
            .json(&serde_json::json!({"q": 99, "r": 99, "terrain": "water"}))
            .send()
            .await
            .expect("missing tile request");
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

        let bad_size = client
            .post(format!("{base_url}/api/worldmap/generate"))
            .bearer_auth("s3cret")
            .json(&serde_json::json!({"mapSize": 101}))
            .send()
            .await
            .expect("bad size request");
        assert_eq!(bad_size.status(), reqwest::StatusCode::BAD_REQUEST);
        let body = bad_size
            .json::<serde_json::Value>()
            .await
            .expect("error body");
        assert!(
            body.get("message")
                .and_then(|v| v.as_str())
                .is_some_and(|m| m.contains("mapSize"))
        );

        let malformed = client
            .post(format!("{base_url}/api/worldmap/save"))
            .bearer_auth("s3cret")
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .expect("malformed request");
        assert_eq!(malformed.status(), reqwest::StatusCode::BAD_REQUEST);
        let body = malformed
            .json::<serde_json::Value>()
            .await
            .expect("error body");
        assert!(body.get("message").is_some());

        server_handle.abort();
        let _ = server_handle.await;
    }
}
