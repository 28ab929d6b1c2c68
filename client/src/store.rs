use std::future::Future;
use std::sync::Arc;

use leptos::logging::warn;
use leptos::prelude::*;

use hexworld_shared::api::{SaveRequest, UpdateTileRequest};
use hexworld_shared::{Bounds, Hex, MergeStats, Tile, TileMap, WorldMap, axial_distance};

use crate::transport::{MapError, MapTransport};

/// Tiles plus the metadata that travels with them from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldState {
    pub tiles: TileMap,
    pub map_size: u32,
    pub version: u64,
}

impl WorldState {
    /// Replace tiles, size and version with a server snapshot.
    pub fn replace_world(&mut self, world: WorldMap) {
        self.tiles = world.tiles;
        self.map_size = world.map_size;
        self.version = world.version;
    }

    pub fn merge_tiles(&mut self, tiles: Vec<Tile>) -> MergeStats {
        self.tiles.merge(tiles)
    }

    /// Store a tile confirmed by the backend. Only a tile already present
    /// locally is replaced; returns whether that happened.
    pub fn apply_confirmed_tile(&mut self, tile: Tile) -> bool {
        self.tiles.replace_existing(tile)
    }

    pub fn player_tile(&self, user_id: Option<&str>) -> Option<&Tile> {
        let user_id = user_id?;
        self.tiles.find(|t| t.is_owned_by(user_id))
    }

    pub fn tile_at(&self, q: i32, r: i32) -> Option<&Tile> {
        self.tiles.get(Hex::new(q, r))
    }

    /// Render order: by row, then column.
    pub fn tiles_sorted(&self) -> Vec<&Tile> {
        self.tiles.sorted()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Request bookkeeping. Lives in its own signal so a request starting or
/// finishing does not touch anything that depends on the tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    /// Store requests currently awaiting the backend.
    pub in_flight: u32,
    pub error: Option<String>,
}

impl RequestStatus {
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }
}

/// Client-side owner of the tile collection.
///
/// Every operation catches its own failure: the message lands in
/// `RequestStatus::error`, the detail goes to the console, and the caller
/// gets a plain success flag.
pub struct MapStore<T> {
    world: RwSignal<WorldState>,
    selected: RwSignal<Option<Tile>>,
    status: RwSignal<RequestStatus>,
    user_id: RwSignal<Option<String>>,
    transport: Arc<T>,
}

impl<T> Clone for MapStore<T> {
    fn clone(&self) -> Self {
        Self {
            world: self.world,
            selected: self.selected,
            status: self.status,
            user_id: self.user_id,
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: MapTransport> MapStore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            world: RwSignal::new(WorldState::default()),
            selected: RwSignal::new(None),
            status: RwSignal::new(RequestStatus::default()),
            user_id: RwSignal::new(None),
            transport: Arc::new(transport),
        }
    }

    pub fn world(&self) -> RwSignal<WorldState> {
        self.world
    }

    pub fn selected(&self) -> RwSignal<Option<Tile>> {
        self.selected
    }

    pub fn status(&self) -> RwSignal<RequestStatus> {
        self.status
    }

    pub fn user_id(&self) -> RwSignal<Option<String>> {
        self.user_id
    }

    pub fn set_user(&self, user_id: Option<String>) {
        self.user_id.set(user_id);
    }

    /// True once a load attempt failed and nothing was ever loaded.
    pub fn needs_retry(&self) -> bool {
        self.status.with(|s| s.error.is_some() && !s.loading()) && self.world.with(WorldState::is_empty)
    }

    /// Replace the whole collection with the server's map, optionally
    /// restricted to `bounds`. Overlapping loads are not coalesced.
    pub async fn load(&self, bounds: Option<Bounds>) -> bool {
        let Some(world) = self
            .request("load", self.transport.fetch_map(bounds))
            .await
        else {
            return false;
        };
        self.world.update(|w| w.replace_world(world));
        true
    }

    /// Fetch a neighbourhood and merge it into what is already loaded.
    pub async fn load_around(&self, q: i32, r: i32, radius: u32) -> bool {
        let Some(tiles) = self
            .request(
                "load_around",
                self.transport.fetch_around(Hex::new(q, r), radius),
            )
            .await
        else {
            return false;
        };
        self.world.update(|w| {
            w.merge_tiles(tiles);
        });
        true
    }

    /// Persist a terrain change, then apply it locally. On failure the local
    /// tile is left as it was. A coordinate that is not loaded locally is
    /// persisted but not added.
    pub async fn update_tile(&self, q: i32, r: i32, terrain: &str) -> bool {
        let request = UpdateTileRequest {
            q,
            r,
            terrain: terrain.to_string(),
        };
        let Some(mut confirmed) = self
            .request("update_tile", self.transport.update_tile(request))
            .await
        else {
            return false;
        };
        // The coordinate we asked for is authoritative for placement.
        confirmed.q = q;
        confirmed.r = r;
        confirmed.terrain = terrain.to_string();

        let mut replaced = false;
        self.world
            .update(|w| replaced = w.apply_confirmed_tile(confirmed.clone()));
        if !replaced {
            warn!("worldmap update_tile: ({q}, {r}) is not loaded locally");
        }
        if self
            .selected
            .with_untracked(|s| s.as_ref().is_some_and(|t| t.coord() == confirmed.coord()))
        {
            self.selected.set(Some(confirmed));
        }
        true
    }

    /// Persist the full collection; adopt the server's version on success.
    pub async fn save(&self) -> bool {
        let request = self.world.with_untracked(|w| SaveRequest {
            tiles: w.tiles.clone(),
            map_size: w.map_size,
        });
        let Some(version) = self.request("save", self.transport.save(request)).await else {
            return false;
        };
        self.world.update(|w| w.version = version);
        true
    }

    /// Regenerate the map. `map_size` is expected to be clamped by the caller.
    pub async fn generate(&self, map_size: u32) -> bool {
        let Some(world) = self
            .request("generate", self.transport.generate(map_size))
            .await
        else {
            return false;
        };
        self.world.update(|w| w.replace_world(world));
        self.selected.set(None);
        true
    }

    pub fn select_tile(&self, tile: Option<Tile>) {
        self.selected.set(tile);
    }

    pub fn clear_error(&self) {
        self.status.update(|s| s.error = None);
    }

    pub fn find_player_tile(&self) -> Option<Tile> {
        let user_id = self.user_id.get_untracked();
        self.world
            .with_untracked(|w| w.player_tile(user_id.as_deref()).cloned())
    }

    pub fn distance(from: Hex, to: Hex) -> u32 {
        axial_distance(from, to)
    }

    async fn request<R>(
        &self,
        op: &'static str,
        call: impl Future<Output = Result<R, MapError>>,
    ) -> Option<R> {
        self.status.update(|s| s.in_flight += 1);
        let result = call.await;
        self.status.update(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.error = result.as_ref().err().map(|e| e.message.clone());
        });
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("worldmap {op} failed: {e}");
                None
            }
        }
    }
}
