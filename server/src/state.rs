use std::sync::Arc;

use hexworld_shared::WorldMap;
use tokio::sync::RwLock;

use crate::config;
use crate::generator::generate_world;

#[derive(Clone)]
pub struct AppState {
    pub world: Arc<RwLock<WorldMap>>,
    /// Required bearer token for mutations; `None` leaves them open.
    pub admin_token: Option<Arc<str>>,
    pub seed: Option<u64>,
}

impl AppState {
    pub fn new(world: WorldMap, admin_token: Option<String>, seed: Option<u64>) -> Self {
        Self {
            world: Arc::new(RwLock::new(world)),
            admin_token: admin_token.map(Arc::from),
            seed,
        }
    }

    /// State seeded from the environment: a generated map at version 1.
    pub fn from_env() -> Self {
        let seed = config::map_seed();
        let world = generate_world(config::initial_map_size(), seed, 1);
        Self::new(world, config::admin_token(), seed)
    }
}
