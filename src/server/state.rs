use axum::extract::FromRef;

use crate::store::FullStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<dyn FullStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedStore,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, store: GuardedStore) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
