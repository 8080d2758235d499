mod artist_routes;
pub mod config;
mod errors;
mod forms;
mod guard;
mod http_layers;
pub mod server;
mod session;
mod song_routes;
pub mod state;
mod user_routes;
mod views;

pub use config::ServerConfig;
pub use errors::RouteError;
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::GuardedStore;
