//! Artist Manager Server Library
//!
//! This library exposes the internal modules for the binaries and for testing.

pub mod artist_csv;
pub mod config;
pub mod pagination;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod user;

// Re-export commonly used types for convenience
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use store::{FullStore, SqliteStore};
