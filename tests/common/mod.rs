//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, SUPER_ADMIN_EMAIL};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_users() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::super_admin(server.base_url.clone()).await;
//!
//!     let response = client.list_users(1, 10).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::{redirect_location, view, TestClient};
pub use constants::*;
pub use server::TestServer;
