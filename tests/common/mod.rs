//! Common test infrastructure
//!
//! Every end-to-end test spawns its own [`TestServer`] on a random port, with
//! a fresh database and media directory, and talks to it through a
//! [`TestClient`].
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_artists() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone()).await;
//!
//!     let response = client.list_artists(None).await;
//!     assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{audio_upload, image_upload, CatalogFixture};
pub use server::TestServer;
