//! Music catalog REST backend.
//!
//! The library exposes the internal modules for the binaries and the
//! end-to-end tests.

pub mod catalog_manager;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod media;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use error::ApiError;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, ServerState};
pub use user::{UserRole, UserStore};
