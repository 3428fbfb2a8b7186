//! Catalog persistence: entities, SQLite schema and the store trait.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::*;
pub(crate) use store::{apply_update, push_text};
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
