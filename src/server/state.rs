use axum::extract::FromRef;

use crate::catalog_manager::CatalogManager;
use crate::media::MediaManager;
use crate::user::{TokenService, UserManager};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedCatalogManager = Arc<CatalogManager>;
pub type GuardedMediaManager = Arc<MediaManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub catalog_manager: GuardedCatalogManager,
    pub media: GuardedMediaManager,
    pub tokens: TokenService,
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogManager {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedMediaManager {
    fn from_ref(input: &ServerState) -> Self {
        input.media.clone()
    }
}
