//! Like toggling.
//!
//! The counter follows the intent of each request, not the state of the
//! like record: liking the same song twice adds two to its counter while a
//! single record exists for the pair. Unliking never goes below zero.

use super::CatalogManager;
use crate::catalog_store::{LikeKind, LikeTarget, LikedEntity};
use crate::error::ApiError;
use tracing::debug;

impl CatalogManager {
    pub fn toggle_like(
        &self,
        user_id: &str,
        kind: &str,
        target_id: &str,
        want_like: bool,
    ) -> Result<LikedEntity, ApiError> {
        if self.users.get_user(user_id)?.is_none() {
            return Err(ApiError::not_found("The user does not exist"));
        }
        let kind = kind
            .parse::<LikeKind>()
            .map_err(|_| ApiError::Validation(format!("Cannot like a '{}'", kind)))?;
        let target = LikeTarget::new(kind, target_id);
        if self.store.get_liked_entity(&target)?.is_none() {
            return Err(ApiError::not_found(format!("The {} does not exist", kind)));
        }

        if self.store.insert_like_if_absent(user_id, &target, want_like)? {
            debug!(
                "Recorded like of {} {} by {} ({})",
                kind, target_id, user_id, want_like
            );
        }

        let delta = if want_like { 1 } else { -1 };
        if !self.store.adjust_like_counter(&target, delta)? {
            return Err(ApiError::not_found(format!("The {} does not exist", kind)));
        }

        self.store
            .get_liked_entity(&target)?
            .ok_or_else(|| ApiError::not_found(format!("The {} does not exist", kind)))
    }
}
