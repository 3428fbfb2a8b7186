use super::state::ServerState;
use crate::error::ApiError;
use crate::user::{Claims, UserRole};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

/// The verified identity of the caller.
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: Claims,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.claims.id
    }

    pub fn role(&self) -> UserRole {
        self.claims.role
    }

    /// Every catalog mutation goes through here.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role().can_edit_catalog() {
            Ok(())
        } else {
            debug!("User {} is not allowed to edit the catalog", self.user_id());
            Err(ApiError::Forbidden(
                "You are not allowed to perform this action".to_string(),
            ))
        }
    }
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Accepts a raw token or `Bearer <token>`, optionally wrapped in quotes.
fn extract_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let value = value.trim().trim_matches(is_quote).trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
        .trim_matches(is_quote);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token_from_headers(parts).ok_or_else(|| {
            debug!("No token in headers.");
            ApiError::Forbidden("The request has no authentication header".to_string())
        })?;

        let claims = ctx.tokens.verify(&token).map_err(|err| {
            debug!("Rejected token: {}", err);
            ApiError::from(err)
        })?;
        Ok(Session { claims })
    }
}
