//! Signed bearer tokens (HS256 JWT).
//!
//! There is no refresh and no revocation: a token stays valid until `exp`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::UserRole;
use crate::catalog_store::User;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub nick: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub image: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("The token has expired")]
    Expired,
    #[error("The token could not be processed")]
    Malformed,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        TokenService {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, user: &User, issued_at: i64) -> Result<String, TokenError> {
        let expires_at = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;
        let claims = Claims {
            id: user.id.clone(),
            username: user.username.clone(),
            nick: user.nick.clone(),
            email: user.email.clone(),
            role: user.role,
            image: user.image.clone(),
            iat: issued_at,
            exp: expires_at,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// A token is expired once `exp <= now`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| TokenError::Malformed)?
            .claims;

        if claims.exp <= chrono::Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
