use crate::media::MediaError;
use crate::user::{DuplicateUserField, TokenError};
use axum::http::StatusCode;
use thiserror::Error;

/// Every failure a request handler can report.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Email or nick already taken.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        ApiError::NotFound(message.into())
    }
}

/// Store errors carrying a duplicate user field become conflicts,
/// everything else is internal.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DuplicateUserField>() {
            Some(field) => ApiError::Conflict(field.to_string()),
            None => ApiError::Internal(err),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Unauthorized("The token has expired".to_string()),
            TokenError::Malformed => ApiError::Unauthorized("The token is not valid".to_string()),
            TokenError::Signing(reason) => {
                ApiError::Internal(anyhow::anyhow!("Could not sign token: {}", reason))
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedExtension(_) | MediaError::InvalidName(_) => {
                ApiError::Validation(err.to_string())
            }
            MediaError::NotFound(_) => ApiError::NotFound(err.to_string()),
            MediaError::Io(_) => ApiError::Internal(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_fields_map_to_conflict() {
        let err: ApiError = anyhow::Error::new(DuplicateUserField::Nick).into();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "The nick is already registered");

        let err: ApiError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn token_errors_are_unauthorized() {
        assert_eq!(
            ApiError::from(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(TokenError::Malformed).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn media_errors_keep_their_class() {
        let err = ApiError::from(MediaError::UnsupportedExtension("gif".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err = ApiError::from(MediaError::NotFound("x.png".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
