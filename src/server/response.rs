//! The JSON envelope and the extractors that report failures through it.

use crate::error::ApiError;
use crate::media::Upload;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        FromRequest, Request,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{error, warn};

pub const UPLOAD_FIELD: &str = "file";

pub type ApiResult = Result<Json<Value>, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                json!({
                    "status": "error",
                    "message": "Internal server error",
                    "error": format!("{:#}", err),
                })
            }
            other => json!({
                "status": "error",
                "message": other.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Like [`Json`], but a malformed body is a validation error.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("The field '{}' is required", field)))
}

/// Blank strings count as missing.
pub fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    required(value.filter(|v| !v.trim().is_empty()), field)
}

/// Accepts `2001` as well as `"2001"`, for clients posting form-like bodies.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(i64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a number", text))),
    }
}

/// Pulls the `file` field out of a multipart form.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Upload, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        ApiError::Validation(format!("Expected a multipart form: {}", rejection.body_text()))
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!("Failed to read multipart field: {}", err);
                return Err(ApiError::Validation(err.body_text()));
            }
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::Validation(err.body_text()))?;
        return Ok(Upload { file_name, data });
    }

    Err(ApiError::validation("The request does not include a file"))
}
