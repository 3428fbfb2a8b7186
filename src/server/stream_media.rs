use crate::error::ApiError;
use crate::media::{MediaKind, MediaManager};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use tokio::io::BufReader;
use tokio_util::io::ReaderStream;
use tracing::debug;

const STREAM_BUFFER_SIZE: usize = 4096 * 16;

pub async fn stream_media(
    media: &MediaManager,
    kind: MediaKind,
    file_name: &str,
) -> Result<Response, ApiError> {
    let media_file = media.open(kind, file_name).await?;
    debug!(
        "Streaming {} ({}, {} bytes)",
        file_name, media_file.content_type, media_file.len
    );

    let reader = BufReader::with_capacity(STREAM_BUFFER_SIZE, media_file.file);
    let body = Body::from_stream(ReaderStream::with_capacity(reader, STREAM_BUFFER_SIZE));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_file.content_type)
        .header(header::CONTENT_LENGTH, media_file.len)
        .body(body)
        .map_err(|err| ApiError::Internal(err.into()))
}
