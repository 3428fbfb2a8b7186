use super::response::{lenient_i64, read_upload, required, required_text, ApiResult, JsonBody};
use super::session::Session;
use super::state::{GuardedCatalogManager, GuardedMediaManager, ServerState};
use super::stream_media::stream_media;
use crate::catalog_store::{NewSong, SongUpdate};
use crate::error::ApiError;
use crate::media::MediaKind;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, Debug)]
struct SongBody {
    album: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    track: Option<i64>,
    name: Option<String>,
    duration: Option<String>,
}

async fn save(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    JsonBody(body): JsonBody<SongBody>,
) -> ApiResult {
    session.require_admin()?;
    let song = catalog.save_song(NewSong {
        album_id: required_text(body.album, "album")?,
        track: required(body.track, "track")?,
        name: required_text(body.name, "name")?,
        duration: body.duration,
    })?;
    Ok(Json(json!({
        "status": "success",
        "message": "Song saved",
        "song": song,
    })))
}

async fn search(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> ApiResult {
    let song = catalog.get_song(&id)?;
    Ok(Json(json!({ "status": "success", "song": song })))
}

async fn list(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(album_id): Path<String>,
) -> ApiResult {
    let songs = catalog.list_songs(&album_id)?;
    Ok(Json(json!({ "status": "success", "songs": songs })))
}

async fn update(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(song_id): Path<String>,
    JsonBody(body): JsonBody<SongBody>,
) -> ApiResult {
    session.require_admin()?;
    let song = catalog.update_song(
        &song_id,
        SongUpdate {
            album_id: body.album,
            track: body.track,
            name: body.name,
            duration: body.duration,
        },
    )?;
    Ok(Json(json!({
        "status": "success",
        "message": "Song updated",
        "song": song,
    })))
}

async fn remove(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(song_id): Path<String>,
) -> ApiResult {
    session.require_admin()?;
    let song = catalog.delete_song(&song_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Song deleted",
        "song": song,
    })))
}

async fn upload(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    session.require_admin()?;
    let upload = read_upload(multipart).await?;
    let song = catalog.set_song_file(&id, upload).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Audio file updated",
        "song": song,
    })))
}

async fn audio(
    _session: Session,
    State(media): State<GuardedMediaManager>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    stream_media(&media, MediaKind::Audio, &file).await
}

pub fn song_routes() -> Router<ServerState> {
    Router::new()
        .route("/save", post(save))
        .route("/search-song/{id}", get(search))
        .route("/list/{album_id}", get(list))
        .route("/update/{song_id}", put(update))
        .route("/remove/{song_id}", delete(remove))
        .route("/upload/{id}", post(upload))
        .route("/audio/{file}", get(audio))
}
