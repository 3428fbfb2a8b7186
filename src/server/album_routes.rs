use super::response::{lenient_i64, read_upload, required, required_text, ApiResult, JsonBody};
use super::session::Session;
use super::state::{GuardedCatalogManager, GuardedMediaManager, ServerState};
use super::stream_media::stream_media;
use crate::catalog_store::{AlbumUpdate, NewAlbum};
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
struct AlbumBody {
    artist: Option<String>,
    title: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    year: Option<i64>,
}

async fn save(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    JsonBody(body): JsonBody<AlbumBody>,
) -> ApiResult {
    session.require_admin()?;
    let album = catalog.save_album(NewAlbum {
        artist_id: required_text(body.artist, "artist")?,
        title: required_text(body.title, "title")?,
        description: body.description,
        year: required(body.year, "year")?,
    })?;
    Ok(Json(json!({
        "status": "success",
        "message": "Album saved",
        "album": album,
    })))
}

async fn search(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> ApiResult {
    let album = catalog.get_album(&id)?;
    Ok(Json(json!({ "status": "success", "album": album })))
}

async fn list(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(artist_id): Path<String>,
) -> ApiResult {
    let albums = catalog.list_albums(&artist_id)?;
    Ok(Json(json!({ "status": "success", "albums": albums })))
}

async fn update(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(album_id): Path<String>,
    JsonBody(body): JsonBody<AlbumBody>,
) -> ApiResult {
    session.require_admin()?;
    let album = catalog.update_album(
        &album_id,
        AlbumUpdate {
            artist_id: body.artist,
            title: body.title,
            description: body.description,
            year: body.year,
        },
    )?;
    Ok(Json(json!({
        "status": "success",
        "message": "Album updated",
        "album": album,
    })))
}

async fn remove(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(album_id): Path<String>,
) -> ApiResult {
    session.require_admin()?;
    let deletion = catalog.delete_album(&album_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Album deleted together with its songs",
        "album": deletion.album,
        "songsDeleted": { "deletedCount": deletion.songs_deleted },
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
    let album = catalog.set_album_image(&id, upload).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Album cover updated",
        "album": album,
    })))
}

async fn cover_art(
    _session: Session,
    State(media): State<GuardedMediaManager>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    stream_media(&media, MediaKind::AlbumCover, &file).await
}

pub fn album_routes() -> Router<ServerState> {
    Router::new()
        .route("/save", post(save))
        .route("/search/{id}", get(search))
        .route("/list/{artist_id}", get(list))
        .route("/update/{album_id}", put(update))
        .route("/remove/{album_id}", delete(remove))
        .route("/upload/{id}", post(upload))
        .route("/cover-art/{file}", get(cover_art))
}
