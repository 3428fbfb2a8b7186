use super::response::{read_upload, required_text, ApiResult, JsonBody};
use super::session::Session;
use super::state::{GuardedCatalogManager, GuardedMediaManager, ServerState};
use super::stream_media::stream_media;
use crate::catalog_store::{ArtistUpdate, NewArtist};
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
struct ArtistBody {
    name: Option<String>,
    description: Option<String>,
}

fn parse_page(page: &str) -> Result<usize, ApiError> {
    match page.parse::<usize>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(ApiError::Validation(format!(
            "'{}' is not a valid page number",
            page
        ))),
    }
}

async fn save(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    JsonBody(body): JsonBody<ArtistBody>,
) -> ApiResult {
    session.require_admin()?;
    let artist = catalog.save_artist(NewArtist {
        owner_id: session.user_id().to_string(),
        name: required_text(body.name, "name")?,
        description: required_text(body.description, "description")?,
    })?;
    Ok(Json(json!({
        "status": "success",
        "message": "Artist saved",
        "artist": artist,
    })))
}

async fn search(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> ApiResult {
    let artist = catalog.get_artist(&id)?;
    Ok(Json(json!({ "status": "success", "artist": artist })))
}

fn list_page(catalog: &GuardedCatalogManager, page: usize) -> ApiResult {
    let page = catalog.list_artists(page)?;
    Ok(Json(json!({
        "status": "success",
        "artists": page.artists,
        "totalArtists": page.total,
        "currentPage": page.page,
        "totalPages": page.total_pages,
    })))
}

async fn list_first(_session: Session, State(catalog): State<GuardedCatalogManager>) -> ApiResult {
    list_page(&catalog, 1)
}

async fn list(
    _session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(page): Path<String>,
) -> ApiResult {
    list_page(&catalog, parse_page(&page)?)
}

async fn update(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ArtistBody>,
) -> ApiResult {
    session.require_admin()?;
    let artist = catalog.update_artist(
        &id,
        ArtistUpdate {
            name: body.name,
            description: body.description,
        },
    )?;
    Ok(Json(json!({
        "status": "success",
        "message": "Artist updated",
        "artist": artist,
    })))
}

async fn remove(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> ApiResult {
    session.require_admin()?;
    let deletion = catalog.delete_artist(&id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Artist deleted together with its albums and songs",
        "artist": deletion.artist,
        "albumsDeleted": deletion.albums_deleted,
        "songsDeleted": deletion.songs_deleted,
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
    let artist = catalog.set_artist_image(&id, upload).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Artist image updated",
        "artist": artist,
    })))
}

async fn image(
    _session: Session,
    State(media): State<GuardedMediaManager>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    stream_media(&media, MediaKind::ArtistImage, &file).await
}

pub fn artist_routes() -> Router<ServerState> {
    Router::new()
        .route("/save", post(save))
        .route("/search/{id}", get(search))
        .route("/list", get(list_first))
        .route("/list/{page}", get(list))
        .route("/update/{id}", put(update))
        .route("/remove/{id}", delete(remove))
        .route("/upload/{id}", post(upload))
        .route("/avatar/{file}", get(image))
}
