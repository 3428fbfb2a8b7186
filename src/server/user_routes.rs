use super::response::{read_upload, required_text, ApiResult, JsonBody};
use super::session::Session;
use super::state::{GuardedMediaManager, GuardedUserManager, ServerState};
use super::stream_media::stream_media;
use crate::error::ApiError;
use crate::media::MediaKind;
use crate::user::{ProfileChanges, Registration};

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, Debug)]
struct RegisterBody {
    email: Option<String>,
    password: Option<String>,
    username: Option<String>,
    nick: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct UpdateBody {
    username: Option<String>,
    nick: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    JsonBody(body): JsonBody<RegisterBody>,
) -> ApiResult {
    let registration = Registration {
        email: required_text(body.email, "email")?,
        password: required_text(body.password, "password")?,
        username: required_text(body.username, "username")?,
        nick: required_text(body.nick, "nick")?,
    };
    let user = user_manager.register(registration)?;
    Ok(Json(json!({
        "status": "success",
        "message": "User registered",
        "user": {
            "_id": user.id,
            "username": user.username,
            "email": user.email,
            "nick": user.nick,
        },
    })))
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    JsonBody(body): JsonBody<LoginBody>,
) -> ApiResult {
    let email = required_text(body.email, "email")?;
    let password = required_text(body.password, "password")?;
    let outcome = user_manager.login(&email, &password)?;
    Ok(Json(json!({
        "status": "success",
        "user": {
            "id": outcome.user.id,
            "name": outcome.user.username,
            "nick": outcome.user.nick,
            "role": outcome.user.role,
        },
        "token": outcome.token,
    })))
}

async fn profile(
    _session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<String>,
) -> ApiResult {
    let user = user_manager.profile(&id)?;
    Ok(Json(json!({ "status": "success", "profile": user })))
}

/// Acts on the caller's own account.
async fn update(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    JsonBody(body): JsonBody<UpdateBody>,
) -> ApiResult {
    let changes = ProfileChanges {
        username: body.username,
        nick: body.nick,
        email: body.email,
        password: body.password.filter(|p| !p.is_empty()),
    };
    let user = user_manager.update_profile(session.user_id(), changes)?;
    Ok(Json(json!({
        "status": "success",
        "message": "User updated",
        "user": user,
    })))
}

async fn upload_avatar(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let upload = read_upload(multipart).await?;
    let user = user_manager.set_avatar(session.user_id(), upload).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Avatar updated",
        "user": user,
    })))
}

async fn get_avatar(
    State(media): State<GuardedMediaManager>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    stream_media(&media, MediaKind::Avatar, &file).await
}

pub fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile/{id}", get(profile))
        .route("/update", put(update))
        .route("/upload", post(upload_avatar))
        .route("/avatar/{file}", get(get_avatar))
}
