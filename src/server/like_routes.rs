use super::response::{required, required_text, ApiResult, JsonBody};
use super::session::Session;
use super::state::{GuardedCatalogManager, ServerState};

use axum::{extract::State, routing::put, Json, Router};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct LikeBody {
    model_id: Option<String>,
    /// One of `song`, `album` or `artist`.
    #[serde(rename = "modelname")]
    model_name: Option<String>,
    like_publication: Option<bool>,
}

async fn like(
    session: Session,
    State(catalog): State<GuardedCatalogManager>,
    JsonBody(body): JsonBody<LikeBody>,
) -> ApiResult {
    let target_id = required_text(body.model_id, "modelId")?;
    let kind = required_text(body.model_name, "modelname")?;
    let want_like = required(body.like_publication, "likePublication")?;

    let entity = catalog.toggle_like(session.user_id(), &kind, &target_id, want_like)?;
    Ok(Json(json!({
        "status": "success",
        "message": if want_like { "Like added" } else { "Like removed" },
        "dataLike": entity,
    })))
}

/// Merged rather than nested so that both `/like` and `/like/` match.
pub fn like_routes() -> Router<ServerState> {
    Router::new()
        .route("/like", put(like))
        .route("/like/", put(like))
}
