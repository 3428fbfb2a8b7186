use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::{
    album_routes::album_routes, artist_routes::artist_routes, like_routes::like_routes,
    log_requests, song_routes::song_routes, state::ServerState, user_routes::user_routes,
    ServerConfig,
};
use crate::catalog_manager::CatalogManager;
use crate::catalog_store::CatalogStore;
use crate::media::MediaManager;
use crate::user::{TokenService, UserManager, UserStore};

#[derive(Serialize)]
struct ServerStats {
    pub status: &'static str,
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(ServerStats {
        status: "success",
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog_store: Arc<dyn CatalogStore>,
        user_store: Arc<dyn UserStore>,
        media: MediaManager,
        tokens: TokenService,
    ) -> ServerState {
        let media = Arc::new(media);
        ServerState {
            config,
            start_time: Instant::now(),
            user_manager: Arc::new(UserManager::new(
                user_store.clone(),
                tokens.clone(),
                media.clone(),
            )),
            catalog_manager: Arc::new(CatalogManager::new(
                catalog_store,
                user_store,
                media.clone(),
            )),
            media,
            tokens,
        }
    }
}

pub fn make_app(state: ServerState) -> Router {
    let api_routes: Router<ServerState> = Router::new()
        .nest("/user", user_routes())
        .nest("/artist", artist_routes())
        .nest("/album", album_routes())
        .nest("/song", song_routes())
        .merge(like_routes());

    Router::new()
        .route("/", get(home))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::SqliteCatalogStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap());
        let media = MediaManager::new(dir.path().join("media")).unwrap();
        let tokens = TokenService::new(b"secret", Duration::from_secs(60));
        let state = ServerState::new(
            ServerConfig::default(),
            store.clone(),
            store,
            media,
            tokens,
        );
        (dir, make_app(state))
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let (_dir, app) = make_test_app();

        let protected_routes = vec![
            ("GET", "/api/user/profile/123"),
            ("PUT", "/api/user/update"),
            ("POST", "/api/user/upload"),
            ("POST", "/api/artist/save"),
            ("GET", "/api/artist/search/123"),
            ("GET", "/api/artist/list"),
            ("GET", "/api/artist/list/2"),
            ("DELETE", "/api/artist/remove/123"),
            ("GET", "/api/artist/avatar/a.png"),
            ("GET", "/api/album/list/123"),
            ("GET", "/api/album/cover-art/a.png"),
            ("DELETE", "/api/song/remove/123"),
            ("GET", "/api/song/audio/a.mp3"),
            ("PUT", "/api/like"),
            ("PUT", "/api/like/"),
        ];

        for (method, route) in protected_routes.into_iter() {
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, route);
        }
    }

    #[tokio::test]
    async fn home_is_public() {
        let (_dir, app) = make_test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
