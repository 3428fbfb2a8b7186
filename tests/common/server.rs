//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database and media root.

use super::constants::*;
use music_catalog_api::catalog_store::{SqliteCatalogStore, User};
use music_catalog_api::media::MediaManager;
use music_catalog_api::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use music_catalog_api::user::{Registration, TokenService, UserRole, UserStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and the temp dir is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store for direct database access in tests
    pub store: Arc<SqliteCatalogStore>,

    /// Signs tokens with the same secret as the server
    pub tokens: TokenService,

    /// Root of the uploaded media
    pub media_path: PathBuf,

    pub regular_user: User,
    pub admin_user: User,

    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// A regular user and an admin are registered before the server starts
    /// listening, see [`TEST_EMAIL`] and [`ADMIN_EMAIL`].
    ///
    /// # Panics
    ///
    /// Panics if any part of the setup fails.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let media_path = temp_dir.path().join("media");

        let store = Arc::new(
            SqliteCatalogStore::new(temp_dir.path().join("catalog.db"))
                .expect("Failed to open catalog store"),
        );
        let media = MediaManager::new(&media_path).expect("Failed to create media manager");
        let tokens = TokenService::new(TEST_TOKEN_SECRET, Duration::from_secs(24 * 60 * 60));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        };
        let state = ServerState::new(config, store.clone(), store.clone(), media, tokens.clone());

        let regular_user = state
            .user_manager
            .register(Registration {
                email: TEST_EMAIL.to_string(),
                password: TEST_PASS.to_string(),
                username: TEST_USERNAME.to_string(),
                nick: TEST_NICK.to_string(),
            })
            .expect("Failed to register test user");
        let mut admin_user = state
            .user_manager
            .register(Registration {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASS.to_string(),
                username: ADMIN_USERNAME.to_string(),
                nick: ADMIN_NICK.to_string(),
            })
            .expect("Failed to register admin user");
        assert!(store
            .set_user_role(&admin_user.id, UserRole::Admin)
            .expect("Failed to promote admin"));
        admin_user.role = UserRole::Admin;

        let app = make_app(state);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            tokens,
            media_path,
            regular_user,
            admin_user,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Path of a stored media file, for asserting on the filesystem.
    #[allow(dead_code)]
    pub fn media_file(&self, dir: &str, name: &str) -> PathBuf {
        self.media_path.join(dir).join(name)
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
