//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per endpoint. When routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client carrying an optional bearer token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Sent in the `Authorization` header when set
    pub token: Option<String>,
}

#[allow(dead_code)]
impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client that sends the given token as is
    pub fn with_token(base_url: String, token: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token.into());
        client
    }

    /// Creates a client logged in as the regular test user
    ///
    /// # Panics
    ///
    /// Panics if logging in fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::logged_in(base_url, TEST_EMAIL, TEST_PASS).await
    }

    /// Creates a client logged in as the admin test user
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::logged_in(base_url, ADMIN_EMAIL, ADMIN_PASS).await
    }

    pub async fn logged_in(base_url: String, email: &str, password: &str) -> Self {
        let mut client = Self::new(base_url);

        let response = client.login(email, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Authentication of {} failed",
            email
        );
        let body: Value = response.json().await.expect("Login response is not JSON");
        let token = body["token"]
            .as_str()
            .expect("Login response has no token")
            .to_string();
        client.token = Some(token);

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Response {
        self.authorize(request)
            .send()
            .await
            .expect("Request failed")
    }

    async fn get(&self, path: &str) -> Response {
        self.send(self.client.get(self.url(path))).await
    }

    async fn delete(&self, path: &str) -> Response {
        self.send(self.client.delete(self.url(path))).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.send(self.client.post(self.url(path)).json(&body)).await
    }

    async fn put_json(&self, path: &str, body: Value) -> Response {
        self.send(self.client.put(self.url(path)).json(&body)).await
    }

    async fn post_form(&self, path: &str, form: Form) -> Response {
        self.send(self.client.post(self.url(path)).multipart(form))
            .await
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // User Endpoints
    // ========================================================================

    /// POST /api/user/register
    pub async fn register(&self, email: &str, password: &str, username: &str, nick: &str) -> Response {
        self.post_json(
            "/api/user/register",
            json!({
                "email": email,
                "password": password,
                "username": username,
                "nick": nick,
            }),
        )
        .await
    }

    /// POST /api/user/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_json(
            "/api/user/login",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// GET /api/user/profile/{id}
    pub async fn get_profile(&self, user_id: &str) -> Response {
        self.get(&format!("/api/user/profile/{}", user_id)).await
    }

    /// PUT /api/user/update
    pub async fn update_user(&self, changes: Value) -> Response {
        self.put_json("/api/user/update", changes).await
    }

    /// POST /api/user/upload
    pub async fn upload_avatar(&self, form: Form) -> Response {
        self.post_form("/api/user/upload", form).await
    }

    /// GET /api/user/avatar/{file}
    pub async fn get_avatar(&self, file: &str) -> Response {
        self.get(&format!("/api/user/avatar/{}", file)).await
    }

    // ========================================================================
    // Artist Endpoints
    // ========================================================================

    /// POST /api/artist/save
    pub async fn save_artist(&self, name: &str, description: &str) -> Response {
        self.post_json(
            "/api/artist/save",
            json!({ "name": name, "description": description }),
        )
        .await
    }

    /// GET /api/artist/search/{id}
    pub async fn get_artist(&self, id: &str) -> Response {
        self.get(&format!("/api/artist/search/{}", id)).await
    }

    /// GET /api/artist/list or /api/artist/list/{page}
    pub async fn list_artists(&self, page: Option<&str>) -> Response {
        match page {
            Some(page) => self.get(&format!("/api/artist/list/{}", page)).await,
            None => self.get("/api/artist/list").await,
        }
    }

    /// PUT /api/artist/update/{id}
    pub async fn update_artist(&self, id: &str, changes: Value) -> Response {
        self.put_json(&format!("/api/artist/update/{}", id), changes)
            .await
    }

    /// DELETE /api/artist/remove/{id}
    pub async fn remove_artist(&self, id: &str) -> Response {
        self.delete(&format!("/api/artist/remove/{}", id)).await
    }

    /// POST /api/artist/upload/{id}
    pub async fn upload_artist_image(&self, id: &str, form: Form) -> Response {
        self.post_form(&format!("/api/artist/upload/{}", id), form)
            .await
    }

    /// GET /api/artist/avatar/{file}
    pub async fn get_artist_image(&self, file: &str) -> Response {
        self.get(&format!("/api/artist/avatar/{}", file)).await
    }

    // ========================================================================
    // Album Endpoints
    // ========================================================================

    /// POST /api/album/save
    pub async fn save_album(&self, album: Value) -> Response {
        self.post_json("/api/album/save", album).await
    }

    /// GET /api/album/search/{id}
    pub async fn get_album(&self, id: &str) -> Response {
        self.get(&format!("/api/album/search/{}", id)).await
    }

    /// GET /api/album/list/{artist_id}
    pub async fn list_albums(&self, artist_id: &str) -> Response {
        self.get(&format!("/api/album/list/{}", artist_id)).await
    }

    /// PUT /api/album/update/{id}
    pub async fn update_album(&self, id: &str, changes: Value) -> Response {
        self.put_json(&format!("/api/album/update/{}", id), changes)
            .await
    }

    /// DELETE /api/album/remove/{id}
    pub async fn remove_album(&self, id: &str) -> Response {
        self.delete(&format!("/api/album/remove/{}", id)).await
    }

    /// POST /api/album/upload/{id}
    pub async fn upload_album_cover(&self, id: &str, form: Form) -> Response {
        self.post_form(&format!("/api/album/upload/{}", id), form)
            .await
    }

    /// GET /api/album/cover-art/{file}
    pub async fn get_album_cover(&self, file: &str) -> Response {
        self.get(&format!("/api/album/cover-art/{}", file)).await
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    /// POST /api/song/save
    pub async fn save_song(&self, song: Value) -> Response {
        self.post_json("/api/song/save", song).await
    }

    /// GET /api/song/search-song/{id}
    pub async fn get_song(&self, id: &str) -> Response {
        self.get(&format!("/api/song/search-song/{}", id)).await
    }

    /// GET /api/song/list/{album_id}
    pub async fn list_songs(&self, album_id: &str) -> Response {
        self.get(&format!("/api/song/list/{}", album_id)).await
    }

    /// PUT /api/song/update/{id}
    pub async fn update_song(&self, id: &str, changes: Value) -> Response {
        self.put_json(&format!("/api/song/update/{}", id), changes)
            .await
    }

    /// DELETE /api/song/remove/{id}
    pub async fn remove_song(&self, id: &str) -> Response {
        self.delete(&format!("/api/song/remove/{}", id)).await
    }

    /// POST /api/song/upload/{id}
    pub async fn upload_song_file(&self, id: &str, form: Form) -> Response {
        self.post_form(&format!("/api/song/upload/{}", id), form)
            .await
    }

    /// GET /api/song/audio/{file}
    pub async fn get_audio(&self, file: &str) -> Response {
        self.get(&format!("/api/song/audio/{}", file)).await
    }

    // ========================================================================
    // Like Endpoint
    // ========================================================================

    /// PUT /api/like
    pub async fn like(&self, kind: &str, id: &str, like_publication: bool) -> Response {
        self.put_json(
            "/api/like",
            json!({
                "modelId": id,
                "modelname": kind,
                "likePublication": like_publication,
            }),
        )
        .await
    }

    /// PUT /api/like with an arbitrary body
    pub async fn like_raw(&self, path: &str, body: Value) -> Response {
        self.put_json(path, body).await
    }
}
