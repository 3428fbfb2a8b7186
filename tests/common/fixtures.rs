//! Catalog fixtures built through the HTTP API
//!
//! Route-level tests need ids the server generated, so the fixture creates
//! its entities with an admin client instead of writing to the database.

use super::client::TestClient;
use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Two artists; the first has two albums, each with two songs.
#[allow(dead_code)]
pub struct CatalogFixture {
    pub artist_1: String,
    pub artist_2: String,
    pub album_1: String,
    pub album_2: String,
    /// Songs of album 1
    pub songs_1: Vec<String>,
    /// Songs of album 2
    pub songs_2: Vec<String>,
}

async fn created_id(response: reqwest::Response, key: &str) -> String {
    assert_eq!(response.status(), StatusCode::OK, "Failed to create {}", key);
    let body: Value = response.json().await.expect("Response is not JSON");
    body[key]["_id"]
        .as_str()
        .unwrap_or_else(|| panic!("No {} id in {}", key, body))
        .to_string()
}

#[allow(dead_code)]
impl CatalogFixture {
    pub async fn create(admin: &TestClient) -> Self {
        let artist_1 = created_id(
            admin.save_artist(ARTIST_1_NAME, "Plays loud").await,
            "artist",
        )
        .await;
        let artist_2 = created_id(
            admin.save_artist(ARTIST_2_NAME, "Plays smooth").await,
            "artist",
        )
        .await;

        let mut albums = Vec::new();
        for (title, year) in [(ALBUM_1_TITLE, 2001), (ALBUM_2_TITLE, 2004)] {
            albums.push(
                created_id(
                    admin
                        .save_album(json!({
                            "artist": artist_1,
                            "title": title,
                            "description": "Recorded live",
                            "year": year,
                        }))
                        .await,
                    "album",
                )
                .await,
            );
        }

        let mut songs = Vec::new();
        for album in &albums {
            let mut album_songs = Vec::new();
            for (track, name) in [(1, TRACK_1_TITLE), (2, TRACK_2_TITLE)] {
                album_songs.push(
                    created_id(
                        admin
                            .save_song(json!({
                                "album": album,
                                "track": track,
                                "name": name,
                                "duration": "3:30",
                            }))
                            .await,
                        "song",
                    )
                    .await,
                );
            }
            songs.push(album_songs);
        }

        let songs_2 = songs.pop().unwrap_or_default();
        let songs_1 = songs.pop().unwrap_or_default();
        let album_2 = albums.pop().unwrap_or_default();
        let album_1 = albums.pop().unwrap_or_default();

        Self {
            artist_1,
            artist_2,
            album_1,
            album_2,
            songs_1,
            songs_2,
        }
    }
}

/// A multipart form with the bytes under the `file` field.
pub fn upload_form(file_name: &str, bytes: &[u8]) -> Form {
    Form::new().part("file", Part::bytes(bytes.to_vec()).file_name(file_name.to_string()))
}

#[allow(dead_code)]
pub fn image_upload(file_name: &str) -> Form {
    upload_form(file_name, PNG_BYTES)
}

#[allow(dead_code)]
pub fn audio_upload(file_name: &str) -> Form {
    upload_form(file_name, MP3_BYTES)
}
