//! Catalog entities as stored and as serialized on the wire.
//!
//! Entity ids are serialized as `_id`, like counters as `like`. Creation
//! timestamps live only in the database and are never part of a payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::user::UserRole;

/// Placeholder image assigned to new artists and albums.
pub const DEFAULT_IMAGE: &str = "default.png";

/// Placeholder audio file assigned to new songs.
pub const DEFAULT_AUDIO_FILE: &str = "default.mp3";

pub fn new_entity_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// =============================================================================
// Users
// =============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub nick: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A user together with the stored password hash, only used to log in.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub nick: String,
    /// Already lowercased.
    pub email: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub nick: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.nick.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
    }
}

// =============================================================================
// Artists
// =============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Artist {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "usuario")]
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "like")]
    pub likes: i64,
}

/// The artist fields embedded in populated album and song listings.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ArtistSummary {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct NewArtist {
    pub owner_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct ArtistUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Albums
// =============================================================================

/// An album. `A` is the artist reference: the plain id, or an
/// [`ArtistSummary`] when populated.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Album<A = String> {
    #[serde(rename = "_id")]
    pub id: String,
    pub artist: A,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub year: i64,
    pub image: String,
    #[serde(rename = "like")]
    pub likes: i64,
}

impl<A> Album<A> {
    pub fn with_artist<B>(self, artist: B) -> Album<B> {
        Album {
            id: self.id,
            artist,
            title: self.title,
            description: self.description,
            year: self.year,
            image: self.image,
            likes: self.likes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewAlbum {
    pub artist_id: String,
    pub title: String,
    pub description: Option<String>,
    pub year: i64,
}

#[derive(Clone, Debug, Default)]
pub struct AlbumUpdate {
    pub artist_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<i64>,
}

// =============================================================================
// Songs
// =============================================================================

/// A song. `A` is the album reference: the plain id, or a populated album.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Song<A = String> {
    #[serde(rename = "_id")]
    pub id: String,
    pub album: A,
    pub track: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub file: String,
    #[serde(rename = "like")]
    pub likes: i64,
}

impl<A> Song<A> {
    pub fn with_album<B>(self, album: B) -> Song<B> {
        Song {
            id: self.id,
            album,
            track: self.track,
            name: self.name,
            duration: self.duration,
            file: self.file,
            likes: self.likes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewSong {
    pub album_id: String,
    pub track: i64,
    pub name: String,
    pub duration: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SongUpdate {
    pub album_id: Option<String>,
    pub track: Option<i64>,
    pub name: Option<String>,
    pub duration: Option<String>,
}

// =============================================================================
// Likes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeKind {
    Song,
    Album,
    Artist,
}

impl LikeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeKind::Song => "song",
            LikeKind::Album => "album",
            LikeKind::Artist => "artist",
        }
    }
}

impl FromStr for LikeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "song" => Ok(LikeKind::Song),
            "album" => Ok(LikeKind::Album),
            "artist" => Ok(LikeKind::Artist),
            _ => anyhow::bail!("Unknown like target kind {}", s),
        }
    }
}

impl fmt::Display for LikeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LikeTarget {
    pub kind: LikeKind,
    pub id: String,
}

impl LikeTarget {
    pub fn new(kind: LikeKind, id: impl Into<String>) -> Self {
        LikeTarget {
            kind,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub target: LikeTarget,
    pub like_publication: bool,
}

/// Whatever entity a like points at, serialized as the entity itself.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LikedEntity {
    Song(Song),
    Album(Album),
    Artist(Artist),
}
