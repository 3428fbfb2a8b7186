//! CatalogStore trait definition.

use super::models::*;
use anyhow::Result;

/// Storage backend for artists, albums, songs and likes.
///
/// Lookups return `Ok(None)` when the entity does not exist and `Err` on
/// storage failures. Mutations of a missing entity return `Ok(None)` or
/// `Ok(false)`.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Artists
    // =========================================================================

    fn create_artist(&self, artist: &NewArtist) -> Result<Artist>;

    fn get_artist(&self, id: &str) -> Result<Option<Artist>>;

    /// Artists sorted by name, `offset` items skipped.
    fn list_artists(&self, offset: usize, limit: usize) -> Result<Vec<Artist>>;

    fn count_artists(&self) -> Result<usize>;

    /// Applies the supplied fields only.
    fn update_artist(&self, id: &str, update: &ArtistUpdate) -> Result<Option<Artist>>;

    fn set_artist_image(&self, id: &str, image: &str) -> Result<bool>;

    /// Fails if the artist still has albums.
    fn delete_artist(&self, id: &str) -> Result<bool>;

    // =========================================================================
    // Albums
    // =========================================================================

    fn create_album(&self, album: &NewAlbum) -> Result<Album>;

    fn get_album(&self, id: &str) -> Result<Option<Album>>;

    /// Album with the artist's name and description embedded.
    fn get_album_with_artist(&self, id: &str) -> Result<Option<Album<ArtistSummary>>>;

    /// Albums of an artist with the artist's id, name and description embedded.
    fn list_albums_by_artist(&self, artist_id: &str) -> Result<Vec<Album<ArtistSummary>>>;

    /// Plain albums of an artist.
    fn get_artist_albums(&self, artist_id: &str) -> Result<Vec<Album>>;

    fn update_album(&self, id: &str, update: &AlbumUpdate) -> Result<Option<Album>>;

    fn set_album_image(&self, id: &str, image: &str) -> Result<bool>;

    /// Fails if the album still has songs.
    fn delete_album(&self, id: &str) -> Result<bool>;

    // =========================================================================
    // Songs
    // =========================================================================

    fn create_song(&self, song: &NewSong) -> Result<Song>;

    fn get_song(&self, id: &str) -> Result<Option<Song>>;

    /// Song with its album embedded.
    fn get_song_with_album(&self, id: &str) -> Result<Option<Song<Album>>>;

    /// Songs of an album sorted by track number, album and artist embedded.
    fn list_songs_by_album(&self, album_id: &str)
        -> Result<Vec<Song<Album<ArtistSummary>>>>;

    /// Plain songs of an album.
    fn get_album_songs(&self, album_id: &str) -> Result<Vec<Song>>;

    fn update_song(&self, id: &str, update: &SongUpdate) -> Result<Option<Song>>;

    fn set_song_file(&self, id: &str, file: &str) -> Result<bool>;

    fn delete_song(&self, id: &str) -> Result<bool>;

    // =========================================================================
    // Likes
    // =========================================================================

    fn find_like(&self, user_id: &str, target: &LikeTarget) -> Result<Option<Like>>;

    /// Records the like unless one already exists for (user, target).
    /// Returns true if a record was created.
    fn insert_like_if_absent(
        &self,
        user_id: &str,
        target: &LikeTarget,
        like_publication: bool,
    ) -> Result<bool>;

    fn count_likes(&self, target: &LikeTarget) -> Result<usize>;

    fn delete_likes_for_target(&self, target: &LikeTarget) -> Result<usize>;

    /// Adds `delta` to the target's counter, never going below zero.
    /// Returns false if the target does not exist.
    fn adjust_like_counter(&self, target: &LikeTarget, delta: i64) -> Result<bool>;

    fn get_liked_entity(&self, target: &LikeTarget) -> Result<Option<LikedEntity>>;
}
