//! Catalog operations on top of the store: parent checks, paging and media.
//!
//! Role checks happen before any of these are called.

mod cascade;
mod likes;

pub use cascade::{AlbumDeletion, ArtistDeletion};

use crate::catalog_store::{
    Album, AlbumUpdate, Artist, ArtistSummary, ArtistUpdate, CatalogStore, NewAlbum, NewArtist,
    NewSong, Song, SongUpdate,
};
use crate::error::ApiError;
use crate::media::{MediaKind, MediaManager, Upload};
use crate::user::UserStore;
use std::sync::Arc;
use tracing::info;

pub const ARTISTS_PAGE_SIZE: usize = 5;

const ARTIST_NOT_FOUND: &str = "The artist does not exist";
const ALBUM_NOT_FOUND: &str = "The album does not exist";
const SONG_NOT_FOUND: &str = "The song does not exist";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistPage {
    pub artists: Vec<Artist>,
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
    users: Arc<dyn UserStore>,
    media: Arc<MediaManager>,
}

fn require_text(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("The field '{}' is required", field)));
    }
    Ok(())
}

impl CatalogManager {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        users: Arc<dyn UserStore>,
        media: Arc<MediaManager>,
    ) -> Self {
        CatalogManager {
            store,
            users,
            media,
        }
    }

    fn artist_exists(&self, id: &str) -> Result<(), ApiError> {
        match self.store.get_artist(id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(ARTIST_NOT_FOUND)),
        }
    }

    fn album_exists(&self, id: &str) -> Result<(), ApiError> {
        match self.store.get_album(id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(ALBUM_NOT_FOUND)),
        }
    }

    // =========================================================================
    // Artists
    // =========================================================================

    pub fn save_artist(&self, artist: NewArtist) -> Result<Artist, ApiError> {
        require_text(&artist.name, "name")?;
        require_text(&artist.description, "description")?;
        let artist = self.store.create_artist(&artist)?;
        info!("Saved artist {} ({})", artist.name, artist.id);
        Ok(artist)
    }

    pub fn get_artist(&self, id: &str) -> Result<Artist, ApiError> {
        self.store
            .get_artist(id)?
            .ok_or_else(|| ApiError::not_found(ARTIST_NOT_FOUND))
    }

    /// `page` is 1-indexed.
    pub fn list_artists(&self, page: usize) -> Result<ArtistPage, ApiError> {
        if page == 0 {
            return Err(ApiError::validation("The page must be a positive number"));
        }
        let total = self.store.count_artists()?;
        let total_pages = total.div_ceil(ARTISTS_PAGE_SIZE);
        let artists = match (page - 1).checked_mul(ARTISTS_PAGE_SIZE) {
            Some(offset) if page <= total_pages => {
                self.store.list_artists(offset, ARTISTS_PAGE_SIZE)?
            }
            _ => Vec::new(),
        };
        Ok(ArtistPage {
            artists,
            total,
            page,
            total_pages,
        })
    }

    pub fn update_artist(&self, id: &str, update: ArtistUpdate) -> Result<Artist, ApiError> {
        if let Some(name) = &update.name {
            require_text(name, "name")?;
        }
        if let Some(description) = &update.description {
            require_text(description, "description")?;
        }
        self.store
            .update_artist(id, &update)?
            .ok_or_else(|| ApiError::not_found(ARTIST_NOT_FOUND))
    }

    pub async fn set_artist_image(&self, id: &str, upload: Upload) -> Result<Artist, ApiError> {
        MediaManager::check_extension(MediaKind::ArtistImage, &upload.file_name)?;
        let artist = self.get_artist(id)?;
        self.media
            .replace(
                MediaKind::ArtistImage,
                &upload,
                Some(&artist.image),
                |name| -> Result<(), ApiError> {
                    if self.store.set_artist_image(id, name)? {
                        Ok(())
                    } else {
                        Err(ApiError::not_found(ARTIST_NOT_FOUND))
                    }
                },
            )
            .await?;
        self.get_artist(id)
    }

    // =========================================================================
    // Albums
    // =========================================================================

    pub fn save_album(&self, album: NewAlbum) -> Result<Album, ApiError> {
        require_text(&album.title, "title")?;
        self.artist_exists(&album.artist_id)?;
        let album = self.store.create_album(&album)?;
        info!("Saved album {} ({})", album.title, album.id);
        Ok(album)
    }

    pub fn get_album(&self, id: &str) -> Result<Album<ArtistSummary>, ApiError> {
        self.store
            .get_album_with_artist(id)?
            .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))
    }

    /// An artist without albums is reported as not found.
    pub fn list_albums(&self, artist_id: &str) -> Result<Vec<Album<ArtistSummary>>, ApiError> {
        let albums = self.store.list_albums_by_artist(artist_id)?;
        if albums.is_empty() {
            return Err(ApiError::not_found("No albums found for this artist"));
        }
        Ok(albums)
    }

    pub fn update_album(&self, id: &str, update: AlbumUpdate) -> Result<Album, ApiError> {
        if let Some(title) = &update.title {
            require_text(title, "title")?;
        }
        if let Some(artist_id) = &update.artist_id {
            self.artist_exists(artist_id)?;
        }
        self.store
            .update_album(id, &update)?
            .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))
    }

    pub async fn set_album_image(&self, id: &str, upload: Upload) -> Result<Album, ApiError> {
        MediaManager::check_extension(MediaKind::AlbumCover, &upload.file_name)?;
        let album = self
            .store
            .get_album(id)?
            .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))?;
        self.media
            .replace(
                MediaKind::AlbumCover,
                &upload,
                Some(&album.image),
                |name| -> Result<(), ApiError> {
                    if self.store.set_album_image(id, name)? {
                        Ok(())
                    } else {
                        Err(ApiError::not_found(ALBUM_NOT_FOUND))
                    }
                },
            )
            .await?;
        self.store
            .get_album(id)?
            .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))
    }

    // =========================================================================
    // Songs
    // =========================================================================

    pub fn save_song(&self, song: NewSong) -> Result<Song, ApiError> {
        require_text(&song.name, "name")?;
        self.album_exists(&song.album_id)?;
        let song = self.store.create_song(&song)?;
        info!("Saved song {} ({})", song.name, song.id);
        Ok(song)
    }

    pub fn get_song(&self, id: &str) -> Result<Song<Album>, ApiError> {
        self.store
            .get_song_with_album(id)?
            .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))
    }

    /// An album without songs is reported as not found.
    pub fn list_songs(&self, album_id: &str) -> Result<Vec<Song<Album<ArtistSummary>>>, ApiError> {
        let songs = self.store.list_songs_by_album(album_id)?;
        if songs.is_empty() {
            return Err(ApiError::not_found("No songs found for this album"));
        }
        Ok(songs)
    }

    pub fn update_song(&self, id: &str, update: SongUpdate) -> Result<Song, ApiError> {
        if let Some(name) = &update.name {
            require_text(name, "name")?;
        }
        if let Some(album_id) = &update.album_id {
            self.album_exists(album_id)?;
        }
        self.store
            .update_song(id, &update)?
            .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))
    }

    pub async fn set_song_file(&self, id: &str, upload: Upload) -> Result<Song, ApiError> {
        MediaManager::check_extension(MediaKind::Audio, &upload.file_name)?;
        let song = self
            .store
            .get_song(id)?
            .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))?;
        self.media
            .replace(
                MediaKind::Audio,
                &upload,
                Some(&song.file),
                |name| -> Result<(), ApiError> {
                    if self.store.set_song_file(id, name)? {
                        Ok(())
                    } else {
                        Err(ApiError::not_found(SONG_NOT_FOUND))
                    }
                },
            )
            .await?;
        self.store
            .get_song(id)?
            .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))
    }
}
