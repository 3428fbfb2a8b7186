//! Deleting a parent deletes its children, their media and the likes
//! pointing at any of them.
//!
//! Nothing here is transactional. If the store fails halfway the error is
//! returned and whatever was already deleted stays deleted.

use super::{CatalogManager, ALBUM_NOT_FOUND, ARTIST_NOT_FOUND, SONG_NOT_FOUND};
use crate::catalog_store::{Album, Artist, LikeKind, LikeTarget, Song};
use crate::error::ApiError;
use crate::media::MediaKind;
use anyhow::anyhow;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistDeletion {
    pub artist: Artist,
    pub albums_deleted: usize,
    pub songs_deleted: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumDeletion {
    pub album: Album,
    pub songs_deleted: usize,
}

impl CatalogManager {
    fn drop_likes(&self, kind: LikeKind, id: &str) -> Result<(), ApiError> {
        let removed = self
            .store
            .delete_likes_for_target(&LikeTarget::new(kind, id))?;
        if removed > 0 {
            debug!("Removed {} likes of {} {}", removed, kind, id);
        }
        Ok(())
    }

    /// Audio file first, then the record.
    async fn purge_song(&self, song: &Song) -> Result<(), ApiError> {
        self.media.remove(MediaKind::Audio, &song.file).await;
        self.drop_likes(LikeKind::Song, &song.id)?;
        if !self.store.delete_song(&song.id)? {
            return Err(anyhow!("Song {} vanished during deletion", song.id).into());
        }
        Ok(())
    }

    /// Songs, then the cover, then the album record. Returns the number of songs removed.
    async fn purge_album(&self, album: &Album) -> Result<usize, ApiError> {
        let songs = self.store.get_album_songs(&album.id)?;
        for song in &songs {
            self.purge_song(song).await?;
        }
        self.media.remove(MediaKind::AlbumCover, &album.image).await;
        self.drop_likes(LikeKind::Album, &album.id)?;
        if !self.store.delete_album(&album.id)? {
            return Err(anyhow!("Album {} vanished during deletion", album.id).into());
        }
        Ok(songs.len())
    }

    pub async fn delete_artist(&self, artist_id: &str) -> Result<ArtistDeletion, ApiError> {
        let artist = self
            .store
            .get_artist(artist_id)?
            .ok_or_else(|| ApiError::not_found(ARTIST_NOT_FOUND))?;

        let albums = self.store.get_artist_albums(artist_id)?;
        let mut songs_deleted = 0;
        for album in &albums {
            songs_deleted += self.purge_album(album).await?;
        }

        self.media.remove(MediaKind::ArtistImage, &artist.image).await;
        self.drop_likes(LikeKind::Artist, artist_id)?;
        if !self.store.delete_artist(artist_id)? {
            return Err(anyhow!("Artist {} vanished during deletion", artist_id).into());
        }

        info!(
            "Deleted artist {} with {} albums and {} songs",
            artist_id,
            albums.len(),
            songs_deleted
        );
        Ok(ArtistDeletion {
            artist,
            albums_deleted: albums.len(),
            songs_deleted,
        })
    }

    pub async fn delete_album(&self, album_id: &str) -> Result<AlbumDeletion, ApiError> {
        let album = self
            .store
            .get_album(album_id)?
            .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))?;
        let songs_deleted = self.purge_album(&album).await?;
        info!("Deleted album {} with {} songs", album_id, songs_deleted);
        Ok(AlbumDeletion {
            album,
            songs_deleted,
        })
    }

    /// The record goes first, the audio file after it.
    pub async fn delete_song(&self, song_id: &str) -> Result<Song, ApiError> {
        let song = self
            .store
            .get_song(song_id)?
            .ok_or_else(|| ApiError::not_found(SONG_NOT_FOUND))?;
        self.drop_likes(LikeKind::Song, song_id)?;
        if !self.store.delete_song(song_id)? {
            return Err(ApiError::not_found(SONG_NOT_FOUND));
        }
        self.media.remove(MediaKind::Audio, &song.file).await;
        info!("Deleted song {}", song_id);
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fixture, upload};
    use super::*;
    use crate::catalog_store::CatalogStore;

    fn files_in(f: &super::super::tests::Fixture, kind: MediaKind) -> usize {
        std::fs::read_dir(f.media.dir(kind)).unwrap().count()
    }

    #[tokio::test]
    async fn deleting_artist_removes_albums_songs_and_media() {
        let f = fixture();
        let artist = f.artist("Band");
        f.manager
            .set_artist_image(&artist.id, upload("band.png"))
            .await
            .unwrap();

        for a in 0..2 {
            let album = f.album(&artist.id, &format!("Album {}", a));
            f.manager
                .set_album_image(&album.id, upload("cover.jpg"))
                .await
                .unwrap();
            for t in 1..=3 {
                let song = f.song(&album.id, t);
                f.manager
                    .set_song_file(&song.id, upload("track.ogg"))
                    .await
                    .unwrap();
            }
        }
        assert_eq!(files_in(&f, MediaKind::Audio), 6);

        let deletion = f.manager.delete_artist(&artist.id).await.unwrap();
        assert_eq!(deletion.albums_deleted, 2);
        assert_eq!(deletion.songs_deleted, 6);

        assert!(f.store.get_artist(&artist.id).unwrap().is_none());
        assert!(f.store.get_artist_albums(&artist.id).unwrap().is_empty());
        assert_eq!(files_in(&f, MediaKind::Audio), 0);
        assert_eq!(files_in(&f, MediaKind::AlbumCover), 0);
        assert_eq!(files_in(&f, MediaKind::ArtistImage), 0);
    }

    #[tokio::test]
    async fn deleting_artist_without_albums() {
        let f = fixture();
        let artist = f.artist("Solo");
        let deletion = f.manager.delete_artist(&artist.id).await.unwrap();
        assert_eq!(deletion.albums_deleted, 0);
        assert_eq!(deletion.songs_deleted, 0);
        assert!(matches!(
            f.manager.delete_artist(&artist.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_album_drops_its_likes() {
        let f = fixture();
        let artist = f.artist("Band");
        let album = f.album(&artist.id, "Album");
        let song = f.song(&album.id, 1);
        let song_target = LikeTarget::new(LikeKind::Song, &song.id);
        f.store
            .insert_like_if_absent(&f.user_id, &song_target, true)
            .unwrap();

        let deletion = f.manager.delete_album(&album.id).await.unwrap();
        assert_eq!(deletion.songs_deleted, 1);
        assert_eq!(deletion.album.id, album.id);
        assert_eq!(f.store.count_likes(&song_target).unwrap(), 0);
        assert!(f.store.get_song(&song.id).unwrap().is_none());
        // the artist survives
        assert!(f.store.get_artist(&artist.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_song_with_missing_file() {
        let f = fixture();
        let artist = f.artist("Band");
        let album = f.album(&artist.id, "Album");
        let song = f.song(&album.id, 1);
        let song = f
            .manager
            .set_song_file(&song.id, upload("a.mp3"))
            .await
            .unwrap();
        std::fs::remove_file(f.media.dir(MediaKind::Audio).join(&song.file)).unwrap();

        let deleted = f.manager.delete_song(&song.id).await.unwrap();
        assert_eq!(deleted.id, song.id);
        assert!(matches!(
            f.manager.get_song(&song.id),
            Err(ApiError::NotFound(_))
        ));
    }
}
