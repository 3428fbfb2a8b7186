//! SQLite-backed catalog store.
//!
//! A single connection guarded by a mutex serializes every statement.
//! Multi-step operations built on top of the store (cascade deletes, like
//! toggles) are not transactional.

use super::models::*;
use super::schema::{
    ALBUMS_TABLE, ARTISTS_TABLE, CATALOG_VERSIONED_SCHEMAS, LIKES_TABLE, SONGS_TABLE,
};
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

const ARTIST_COLUMNS: &str = "id, owner_id, name, description, image, like_count";
const ALBUM_COLUMNS: &str = "id, artist_id, title, description, year, image, like_count";
const SONG_COLUMNS: &str = "id, album_id, track, name, duration, file, like_count";

fn artist_from_row(row: &Row) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
        likes: row.get(5)?,
    })
}

/// Reads an album starting at column `base`.
fn album_at(row: &Row, base: usize) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(base)?,
        artist: row.get(base + 1)?,
        title: row.get(base + 2)?,
        description: row.get(base + 3)?,
        year: row.get(base + 4)?,
        image: row.get(base + 5)?,
        likes: row.get(base + 6)?,
    })
}

fn song_at(row: &Row, base: usize) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(base)?,
        album: row.get(base + 1)?,
        track: row.get(base + 2)?,
        name: row.get(base + 3)?,
        duration: row.get(base + 4)?,
        file: row.get(base + 5)?,
        likes: row.get(base + 6)?,
    })
}

fn counter_table(kind: LikeKind) -> &'static str {
    match kind {
        LikeKind::Song => SONGS_TABLE.name,
        LikeKind::Album => ALBUMS_TABLE.name,
        LikeKind::Artist => ARTISTS_TABLE.name,
    }
}

/// Runs `UPDATE table SET ... WHERE id = ?` with the given assignments.
/// With no assignments it only reports whether the row exists.
pub(crate) fn apply_update(
    conn: &Connection,
    table: &str,
    id: &str,
    assignments: Vec<(&'static str, Value)>,
) -> Result<bool> {
    if assignments.is_empty() {
        return Ok(conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", table),
                params![id],
                |_| Ok(()),
            )
            .optional()?
            .is_some());
    }

    let set_clause = assignments
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        table,
        set_clause,
        assignments.len() + 1
    );
    let mut values: Vec<Value> = assignments.into_iter().map(|(_, v)| v).collect();
    values.push(Value::Text(id.to_string()));

    let changed = conn
        .execute(&sql, params_from_iter(values))
        .with_context(|| format!("Failed to update {} {}", table, id))?;
    Ok(changed > 0)
}

pub(crate) fn push_text(assignments: &mut Vec<(&'static str, Value)>, column: &'static str, v: &Option<String>) {
    if let Some(v) = v {
        assignments.push((column, Value::Text(v.clone())));
    }
}

fn push_integer(assignments: &mut Vec<(&'static str, Value)>, column: &'static str, v: Option<i64>) {
    if let Some(v) = v {
        assignments.push((column, Value::Integer(v)));
    }
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open catalog database {:?}", db_path))?
        } else {
            info!("Creating catalog database at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create catalog database {:?}", db_path))?;
            CATALOG_VERSIONED_SCHEMAS
                .last()
                .context("No catalog schema defined")?
                .create(&conn)?;
            conn
        };

        let version = Self::read_schema_version(&conn)?;
        CATALOG_VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;
        Self::migrate_if_needed(&conn, version)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = SqliteCatalogStore {
            conn: Arc::new(Mutex::new(conn)),
        };
        info!(
            "Opened catalog: {} artists, {} albums, {} songs",
            store.count_rows(ARTISTS_TABLE.name)?,
            store.count_rows(ALBUMS_TABLE.name)?,
            store.count_rows(SONGS_TABLE.name)?
        );
        Ok(store)
    }

    fn read_schema_version(conn: &Connection) -> Result<usize> {
        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        if db_version >= CATALOG_VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        }
        Ok(db_version as usize)
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        if latest_from != version {
            conn.execute(
                &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
                [],
            )?;
        }
        Ok(())
    }

    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Catalog database mutex poisoned"))
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl CatalogStore for SqliteCatalogStore {
    // =========================================================================
    // Artists
    // =========================================================================

    fn create_artist(&self, artist: &NewArtist) -> Result<Artist> {
        let id = new_entity_id();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO artists (id, owner_id, name, description) VALUES (?1, ?2, ?3, ?4)",
            params![id, artist.owner_id, artist.name, artist.description],
        )
        .with_context(|| format!("Failed to create artist {}", artist.name))?;
        debug!("Created artist {} ({})", artist.name, id);

        Ok(Artist {
            id,
            owner_id: artist.owner_id.clone(),
            name: artist.name.clone(),
            description: artist.description.clone(),
            image: DEFAULT_IMAGE.to_string(),
            likes: 0,
        })
    }

    fn get_artist(&self, id: &str) -> Result<Option<Artist>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS),
                params![id],
                artist_from_row,
            )
            .optional()?)
    }

    fn list_artists(&self, offset: usize, limit: usize) -> Result<Vec<Artist>> {
        let limit = i64::try_from(limit).context("Artist page size out of range")?;
        let offset = i64::try_from(offset).context("Artist page offset out of range")?;
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM artists ORDER BY name, id LIMIT ?1 OFFSET ?2",
            ARTIST_COLUMNS
        ))?;
        let artists = stmt
            .query_map(params![limit, offset], artist_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artists)
    }

    fn count_artists(&self) -> Result<usize> {
        self.count_rows(ARTISTS_TABLE.name)
    }

    fn update_artist(&self, id: &str, update: &ArtistUpdate) -> Result<Option<Artist>> {
        let mut assignments = Vec::new();
        push_text(&mut assignments, "name", &update.name);
        push_text(&mut assignments, "description", &update.description);

        let found = apply_update(&*self.connection()?, ARTISTS_TABLE.name, id, assignments)?;
        if !found {
            return Ok(None);
        }
        self.get_artist(id)
    }

    fn set_artist_image(&self, id: &str, image: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE artists SET image = ?1 WHERE id = ?2",
            params![image, id],
        )?;
        Ok(changed > 0)
    }

    fn delete_artist(&self, id: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn
            .execute("DELETE FROM artists WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete artist {}", id))?;
        Ok(changed > 0)
    }

    // =========================================================================
    // Albums
    // =========================================================================

    fn create_album(&self, album: &NewAlbum) -> Result<Album> {
        let id = new_entity_id();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO albums (id, artist_id, title, description, year) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, album.artist_id, album.title, album.description, album.year],
        )
        .with_context(|| format!("Failed to create album {}", album.title))?;
        debug!("Created album {} ({})", album.title, id);

        Ok(Album {
            id,
            artist: album.artist_id.clone(),
            title: album.title.clone(),
            description: album.description.clone(),
            year: album.year,
            image: DEFAULT_IMAGE.to_string(),
            likes: 0,
        })
    }

    fn get_album(&self, id: &str) -> Result<Option<Album>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM albums WHERE id = ?1", ALBUM_COLUMNS),
                params![id],
                |row| album_at(row, 0),
            )
            .optional()?)
    }

    fn get_album_with_artist(&self, id: &str) -> Result<Option<Album<ArtistSummary>>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                "SELECT al.id, al.artist_id, al.title, al.description, al.year, al.image, al.like_count,
                        ar.name, ar.description
                 FROM albums al JOIN artists ar ON ar.id = al.artist_id
                 WHERE al.id = ?1",
                params![id],
                |row| {
                    let artist = ArtistSummary {
                        id: None,
                        name: row.get(7)?,
                        description: row.get(8)?,
                    };
                    Ok(album_at(row, 0)?.with_artist(artist))
                },
            )
            .optional()?)
    }

    fn list_albums_by_artist(&self, artist_id: &str) -> Result<Vec<Album<ArtistSummary>>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT al.id, al.artist_id, al.title, al.description, al.year, al.image, al.like_count,
                    ar.name, ar.description
             FROM albums al JOIN artists ar ON ar.id = al.artist_id
             WHERE al.artist_id = ?1
             ORDER BY al.year, al.title",
        )?;
        let albums = stmt
            .query_map(params![artist_id], |row| {
                let album = album_at(row, 0)?;
                let artist = ArtistSummary {
                    id: Some(album.artist.clone()),
                    name: row.get(7)?,
                    description: row.get(8)?,
                };
                Ok(album.with_artist(artist))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    fn get_artist_albums(&self, artist_id: &str) -> Result<Vec<Album>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM albums WHERE artist_id = ?1",
            ALBUM_COLUMNS
        ))?;
        let albums = stmt
            .query_map(params![artist_id], |row| album_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    fn update_album(&self, id: &str, update: &AlbumUpdate) -> Result<Option<Album>> {
        let mut assignments = Vec::new();
        push_text(&mut assignments, "artist_id", &update.artist_id);
        push_text(&mut assignments, "title", &update.title);
        push_text(&mut assignments, "description", &update.description);
        push_integer(&mut assignments, "year", update.year);

        let found = apply_update(&*self.connection()?, ALBUMS_TABLE.name, id, assignments)?;
        if !found {
            return Ok(None);
        }
        self.get_album(id)
    }

    fn set_album_image(&self, id: &str, image: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE albums SET image = ?1 WHERE id = ?2",
            params![image, id],
        )?;
        Ok(changed > 0)
    }

    fn delete_album(&self, id: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn
            .execute("DELETE FROM albums WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete album {}", id))?;
        Ok(changed > 0)
    }

    // =========================================================================
    // Songs
    // =========================================================================

    fn create_song(&self, song: &NewSong) -> Result<Song> {
        let id = new_entity_id();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO songs (id, album_id, track, name, duration) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, song.album_id, song.track, song.name, song.duration],
        )
        .with_context(|| format!("Failed to create song {}", song.name))?;
        debug!("Created song {} ({})", song.name, id);

        Ok(Song {
            id,
            album: song.album_id.clone(),
            track: song.track,
            name: song.name.clone(),
            duration: song.duration.clone(),
            file: DEFAULT_AUDIO_FILE.to_string(),
            likes: 0,
        })
    }

    fn get_song(&self, id: &str) -> Result<Option<Song>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS),
                params![id],
                |row| song_at(row, 0),
            )
            .optional()?)
    }

    fn get_song_with_album(&self, id: &str) -> Result<Option<Song<Album>>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                "SELECT s.id, s.album_id, s.track, s.name, s.duration, s.file, s.like_count,
                        al.id, al.artist_id, al.title, al.description, al.year, al.image, al.like_count
                 FROM songs s JOIN albums al ON al.id = s.album_id
                 WHERE s.id = ?1",
                params![id],
                |row| Ok(song_at(row, 0)?.with_album(album_at(row, 7)?)),
            )
            .optional()?)
    }

    fn list_songs_by_album(&self, album_id: &str) -> Result<Vec<Song<Album<ArtistSummary>>>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.album_id, s.track, s.name, s.duration, s.file, s.like_count,
                    al.id, al.artist_id, al.title, al.description, al.year, al.image, al.like_count,
                    ar.name, ar.description
             FROM songs s
             JOIN albums al ON al.id = s.album_id
             JOIN artists ar ON ar.id = al.artist_id
             WHERE s.album_id = ?1
             ORDER BY s.track ASC",
        )?;
        let songs = stmt
            .query_map(params![album_id], |row| {
                let album = album_at(row, 7)?;
                let artist = ArtistSummary {
                    id: Some(album.artist.clone()),
                    name: row.get(14)?,
                    description: row.get(15)?,
                };
                Ok(song_at(row, 0)?.with_album(album.with_artist(artist)))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn get_album_songs(&self, album_id: &str) -> Result<Vec<Song>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM songs WHERE album_id = ?1 ORDER BY track",
            SONG_COLUMNS
        ))?;
        let songs = stmt
            .query_map(params![album_id], |row| song_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn update_song(&self, id: &str, update: &SongUpdate) -> Result<Option<Song>> {
        let mut assignments = Vec::new();
        push_text(&mut assignments, "album_id", &update.album_id);
        push_integer(&mut assignments, "track", update.track);
        push_text(&mut assignments, "name", &update.name);
        push_text(&mut assignments, "duration", &update.duration);

        let found = apply_update(&*self.connection()?, SONGS_TABLE.name, id, assignments)?;
        if !found {
            return Ok(None);
        }
        self.get_song(id)
    }

    fn set_song_file(&self, id: &str, file: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE songs SET file = ?1 WHERE id = ?2",
            params![file, id],
        )?;
        Ok(changed > 0)
    }

    fn delete_song(&self, id: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete song {}", id))?;
        Ok(changed > 0)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    fn find_like(&self, user_id: &str, target: &LikeTarget) -> Result<Option<Like>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                "SELECT id, like_publication FROM likes
                 WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
                params![user_id, target.kind.as_str(), target.id],
                |row| {
                    Ok(Like {
                        id: row.get(0)?,
                        user_id: user_id.to_string(),
                        target: target.clone(),
                        like_publication: row.get::<_, i64>(1)? != 0,
                    })
                },
            )
            .optional()?)
    }

    fn insert_like_if_absent(
        &self,
        user_id: &str,
        target: &LikeTarget,
        like_publication: bool,
    ) -> Result<bool> {
        let conn = self.connection()?;
        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO {} (id, user_id, target_kind, target_id, like_publication)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    LIKES_TABLE.name
                ),
                params![
                    new_entity_id(),
                    user_id,
                    target.kind.as_str(),
                    target.id,
                    like_publication as i64
                ],
            )
            .context("Failed to record like")?;
        Ok(inserted > 0)
    }

    fn count_likes(&self, target: &LikeTarget) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE target_kind = ?1 AND target_id = ?2",
            params![target.kind.as_str(), target.id],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    fn delete_likes_for_target(&self, target: &LikeTarget) -> Result<usize> {
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM likes WHERE target_kind = ?1 AND target_id = ?2",
            params![target.kind.as_str(), target.id],
        )?;
        Ok(deleted)
    }

    fn adjust_like_counter(&self, target: &LikeTarget, delta: i64) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET like_count = MAX(like_count + ?1, 0) WHERE id = ?2",
                counter_table(target.kind)
            ),
            params![delta, target.id],
        )?;
        Ok(changed > 0)
    }

    fn get_liked_entity(&self, target: &LikeTarget) -> Result<Option<LikedEntity>> {
        Ok(match target.kind {
            LikeKind::Song => self.get_song(&target.id)?.map(LikedEntity::Song),
            LikeKind::Album => self.get_album(&target.id)?.map(LikedEntity::Album),
            LikeKind::Artist => self.get_artist(&target.id)?.map(LikedEntity::Artist),
        })
    }
}
