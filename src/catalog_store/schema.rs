//! SQLite schema of the catalog database.
//!
//! Parent/child links use `ON DELETE NO ACTION`: children must be removed
//! before their parent, which is what the cascade deleter does.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::NoAction,
};

pub const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true),
        sqlite_column!("nick", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true), // lowercased
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!(
            "role",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'user'")
        ),
        sqlite_column!("image", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["email"], &["nick"]],
};

pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "owner_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!(
            "image",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'default.png'")
        ),
        sqlite_column!(
            "like_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_artists_name", "name")],
    unique_constraints: &[],
};

pub const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "image",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'default.png'")
        ),
        sqlite_column!(
            "like_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_albums_artist", "artist_id")],
    unique_constraints: &[],
};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ALBUM_FK)
        ),
        sqlite_column!("track", &SqlType::Integer, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Text),
        sqlite_column!(
            "file",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'default.mp3'")
        ),
        sqlite_column!(
            "like_count",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_songs_album", "album_id")],
    unique_constraints: &[],
};

/// Polymorphic like join table. `target_kind` is one of song, album, artist.
pub const LIKES_TABLE: Table = Table {
    name: "likes",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("target_kind", &SqlType::Text, non_null = true),
        sqlite_column!("target_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "like_publication",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_likes_target", "target_id")],
    unique_constraints: &[&["user_id", "target_kind", "target_id"]],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USERS_TABLE,
        ARTISTS_TABLE,
        ALBUMS_TABLE,
        SONGS_TABLE,
        LIKES_TABLE,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn fresh_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        conn
    }

    #[test]
    fn schema_creates_and_validates() {
        let conn = fresh_db();
        CATALOG_VERSIONED_SCHEMAS[0].validate(&conn).unwrap();
    }

    #[test]
    fn defaults_are_applied() {
        let conn = fresh_db();
        conn.execute(
            "INSERT INTO users (id, username, nick, email, password_hash) VALUES ('u1', 'bob', 'bobby', 'b@x.io', 'h')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO artists (id, owner_id, name, description) VALUES ('a1', 'u1', 'n', 'd')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO albums (id, artist_id, title, year) VALUES ('al1', 'a1', 't', 2001)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO songs (id, album_id, track, name) VALUES ('s1', 'al1', 1, 'n')",
            [],
        )
        .unwrap();

        let role: String = conn
            .query_row("SELECT role FROM users WHERE id = 'u1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(role, "user");

        let (image, likes): (String, i64) = conn
            .query_row(
                "SELECT image, like_count FROM artists WHERE id = 'a1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(image, "default.png");
        assert_eq!(likes, 0);

        let file: String = conn
            .query_row("SELECT file FROM songs WHERE id = 's1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(file, "default.mp3");
    }

    #[test]
    fn album_requires_existing_artist() {
        let conn = fresh_db();
        let result = conn.execute(
            "INSERT INTO albums (id, artist_id, title, year) VALUES ('al1', 'missing', 't', 2001)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_like_is_rejected() {
        let conn = fresh_db();
        conn.execute(
            "INSERT INTO users (id, username, nick, email, password_hash) VALUES ('u1', 'bob', 'bobby', 'b@x.io', 'h')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO likes (id, user_id, target_kind, target_id) VALUES ('l1', 'u1', 'song', 's1')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO likes (id, user_id, target_kind, target_id) VALUES ('l2', 'u1', 'song', 's1')",
            [],
        );
        assert!(result.is_err());
    }
}
