//! Users live in the catalog database: artists and likes reference them.

use super::user_store::{DuplicateUserField, UserStore};
use super::UserRole;
use crate::catalog_store::{
    apply_update, new_entity_id, push_text, NewUser, SqliteCatalogStore, User, UserCredentials,
    UserUpdate,
};
use anyhow::{Context, Result};
use rusqlite::{params, types::Type, ErrorCode, OptionalExtension, Row};
use tracing::debug;

const USER_COLUMNS: &str = "id, username, nick, email, role, image";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    let role = row
        .get::<_, String>(4)?
        .parse::<UserRole>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, err.into()))?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        nick: row.get(2)?,
        email: row.get(3)?,
        role,
        image: row.get(5)?,
    })
}

fn duplicate_field(err: &rusqlite::Error) -> Option<DuplicateUserField> {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            if message.contains("users.email") {
                Some(DuplicateUserField::Email)
            } else if message.contains("users.nick") {
                Some(DuplicateUserField::Nick)
            } else {
                None
            }
        }
        _ => None,
    }
}

impl UserStore for SqliteCatalogStore {
    fn create_user(&self, user: &NewUser) -> Result<User> {
        let id = new_entity_id();
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO users (id, username, nick, email, password_hash) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user.username, user.nick, user.email, user.password_hash],
        )
        .map_err(|err| match duplicate_field(&err) {
            Some(field) => anyhow::Error::new(field),
            None => anyhow::Error::new(err).context(format!("Failed to create user {}", user.nick)),
        })?;
        debug!("Created user {} ({})", user.nick, id);

        Ok(User {
            id,
            username: user.username.clone(),
            nick: user.nick.clone(),
            email: user.email.clone(),
            role: UserRole::User,
            image: None,
        })
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
                params![email.to_lowercase()],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
        let conn = self.connection()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {}, password_hash FROM users WHERE email = ?1",
                    USER_COLUMNS
                ),
                params![email.to_lowercase()],
                |row| {
                    Ok(UserCredentials {
                        user: user_from_row(row)?,
                        password_hash: row.get(6)?,
                    })
                },
            )
            .optional()
            .context("Failed to read user credentials")?)
    }

    fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<Option<User>> {
        let mut assignments = Vec::new();
        push_text(&mut assignments, "username", &update.username);
        push_text(&mut assignments, "nick", &update.nick);
        push_text(
            &mut assignments,
            "email",
            &update.email.as_ref().map(|e| e.to_lowercase()),
        );
        push_text(&mut assignments, "password_hash", &update.password_hash);

        let found = apply_update(&*self.connection()?, "users", user_id, assignments).map_err(
            |err| match err.downcast_ref::<rusqlite::Error>().and_then(duplicate_field) {
                Some(field) => anyhow::Error::new(field),
                None => err,
            },
        )?;
        if !found {
            return Ok(None);
        }
        self.get_user(user_id)
    }

    fn set_user_image(&self, user_id: &str, image: &str) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE users SET image = ?1 WHERE id = ?2",
            params![image, user_id],
        )?;
        Ok(changed > 0)
    }

    fn set_user_role(&self, user_id: &str, role: UserRole) -> Result<bool> {
        let conn = self.connection()?;
        let changed = conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            params![role.as_str(), user_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, SqliteCatalogStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteCatalogStore::new(dir.path().join("catalog.db")).unwrap();
        (dir, store)
    }

    fn new_user(nick: &str, email: &str) -> NewUser {
        NewUser {
            username: "someone".to_string(),
            nick: nick.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn duplicate_of(err: &anyhow::Error) -> Option<DuplicateUserField> {
        err.downcast_ref::<DuplicateUserField>().copied()
    }

    #[test]
    fn creates_and_reads_user() {
        let (_dir, store) = open_store();
        let created = store.create_user(&new_user("ally", "a@x.io")).unwrap();
        assert_eq!(created.role, UserRole::User);

        let read = store.get_user(&created.id).unwrap().unwrap();
        assert_eq!(read, created);

        let by_email = store.get_user_by_email("A@X.IO").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let credentials = store.get_user_credentials("a@x.io").unwrap().unwrap();
        assert_eq!(credentials.password_hash, "hash");
        assert!(store.get_user("missing").unwrap().is_none());
    }

    #[test]
    fn rejects_duplicate_email_and_nick() {
        let (_dir, store) = open_store();
        store.create_user(&new_user("ally", "a@x.io")).unwrap();

        let err = store.create_user(&new_user("other", "a@x.io")).unwrap_err();
        assert_eq!(duplicate_of(&err), Some(DuplicateUserField::Email));

        let err = store.create_user(&new_user("ally", "b@x.io")).unwrap_err();
        assert_eq!(duplicate_of(&err), Some(DuplicateUserField::Nick));

        // nick uniqueness is case sensitive
        store.create_user(&new_user("Ally", "c@x.io")).unwrap();
    }

    #[test]
    fn update_rejects_nick_of_another_user() {
        let (_dir, store) = open_store();
        let first = store.create_user(&new_user("first", "1@x.io")).unwrap();
        store.create_user(&new_user("second", "2@x.io")).unwrap();

        let err = store
            .update_user(
                &first.id,
                &UserUpdate {
                    nick: Some("second".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(duplicate_of(&err), Some(DuplicateUserField::Nick));

        // keeping one's own email is not a conflict
        let updated = store
            .update_user(
                &first.id,
                &UserUpdate {
                    email: Some("1@X.io".to_string()),
                    username: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "1@x.io");
        assert_eq!(updated.username, "renamed");
    }

    #[test]
    fn sets_role_and_image() {
        let (_dir, store) = open_store();
        let user = store.create_user(&new_user("ally", "a@x.io")).unwrap();

        assert!(store.set_user_role(&user.id, UserRole::Admin).unwrap());
        assert!(store.set_user_image(&user.id, "avatar-1.png").unwrap());

        let read = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(read.role, UserRole::Admin);
        assert_eq!(read.image.as_deref(), Some("avatar-1.png"));
        assert!(!store.set_user_role("missing", UserRole::Admin).unwrap());
    }
}
