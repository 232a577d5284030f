//! User repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Emails are unique case-insensitively.

use crate::model::user::User;
use crate::model::RecordId;
use crate::repo::{ensure_tables, map_conflict, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    name,
    bio,
    twitter_handle,
    picture_url
FROM users";

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<RecordId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: RecordId) -> RepoResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<RecordId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (email, name, bio, twitter_handle, picture_url)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.email.as_str(),
                    user.name.as_deref(),
                    user.bio.as_deref(),
                    user.twitter_handle.as_deref(),
                    user.picture_url.as_deref(),
                ],
            )
            .map_err(|err| map_conflict(err, || "user email already registered".to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    email = ?1,
                    name = ?2,
                    bio = ?3,
                    twitter_handle = ?4,
                    picture_url = ?5
                 WHERE id = ?6;",
                params![
                    user.email.as_str(),
                    user.name.as_deref(),
                    user.bio.as_deref(),
                    user.twitter_handle.as_deref(),
                    user.picture_url.as_deref(),
                    user.id,
                ],
            )
            .map_err(|err| map_conflict(err, || "user email already registered".to_string()))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }

        Ok(())
    }

    fn get_user(&self, id: RecordId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"),
                [email.trim()],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

pub(crate) fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        bio: row.get("bio")?,
        twitter_handle: row.get("twitter_handle")?,
        picture_url: row.get("picture_url")?,
    })
}
