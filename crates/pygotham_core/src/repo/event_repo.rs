//! Event repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Event slugs are unique; duplicates surface as `RepoError::Conflict`.
//! - Listing order is `begins DESC, id ASC` (newest edition first).

use crate::model::event::Event;
use crate::model::RecordId;
use crate::repo::{ensure_tables, map_conflict, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    slug,
    begins,
    ends,
    registration_url
FROM events";

/// Repository interface for event records.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<RecordId>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn get_event(&self, id: RecordId) -> RepoResult<Option<Event>>;
    fn get_event_by_slug(&self, slug: &str) -> RepoResult<Option<Event>>;
    fn list_events(&self) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["events"])?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<RecordId> {
        event.validate()?;

        self.conn
            .execute(
                "INSERT INTO events (name, slug, begins, ends, registration_url)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    event.name.as_str(),
                    event.slug.as_str(),
                    event.begins,
                    event.ends,
                    event.registration_url.as_deref(),
                ],
            )
            .map_err(|err| map_conflict(err, || format!("event slug `{}` already exists", event.slug)))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE events
                 SET
                    name = ?1,
                    slug = ?2,
                    begins = ?3,
                    ends = ?4,
                    registration_url = ?5
                 WHERE id = ?6;",
                params![
                    event.name.as_str(),
                    event.slug.as_str(),
                    event.begins,
                    event.ends,
                    event.registration_url.as_deref(),
                    event.id,
                ],
            )
            .map_err(|err| map_conflict(err, || format!("event slug `{}` already exists", event.slug)))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "event",
                id: event.id,
            });
        }

        Ok(())
    }

    fn get_event(&self, id: RecordId) -> RepoResult<Option<Event>> {
        let event = self
            .conn
            .query_row(
                &format!("{EVENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_event_row,
            )
            .optional()?;
        Ok(event)
    }

    fn get_event_by_slug(&self, slug: &str) -> RepoResult<Option<Event>> {
        let event = self
            .conn
            .query_row(
                &format!("{EVENT_SELECT_SQL} WHERE slug = ?1;"),
                [slug],
                parse_event_row,
            )
            .optional()?;
        Ok(event)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY begins DESC, id ASC;"))?;
        let events = stmt
            .query_map([], parse_event_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        begins: row.get("begins")?,
        ends: row.get("ends")?,
        registration_url: row.get("registration_url")?,
    })
}
