//! Talk repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist talk proposals and their schedule placement.
//! - Load complete talk graphs (speaker, duration, presentation, slot,
//!   day, rooms) ready for serialization.
//!
//! # Invariants
//! - A talk is placed in at most one slot.
//! - `recording_release` round-trips as a tri-state (`NULL`, `0`, `1`).
//! - Listing order is `id ASC`.

use crate::model::schedule::Presentation;
use crate::model::talk::{NewTalk, Talk, TalkStatus};
use crate::model::RecordId;
use crate::repo::schedule_repo::{load_duration, load_slot};
use crate::repo::user_repo::{parse_user_row, USER_SELECT_SQL};
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, map_conflict, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TALK_SELECT_SQL: &str = "SELECT
    id,
    event_id,
    user_id,
    name,
    description,
    duration_id,
    status,
    recording_release
FROM talks";

/// Query options for listing talks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkListQuery {
    pub event_id: Option<RecordId>,
    pub status: Option<TalkStatus>,
}

pub trait TalkRepository {
    fn create_talk(&self, talk: &NewTalk) -> RepoResult<RecordId>;
    fn get_talk(&self, id: RecordId) -> RepoResult<Option<Talk>>;
    fn list_talks(&self, query: &TalkListQuery) -> RepoResult<Vec<Talk>>;
    fn set_status(&self, id: RecordId, status: TalkStatus) -> RepoResult<()>;
    fn set_recording_release(&self, id: RecordId, release: Option<bool>) -> RepoResult<()>;
    /// Places a talk in a slot and returns the presentation id.
    fn schedule_talk(&self, talk_id: RecordId, slot_id: RecordId) -> RepoResult<RecordId>;
    /// Removes a talk's placement. Unscheduled talks are left untouched.
    fn unschedule_talk(&self, talk_id: RecordId) -> RepoResult<()>;
}

pub struct SqliteTalkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTalkRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &["talks", "users", "durations", "presentations", "slots", "days", "rooms"],
        )?;
        Ok(Self { conn })
    }

    fn ensure_talk_exists(&self, id: RecordId) -> RepoResult<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM talks WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists == 1 {
            Ok(())
        } else {
            Err(RepoError::NotFound { entity: "talk", id })
        }
    }

    fn load_graph(&self, row: TalkRow) -> RepoResult<Talk> {
        let user = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                [row.user_id],
                parse_user_row,
            )
            .optional()?
            .ok_or_else(|| {
                RepoError::InvalidData(format!("talk {} references missing user {}", row.id, row.user_id))
            })?;

        let duration = match row.duration_id {
            Some(duration_id) => load_duration(self.conn, duration_id)?,
            None => None,
        };

        let placement: Option<(RecordId, RecordId)> = self
            .conn
            .query_row(
                "SELECT id, slot_id FROM presentations WHERE talk_id = ?1;",
                [row.id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let presentation = match placement {
            Some((presentation_id, slot_id)) => {
                let slot = load_slot(self.conn, slot_id)?.ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "presentation {presentation_id} references missing slot {slot_id}"
                    ))
                })?;
                Some(Presentation {
                    id: presentation_id,
                    slot,
                })
            }
            None => None,
        };

        Ok(Talk {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            description: row.description,
            status: row.status,
            recording_release: row.recording_release,
            duration,
            presentation,
            user,
        })
    }
}

impl TalkRepository for SqliteTalkRepository<'_> {
    fn create_talk(&self, talk: &NewTalk) -> RepoResult<RecordId> {
        talk.validate()?;

        self.conn.execute(
            "INSERT INTO talks (
                event_id,
                user_id,
                name,
                description,
                duration_id,
                status,
                recording_release
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                talk.event_id,
                talk.user_id,
                talk.name.as_str(),
                talk.description.as_str(),
                talk.duration_id,
                talk_status_to_db(talk.status),
                talk.recording_release.map(bool_to_int),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_talk(&self, id: RecordId) -> RepoResult<Option<Talk>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TALK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        let row = match rows.next()? {
            Some(row) => parse_talk_row(row)?,
            None => return Ok(None),
        };
        Ok(Some(self.load_graph(row)?))
    }

    fn list_talks(&self, query: &TalkListQuery) -> RepoResult<Vec<Talk>> {
        let mut sql = format!("{TALK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(event_id) = query.event_id {
            sql.push_str(" AND event_id = ?");
            bind_values.push(Value::Integer(event_id));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(talk_status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut talk_rows = Vec::new();
        while let Some(row) = rows.next()? {
            talk_rows.push(parse_talk_row(row)?);
        }

        talk_rows
            .into_iter()
            .map(|row| self.load_graph(row))
            .collect()
    }

    fn set_status(&self, id: RecordId, status: TalkStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE talks SET status = ?1 WHERE id = ?2;",
            params![talk_status_to_db(status), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "talk", id });
        }
        Ok(())
    }

    fn set_recording_release(&self, id: RecordId, release: Option<bool>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE talks SET recording_release = ?1 WHERE id = ?2;",
            params![release.map(bool_to_int), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "talk", id });
        }
        Ok(())
    }

    fn schedule_talk(&self, talk_id: RecordId, slot_id: RecordId) -> RepoResult<RecordId> {
        self.ensure_talk_exists(talk_id)?;
        self.conn
            .execute(
                "INSERT INTO presentations (slot_id, talk_id) VALUES (?1, ?2);",
                params![slot_id, talk_id],
            )
            .map_err(|err| map_conflict(err, || format!("talk {talk_id} is already scheduled")))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn unschedule_talk(&self, talk_id: RecordId) -> RepoResult<()> {
        self.ensure_talk_exists(talk_id)?;
        self.conn
            .execute("DELETE FROM presentations WHERE talk_id = ?1;", [talk_id])?;
        Ok(())
    }
}

/// Flat `talks` row before relations are attached.
struct TalkRow {
    id: RecordId,
    event_id: RecordId,
    user_id: RecordId,
    name: String,
    description: String,
    duration_id: Option<RecordId>,
    status: TalkStatus,
    recording_release: Option<bool>,
}

fn parse_talk_row(row: &Row<'_>) -> RepoResult<TalkRow> {
    let status_text: String = row.get("status")?;
    let status = parse_talk_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid talk status `{status_text}` in talks.status"))
    })?;

    let recording_release = match row.get::<_, Option<i64>>("recording_release")? {
        Some(value) => Some(int_to_bool("talks.recording_release", value)?),
        None => None,
    };

    Ok(TalkRow {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        duration_id: row.get("duration_id")?,
        status,
        recording_release,
    })
}

fn talk_status_to_db(status: TalkStatus) -> &'static str {
    match status {
        TalkStatus::Submitted => "submitted",
        TalkStatus::Accepted => "accepted",
        TalkStatus::Rejected => "rejected",
    }
}

fn parse_talk_status(value: &str) -> Option<TalkStatus> {
    match value {
        "submitted" => Some(TalkStatus::Submitted),
        "accepted" => Some(TalkStatus::Accepted),
        "rejected" => Some(TalkStatus::Rejected),
        _ => None,
    }
}
