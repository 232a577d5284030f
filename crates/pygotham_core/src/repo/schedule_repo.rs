//! Schedule repository: durations, days, rooms and slots.
//!
//! # Responsibility
//! - Persist the schedule graph talks are placed into.
//! - Load slots together with their day and ordered rooms.
//!
//! # Invariants
//! - A slot and its room links are written in one transaction.
//! - Loaded slot rooms are ordered by `order ASC, name ASC`.

use crate::model::schedule::{validate_slot_window, Day, Duration, Room, Slot};
use crate::model::RecordId;
use crate::repo::{ensure_tables, map_conflict, RepoError, RepoResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub trait ScheduleRepository {
    fn create_duration(&self, duration: &Duration) -> RepoResult<RecordId>;
    fn list_durations(&self) -> RepoResult<Vec<Duration>>;
    fn create_day(&self, day: &Day) -> RepoResult<RecordId>;
    fn list_days(&self, event_id: RecordId) -> RepoResult<Vec<Day>>;
    fn create_room(&self, room: &Room) -> RepoResult<RecordId>;
    /// Creates a slot on `day_id` held in every room of `room_ids`.
    fn create_slot(
        &self,
        day_id: RecordId,
        start: NaiveTime,
        end: NaiveTime,
        room_ids: &[RecordId],
    ) -> RepoResult<RecordId>;
    fn get_slot(&self, id: RecordId) -> RepoResult<Option<Slot>>;
}

pub struct SqliteScheduleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteScheduleRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["durations", "days", "rooms", "slots", "rooms_slots"])?;
        Ok(Self { conn })
    }
}

impl ScheduleRepository for SqliteScheduleRepository<'_> {
    fn create_duration(&self, duration: &Duration) -> RepoResult<RecordId> {
        duration.validate()?;
        self.conn
            .execute(
                "INSERT INTO durations (name, duration) VALUES (?1, ?2);",
                params![duration.name.as_str(), duration.duration],
            )
            .map_err(|err| {
                map_conflict(err, || format!("duration `{}` already exists", duration.name))
            })?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_durations(&self) -> RepoResult<Vec<Duration>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, duration
             FROM durations
             ORDER BY duration ASC, id ASC;",
        )?;
        let durations = stmt
            .query_map([], parse_duration_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(durations)
    }

    fn create_day(&self, day: &Day) -> RepoResult<RecordId> {
        self.conn
            .execute(
                "INSERT INTO days (event_id, date) VALUES (?1, ?2);",
                params![day.event_id, day.date],
            )
            .map_err(|err| {
                map_conflict(err, || {
                    format!("day {} already exists for event {}", day.date, day.event_id)
                })
            })?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_days(&self, event_id: RecordId) -> RepoResult<Vec<Day>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, date
             FROM days
             WHERE event_id = ?1
             ORDER BY date ASC;",
        )?;
        let days = stmt
            .query_map([event_id], parse_day_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    fn create_room(&self, room: &Room) -> RepoResult<RecordId> {
        room.validate()?;
        self.conn
            .execute(
                "INSERT INTO rooms (name, \"order\") VALUES (?1, ?2);",
                params![room.name.as_str(), room.order],
            )
            .map_err(|err| map_conflict(err, || format!("room `{}` already exists", room.name)))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn create_slot(
        &self,
        day_id: RecordId,
        start: NaiveTime,
        end: NaiveTime,
        room_ids: &[RecordId],
    ) -> RepoResult<RecordId> {
        validate_slot_window(start, end)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO slots (day_id, start, \"end\") VALUES (?1, ?2, ?3);",
            params![day_id, start, end],
        )?;
        let slot_id = tx.last_insert_rowid();
        for room_id in room_ids {
            tx.execute(
                "INSERT OR IGNORE INTO rooms_slots (slot_id, room_id) VALUES (?1, ?2);",
                params![slot_id, room_id],
            )?;
        }
        tx.commit()?;

        Ok(slot_id)
    }

    fn get_slot(&self, id: RecordId) -> RepoResult<Option<Slot>> {
        load_slot(self.conn, id)
    }
}

/// Loads one slot with its day and ordered rooms.
pub(crate) fn load_slot(conn: &Connection, slot_id: RecordId) -> RepoResult<Option<Slot>> {
    let slot = conn
        .query_row(
            "SELECT
                s.id AS id,
                s.start AS start,
                s.\"end\" AS \"end\",
                d.id AS day_id,
                d.event_id AS event_id,
                d.date AS date
             FROM slots s
             INNER JOIN days d ON d.id = s.day_id
             WHERE s.id = ?1;",
            [slot_id],
            |row| {
                Ok(Slot {
                    id: row.get("id")?,
                    day: Day {
                        id: row.get("day_id")?,
                        event_id: row.get("event_id")?,
                        date: row.get("date")?,
                    },
                    start: row.get("start")?,
                    end: row.get("end")?,
                    rooms: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut slot) = slot else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT r.id AS id, r.name AS name, r.\"order\" AS \"order\"
         FROM rooms_slots rs
         INNER JOIN rooms r ON r.id = rs.room_id
         WHERE rs.slot_id = ?1
         ORDER BY r.\"order\" ASC, r.name ASC;",
    )?;
    slot.rooms = stmt
        .query_map([slot_id], parse_room_row)?
        .collect::<Result<Vec<_>, _>>()?;

    if let Err(err) = slot.validate() {
        return Err(RepoError::InvalidData(format!("slot {slot_id}: {err}")));
    }
    Ok(Some(slot))
}

pub(crate) fn load_duration(conn: &Connection, id: RecordId) -> RepoResult<Option<Duration>> {
    let duration = conn
        .query_row(
            "SELECT id, name, duration FROM durations WHERE id = ?1;",
            [id],
            parse_duration_row,
        )
        .optional()?;
    Ok(duration)
}

fn parse_duration_row(row: &Row<'_>) -> rusqlite::Result<Duration> {
    Ok(Duration {
        id: row.get("id")?,
        name: row.get("name")?,
        duration: row.get("duration")?,
    })
}

fn parse_day_row(row: &Row<'_>) -> rusqlite::Result<Day> {
    Ok(Day {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        date: row.get("date")?,
    })
}

fn parse_room_row(row: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get("id")?,
        name: row.get("name")?,
        order: row.get("order")?,
    })
}
