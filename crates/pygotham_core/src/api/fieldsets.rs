//! Field sets rendered by the public API.
//!
//! # Invariants
//! - User email and picture are never emitted from stored values.
//! - Sets are built once per process and never mutated afterwards.

use crate::api::fields::{FieldError, FieldSet};
use crate::api::path::{format_iso_date, resolve, Attr, AttrPath};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// Placeholder emitted instead of a user's email address.
pub const REDACTED_EMAIL: &str = "<redacted>";
const ROOM_SEPARATOR: &str = " & ";

pub static EVENT_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new("event")
        .integer("id")
        .datetime("begins")
        .datetime("ends")
        .string("name")
        .string("registration_url")
        .string("slug")
});

pub static USER_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new("user")
        .integer("id")
        .string("bio")
        .constant("email", json!(REDACTED_EMAIL))
        .string("name")
        .constant("picture_url", Value::Null)
        .path("twitter_id", "twitter_handle")
});

pub static TALK_FIELDS: Lazy<FieldSet> = Lazy::new(|| {
    FieldSet::new("talk")
        .integer("id")
        // `conf_key` mirrors `id` for consumers that key talks by it.
        .path("conf_key", "id")
        .string("description")
        .path("duration", "duration.duration")
        .constant("language", json!("English"))
        .path("summary", "description")
        .path_with("room", "presentation.slot.rooms", join_room_names)
        .path_with("room_alias", "presentation.slot.rooms", join_room_names)
        .path_with("start", "presentation.slot", format_slot_start)
        .path_with("priority", "recording_release", recording_priority)
        .path("released", "recording_release")
        .constant("license", json!("Creative Commons"))
        .constant("tags", json!([]))
        .path("title", "name")
        .nested("user", &USER_FIELDS)
});

static ROOM_NAME_PATH: Lazy<AttrPath> = Lazy::new(|| AttrPath::new("name"));
static SLOT_DATE_PATH: Lazy<AttrPath> = Lazy::new(|| AttrPath::new("day.date"));
static SLOT_START_PATH: Lazy<AttrPath> = Lazy::new(|| AttrPath::new("start"));

/// Maps the recording-release tri-state to a video priority.
///
/// Released `9`, withheld `0`, unknown `5`.
pub fn recording_priority(value: Attr<'_>) -> Result<Value, FieldError> {
    match value {
        Attr::Bool(true) => Ok(json!(9)),
        Attr::Bool(false) => Ok(json!(0)),
        Attr::Null => Ok(json!(5)),
        other => Err(FieldError::TypeMismatch {
            key: "priority".to_string(),
            expected: "bool",
            found: other.kind(),
        }),
    }
}

/// Joins the names of a slot's rooms with `" & "`.
pub fn join_room_names(value: Attr<'_>) -> Result<Value, FieldError> {
    let rooms = match value {
        Attr::Null => return Ok(Value::Null),
        Attr::List(rooms) => rooms,
        other => {
            return Err(FieldError::TypeMismatch {
                key: "room".to_string(),
                expected: "list",
                found: other.kind(),
            })
        }
    };

    let mut names = Vec::with_capacity(rooms.len());
    for room in rooms {
        match resolve(&ROOM_NAME_PATH, room)? {
            Attr::Str(name) => names.push(name),
            other => {
                return Err(FieldError::TypeMismatch {
                    key: "room".to_string(),
                    expected: "string",
                    found: other.kind(),
                })
            }
        }
    }

    Ok(Value::String(names.join(ROOM_SEPARATOR)))
}

/// Formats a slot's day date and start time as `YYYY-MM-DDTHH:MM:SS`.
pub fn format_slot_start(value: Attr<'_>) -> Result<Value, FieldError> {
    let slot = match value {
        Attr::Null => return Ok(Value::Null),
        Attr::Node(slot) => slot,
        other => {
            return Err(FieldError::TypeMismatch {
                key: "start".to_string(),
                expected: "object",
                found: other.kind(),
            })
        }
    };

    let date = resolve(&SLOT_DATE_PATH, slot)?;
    let start = resolve(&SLOT_START_PATH, slot)?;
    match (date, start) {
        (Attr::Date(date), Attr::Time(start)) => Ok(Value::String(format!(
            "{}T{}",
            format_iso_date(date),
            start.format("%H:%M:%S")
        ))),
        (Attr::Null, _) | (_, Attr::Null) => Ok(Value::Null),
        (date, start) => Err(FieldError::TypeMismatch {
            key: "start".to_string(),
            expected: "date and time",
            found: if matches!(date, Attr::Date(_)) {
                start.kind()
            } else {
                date.kind()
            },
        }),
    }
}
