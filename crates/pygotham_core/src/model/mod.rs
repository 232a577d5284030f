//! Conference domain model.
//!
//! # Responsibility
//! - Define persisted records: events, about pages, users, talks and the
//!   schedule graph (durations, days, rooms, slots, presentations).
//! - Validate record invariants before persistence.
//!
//! # Invariants
//! - Records are identified by SQLite integer row ids.
//! - A record whose `id` is `UNSAVED_ID` has not been persisted yet.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod about;
pub mod event;
pub mod schedule;
pub mod talk;
pub mod user;

/// Integer identity assigned by storage.
pub type RecordId = i64;

/// Placeholder id carried by records built in memory before insert.
pub const UNSAVED_ID: RecordId = 0;

/// Validation failure for any domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// A required text field is empty or whitespace.
    EmptyField(&'static str),
    /// A time range ends before it begins.
    InvalidTimeRange {
        field: &'static str,
        start: String,
        end: String,
    },
    /// A numeric field is outside its allowed range.
    OutOfRange { field: &'static str, value: i64 },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} cannot be empty"),
            Self::InvalidTimeRange { field, start, end } => {
                write!(f, "{field} end ({end}) must be >= start ({start})")
            }
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
        }
    }
}

impl Error for ModelValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyField(field));
    }
    Ok(())
}
