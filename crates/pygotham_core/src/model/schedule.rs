//! Schedule graph: talk durations, event days, rooms, slots and the
//! presentations that place a talk in a slot.
//!
//! # Invariants
//! - A slot never ends before it starts.
//! - A loaded `Slot` carries its `Day` and its rooms ordered by `order`.
//! - A talk has at most one presentation.

use crate::api::path::{Attr, Resolve};
use crate::model::{require_text, ModelValidationError, RecordId, UNSAVED_ID};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Talk length option offered to speakers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub id: RecordId,
    /// Display label, e.g. `30 minutes`.
    pub name: String,
    /// Length in minutes.
    pub duration: i64,
}

impl Duration {
    pub fn new(name: impl Into<String>, minutes: i64) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            duration: minutes,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("duration.name", &self.name)?;
        if self.duration <= 0 {
            return Err(ModelValidationError::OutOfRange {
                field: "duration.duration",
                value: self.duration,
            });
        }
        Ok(())
    }
}

impl Resolve for Duration {
    fn entity_name(&self) -> &'static str {
        "duration"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "name" => Attr::Str(&self.name),
            "duration" => Attr::Int(self.duration),
            _ => return None,
        };
        Some(value)
    }
}

/// Calendar day of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub id: RecordId,
    pub event_id: RecordId,
    pub date: NaiveDate,
}

impl Day {
    pub fn new(event_id: RecordId, date: NaiveDate) -> Self {
        Self {
            id: UNSAVED_ID,
            event_id,
            date,
        }
    }
}

impl Resolve for Day {
    fn entity_name(&self) -> &'static str {
        "day"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "event_id" => Attr::Int(self.event_id),
            "date" => Attr::Date(self.date),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RecordId,
    pub name: String,
    /// Display position; lower sorts first.
    pub order: i64,
}

impl Room {
    pub fn new(name: impl Into<String>, order: i64) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            order,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("room.name", &self.name)
    }
}

impl Resolve for Room {
    fn entity_name(&self) -> &'static str {
        "room"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "name" => Attr::Str(&self.name),
            "order" => Attr::Int(self.order),
            _ => return None,
        };
        Some(value)
    }
}

/// Time window on one day, held in one or more rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: RecordId,
    pub day: Day,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub rooms: Vec<Room>,
}

impl Slot {
    pub fn new(day: Day, start: NaiveTime, end: NaiveTime, rooms: Vec<Room>) -> Self {
        Self {
            id: UNSAVED_ID,
            day,
            start,
            end,
            rooms,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_slot_window(self.start, self.end)
    }
}

/// Rejects slot windows that end before they start.
pub fn validate_slot_window(start: NaiveTime, end: NaiveTime) -> Result<(), ModelValidationError> {
    if end < start {
        return Err(ModelValidationError::InvalidTimeRange {
            field: "slot",
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

impl Resolve for Slot {
    fn entity_name(&self) -> &'static str {
        "slot"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "day" => Attr::Node(&self.day),
            "start" => Attr::Time(self.start),
            "end" => Attr::Time(self.end),
            "rooms" => Attr::list(&self.rooms),
            _ => return None,
        };
        Some(value)
    }
}

/// Placement of one talk into one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: RecordId,
    pub slot: Slot,
}

impl Resolve for Presentation {
    fn entity_name(&self) -> &'static str {
        "presentation"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "slot" => Attr::Node(&self.slot),
            _ => return None,
        };
        Some(value)
    }
}
