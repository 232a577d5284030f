//! Talk domain model.
//!
//! # Responsibility
//! - Define the talk write shape (`NewTalk`) and the loaded read graph
//!   (`Talk`) consumed by the API field sets.
//!
//! # Invariants
//! - Every talk belongs to one event and one speaker.
//! - `recording_release` is a tri-state: `Some(true)` released,
//!   `Some(false)` withheld, `None` not yet answered.

use crate::api::path::{Attr, Resolve};
use crate::model::schedule::{Duration, Presentation};
use crate::model::user::User;
use crate::model::{require_text, ModelValidationError, RecordId};
use serde::{Deserialize, Serialize};

/// Review state of a submitted talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalkStatus {
    Submitted,
    Accepted,
    Rejected,
}

/// Talk proposal as written by repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTalk {
    pub event_id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub description: String,
    pub duration_id: Option<RecordId>,
    pub status: TalkStatus,
    pub recording_release: Option<bool>,
}

impl NewTalk {
    /// Creates a submitted talk with no duration and an unanswered release.
    pub fn new(
        event_id: RecordId,
        user_id: RecordId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            event_id,
            user_id,
            name: name.into(),
            description: description.into(),
            duration_id: None,
            status: TalkStatus::Submitted,
            recording_release: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("talk.name", &self.name)
    }
}

/// Fully loaded talk graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub id: RecordId,
    pub event_id: RecordId,
    pub name: String,
    pub description: String,
    pub status: TalkStatus,
    pub recording_release: Option<bool>,
    pub duration: Option<Duration>,
    pub presentation: Option<Presentation>,
    pub user: User,
}

impl Resolve for Talk {
    fn entity_name(&self) -> &'static str {
        "talk"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "event_id" => Attr::Int(self.event_id),
            "name" => Attr::Str(&self.name),
            "description" => Attr::Str(&self.description),
            "recording_release" => Attr::opt_bool(self.recording_release),
            "duration" => Attr::node(self.duration.as_ref()),
            "presentation" => Attr::node(self.presentation.as_ref()),
            "user" => Attr::Node(&self.user),
            _ => return None,
        };
        Some(value)
    }
}
