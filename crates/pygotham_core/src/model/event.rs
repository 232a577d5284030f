//! Event domain model.
//!
//! # Invariants
//! - `ends` is never earlier than `begins`.
//! - `slug` is derived from `name` at construction when none is supplied.

use crate::api::path::{Attr, Resolve};
use crate::model::{require_text, ModelValidationError, RecordId, UNSAVED_ID};
use crate::slug::slug_or_derive;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One conference edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    pub begins: NaiveDateTime,
    pub ends: NaiveDateTime,
    pub registration_url: Option<String>,
}

impl Event {
    /// Creates an unsaved event, deriving the slug from `name` if `slug` is unset.
    pub fn new(
        name: impl Into<String>,
        slug: Option<String>,
        begins: NaiveDateTime,
        ends: NaiveDateTime,
    ) -> Self {
        let name = name.into();
        let slug = slug_or_derive(slug, &name);
        Self {
            id: UNSAVED_ID,
            name,
            slug,
            begins,
            ends,
            registration_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("event.name", &self.name)?;
        require_text("event.slug", &self.slug)?;
        if self.ends < self.begins {
            return Err(ModelValidationError::InvalidTimeRange {
                field: "event",
                start: self.begins.to_string(),
                end: self.ends.to_string(),
            });
        }
        Ok(())
    }
}

impl Resolve for Event {
    fn entity_name(&self) -> &'static str {
        "event"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "name" => Attr::Str(&self.name),
            "slug" => Attr::Str(&self.slug),
            "begins" => Attr::DateTime(self.begins),
            "ends" => Attr::DateTime(self.ends),
            "registration_url" => Attr::opt_str(self.registration_url.as_deref()),
            _ => return None,
        };
        Some(value)
    }
}
