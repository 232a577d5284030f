//! API read service.
//!
//! # Responsibility
//! - Load events and talks through repositories and marshal them with the
//!   public field sets.
//!
//! # Invariants
//! - Talk listings only include accepted talks.
//! - Every record passes through `marshal`; nothing is hand-assembled, so
//!   redaction rules apply everywhere.

use crate::api::fields::{marshal, marshal_all, FieldError, Record};
use crate::api::fieldsets::{EVENT_FIELDS, TALK_FIELDS};
use crate::model::talk::TalkStatus;
use crate::model::RecordId;
use crate::repo::event_repo::EventRepository;
use crate::repo::talk_repo::{TalkListQuery, TalkRepository};
use crate::repo::RepoError;
use log::{debug, error};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    NotFound {
        resource: &'static str,
        id: RecordId,
    },
    Repo(RepoError),
    /// A field set does not match the entity it was applied to.
    Field(FieldError),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "serialization failed: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Repo(err) => Some(err),
            Self::Field(err) => Some(err),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound {
                resource: entity,
                id,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

fn marshal_failed(resource: &'static str) -> impl FnOnce(FieldError) -> ApiError {
    move |err| {
        error!(
            "event=api_marshal module=api status=error resource={} error={}",
            resource, err
        );
        ApiError::Field(err)
    }
}

/// Read-only API facade over event and talk repositories.
pub struct ApiService<E: EventRepository, T: TalkRepository> {
    events: E,
    talks: T,
}

impl<E: EventRepository, T: TalkRepository> ApiService<E, T> {
    pub fn new(events: E, talks: T) -> Self {
        Self { events, talks }
    }

    /// Marshals one event.
    pub fn event(&self, event_id: RecordId) -> Result<Record, ApiError> {
        let event = self
            .events
            .get_event(event_id)?
            .ok_or(ApiError::NotFound {
                resource: "event",
                id: event_id,
            })?;
        marshal(&EVENT_FIELDS, &event).map_err(marshal_failed("event"))
    }

    /// Marshals every event, newest first.
    pub fn events(&self) -> Result<Vec<Value>, ApiError> {
        let events = self.events.list_events()?;
        let records = marshal_all(&EVENT_FIELDS, &events).map_err(marshal_failed("events"))?;
        debug!(
            "event=api_marshal module=api status=ok resource=events count={}",
            records.len()
        );
        Ok(records)
    }

    /// Resolves an event slug to its id.
    pub fn event_id_for_slug(&self, slug: &str) -> Result<Option<RecordId>, ApiError> {
        Ok(self.events.get_event_by_slug(slug)?.map(|event| event.id))
    }

    /// Marshals the accepted talks of one event.
    pub fn talks(&self, event_id: RecordId) -> Result<Vec<Value>, ApiError> {
        if self.events.get_event(event_id)?.is_none() {
            return Err(ApiError::NotFound {
                resource: "event",
                id: event_id,
            });
        }

        let talks = self.talks.list_talks(&TalkListQuery {
            event_id: Some(event_id),
            status: Some(TalkStatus::Accepted),
        })?;
        let records = marshal_all(&TALK_FIELDS, &talks).map_err(marshal_failed("talks"))?;
        debug!(
            "event=api_marshal module=api status=ok resource=talks event_id={} count={}",
            event_id,
            records.len()
        );
        Ok(records)
    }

    /// Marshals one talk regardless of review status.
    pub fn talk(&self, talk_id: RecordId) -> Result<Record, ApiError> {
        let talk = self.talks.get_talk(talk_id)?.ok_or(ApiError::NotFound {
            resource: "talk",
            id: talk_id,
        })?;
        marshal(&TALK_FIELDS, &talk).map_err(marshal_failed("talk"))
    }
}

#[cfg(test)]
mod tests {
    use super::{marshal_failed, ApiError};
    use crate::api::fields::FieldError;
    use std::error::Error;

    fn mismatch() -> FieldError {
        FieldError::TypeMismatch {
            key: "priority".to_string(),
            expected: "bool",
            found: "string",
        }
    }

    #[test]
    fn field_error_conversion_wraps_without_side_effects() {
        let err = ApiError::from(mismatch());
        assert!(matches!(err, ApiError::Field(FieldError::TypeMismatch { .. })));
        assert!(err.source().is_some());
    }

    #[test]
    fn marshal_failure_keeps_field_error() {
        let err = marshal_failed("talk")(mismatch());
        assert!(matches!(err, ApiError::Field(FieldError::TypeMismatch { ref key, .. }) if key == "priority"));
        assert!(err.to_string().starts_with("serialization failed:"));
    }
}
