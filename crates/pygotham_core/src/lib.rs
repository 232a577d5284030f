//! Core domain logic for the PyGotham conference site.
//! Records, storage and the REST field-serialization layer live here.

pub mod api;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod slug;

pub use api::fields::{marshal, marshal_all, Field, FieldError, FieldSet, Record, Scalar};
pub use api::fieldsets::{EVENT_FIELDS, REDACTED_EMAIL, TALK_FIELDS, USER_FIELDS};
pub use api::path::{resolve, Attr, AttrPath, Resolve};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::about::AboutPage;
pub use model::event::Event;
pub use model::schedule::{Day, Duration, Presentation, Room, Slot};
pub use model::talk::{NewTalk, Talk, TalkStatus};
pub use model::user::User;
pub use model::{ModelValidationError, RecordId, UNSAVED_ID};
pub use repo::about_repo::{AboutPageListQuery, AboutPageRepository, SqliteAboutPageRepository};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::schedule_repo::{ScheduleRepository, SqliteScheduleRepository};
pub use repo::talk_repo::{SqliteTalkRepository, TalkListQuery, TalkRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::about_service::{
    AboutService, AboutServiceError, CreateAboutPageRequest, NavbarSection,
};
pub use service::api_service::{ApiError, ApiService};
pub use slug::derive_slug;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
