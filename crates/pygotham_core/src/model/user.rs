//! User domain model.
//!
//! `email` and `picture_url` are stored but must never leave the process
//! through the API field sets.

use crate::api::path::{Attr, Resolve};
use crate::model::{require_text, ModelValidationError, RecordId, UNSAVED_ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    /// Handle without the leading `@`.
    pub twitter_handle: Option<String>,
    pub picture_url: Option<String>,
}

impl User {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            email: email.into(),
            name,
            bio: None,
            twitter_handle: None,
            picture_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("user.email", &self.email)
    }
}

impl Resolve for User {
    fn entity_name(&self) -> &'static str {
        "user"
    }

    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        let value = match name {
            "id" => Attr::Int(self.id),
            "email" => Attr::Str(&self.email),
            "name" => Attr::opt_str(self.name.as_deref()),
            "bio" => Attr::opt_str(self.bio.as_deref()),
            "twitter_handle" => Attr::opt_str(self.twitter_handle.as_deref()),
            "picture_url" => Attr::opt_str(self.picture_url.as_deref()),
            _ => return None,
        };
        Some(value)
    }
}
