//! About page domain model.
//!
//! # Responsibility
//! - Hold event-scoped static pages grouped under navbar sections.
//! - Derive the page slug from its title once, at construction.
//!
//! # Invariants
//! - `(navbar_section, slug, event_id)` is unique across stored pages.
//! - A supplied slug is never overwritten by derivation.
//! - Later title edits do not touch the slug.

use crate::model::{require_text, ModelValidationError, RecordId, UNSAVED_ID};
use crate::slug::slug_or_derive;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Static content page attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AboutPage {
    pub id: RecordId,
    pub event_id: RecordId,
    pub navbar_section: String,
    pub slug: String,
    pub title: String,
    /// reStructuredText source.
    pub content: String,
    pub active: bool,
}

impl AboutPage {
    /// Creates an unsaved, active page.
    ///
    /// When `slug` is `None` or blank it is derived from `title`.
    pub fn new(
        event_id: RecordId,
        navbar_section: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        slug: Option<String>,
    ) -> Self {
        let title = title.into();
        let slug = slug_or_derive(slug, &title);
        Self {
            id: UNSAVED_ID,
            event_id,
            navbar_section: navbar_section.into(),
            slug,
            title,
            content: content.into(),
            active: true,
        }
    }

    /// Returns the full reST document with the title as top heading.
    ///
    /// The title is framed by `#` rows so headings inside `content` nest
    /// beneath it.
    pub fn rst_document(&self) -> String {
        let divider = "#".repeat(self.title.chars().count());
        [divider.as_str(), self.title.as_str(), divider.as_str(), self.content.as_str()].join("\n")
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("about_page.navbar_section", &self.navbar_section)?;
        require_text("about_page.title", &self.title)?;
        require_text("about_page.slug", &self.slug)?;
        Ok(())
    }
}

impl Display for AboutPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}
