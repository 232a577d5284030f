//! About page use-case service.
//!
//! # Responsibility
//! - Create pages with slug derivation applied exactly once.
//! - Serve active pages by routing triple and build navbar groupings.
//!
//! # Invariants
//! - Renaming a page never rewrites its slug.
//! - Inactive pages are invisible to public lookups.

use crate::model::about::AboutPage;
use crate::model::RecordId;
use crate::repo::about_repo::{AboutPageListQuery, AboutPageRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for about page use-cases.
#[derive(Debug)]
pub enum AboutServiceError {
    PageNotFound(RecordId),
    /// Another page already owns the `(navbar_section, slug, event)` triple.
    RouteTaken(String),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for AboutServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageNotFound(id) => write!(f, "about page not found: {id}"),
            Self::RouteTaken(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent about page state: {details}"),
        }
    }
}

impl Error for AboutServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AboutServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::PageNotFound(id),
            RepoError::Conflict(message) => Self::RouteTaken(message),
            other => Self::Repo(other),
        }
    }
}

/// Request model for creating an about page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAboutPageRequest {
    pub event_id: RecordId,
    pub navbar_section: String,
    pub title: String,
    pub content: String,
    /// Explicit slug; derived from `title` when `None`.
    pub slug: Option<String>,
    pub active: bool,
}

/// Active pages sharing one navbar section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavbarSection {
    pub name: String,
    pub pages: Vec<AboutPage>,
}

pub struct AboutService<R: AboutPageRepository> {
    repo: R,
}

impl<R: AboutPageRepository> AboutService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a page and returns the stored record.
    pub fn create_page(
        &self,
        request: CreateAboutPageRequest,
    ) -> Result<AboutPage, AboutServiceError> {
        let mut page = AboutPage::new(
            request.event_id,
            request.navbar_section,
            request.title,
            request.content,
            request.slug,
        );
        page.active = request.active;

        let id = match self.repo.create_page(&page) {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "event=about_page_create module=service status=error event_id={} error={}",
                    page.event_id, err
                );
                return Err(err.into());
            }
        };
        info!(
            "event=about_page_create module=service status=ok event_id={} page_id={} slug={}",
            page.event_id, id, page.slug
        );

        self.repo
            .get_page(id)?
            .ok_or(AboutServiceError::InconsistentState(
                "created page not found in read-back",
            ))
    }

    /// Changes title and content, keeping the slug assigned at creation.
    pub fn edit_page(
        &self,
        id: RecordId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<AboutPage, AboutServiceError> {
        let mut page = self
            .repo
            .get_page(id)?
            .ok_or(AboutServiceError::PageNotFound(id))?;
        page.title = title.into();
        page.content = content.into();
        self.repo.update_page(&page)?;
        Ok(page)
    }

    pub fn set_active(&self, id: RecordId, active: bool) -> Result<AboutPage, AboutServiceError> {
        let mut page = self
            .repo
            .get_page(id)?
            .ok_or(AboutServiceError::PageNotFound(id))?;
        page.active = active;
        self.repo.update_page(&page)?;
        Ok(page)
    }

    /// Looks up an active page by its public route.
    pub fn get_active_page(
        &self,
        event_id: RecordId,
        navbar_section: &str,
        slug: &str,
    ) -> Result<Option<AboutPage>, AboutServiceError> {
        let page = self.repo.find_page(event_id, navbar_section, slug)?;
        Ok(page.filter(|page| page.active))
    }

    /// Groups an event's active pages by navbar section, in section order.
    pub fn navbar(&self, event_id: RecordId) -> Result<Vec<NavbarSection>, AboutServiceError> {
        let pages = self.repo.list_pages(&AboutPageListQuery {
            event_id,
            include_inactive: false,
        })?;

        let mut sections: Vec<NavbarSection> = Vec::new();
        for page in pages {
            match sections.last_mut() {
                Some(section) if section.name == page.navbar_section => section.pages.push(page),
                _ => sections.push(NavbarSection {
                    name: page.navbar_section.clone(),
                    pages: vec![page],
                }),
            }
        }
        Ok(sections)
    }
}
