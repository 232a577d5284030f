//! About page repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `(navbar_section, slug, event_id)` stays unique; a clashing write
//!   returns `RepoError::Conflict` and leaves storage unchanged.
//! - Listing order is `navbar_section ASC, title ASC, id ASC`.

use crate::model::about::AboutPage;
use crate::model::RecordId;
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, map_conflict, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ABOUT_PAGE_SELECT_SQL: &str = "SELECT
    id,
    event_id,
    navbar_section,
    slug,
    title,
    content,
    active
FROM about_pages";

/// Query options for listing an event's pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AboutPageListQuery {
    pub event_id: RecordId,
    pub include_inactive: bool,
}

pub trait AboutPageRepository {
    fn create_page(&self, page: &AboutPage) -> RepoResult<RecordId>;
    fn update_page(&self, page: &AboutPage) -> RepoResult<()>;
    fn get_page(&self, id: RecordId) -> RepoResult<Option<AboutPage>>;
    /// Looks a page up by its routing triple.
    fn find_page(
        &self,
        event_id: RecordId,
        navbar_section: &str,
        slug: &str,
    ) -> RepoResult<Option<AboutPage>>;
    fn list_pages(&self, query: &AboutPageListQuery) -> RepoResult<Vec<AboutPage>>;
}

pub struct SqliteAboutPageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAboutPageRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["events", "about_pages"])?;
        Ok(Self { conn })
    }
}

impl AboutPageRepository for SqliteAboutPageRepository<'_> {
    fn create_page(&self, page: &AboutPage) -> RepoResult<RecordId> {
        page.validate()?;

        self.conn
            .execute(
                "INSERT INTO about_pages (
                    navbar_section,
                    slug,
                    title,
                    content,
                    active,
                    event_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    page.navbar_section.as_str(),
                    page.slug.as_str(),
                    page.title.as_str(),
                    page.content.as_str(),
                    bool_to_int(page.active),
                    page.event_id,
                ],
            )
            .map_err(|err| map_conflict(err, || routing_conflict(page)))?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_page(&self, page: &AboutPage) -> RepoResult<()> {
        page.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE about_pages
                 SET
                    navbar_section = ?1,
                    slug = ?2,
                    title = ?3,
                    content = ?4,
                    active = ?5,
                    event_id = ?6
                 WHERE id = ?7;",
                params![
                    page.navbar_section.as_str(),
                    page.slug.as_str(),
                    page.title.as_str(),
                    page.content.as_str(),
                    bool_to_int(page.active),
                    page.event_id,
                    page.id,
                ],
            )
            .map_err(|err| map_conflict(err, || routing_conflict(page)))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "about_page",
                id: page.id,
            });
        }

        Ok(())
    }

    fn get_page(&self, id: RecordId) -> RepoResult<Option<AboutPage>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ABOUT_PAGE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_page_row(row)?)),
            None => Ok(None),
        }
    }

    fn find_page(
        &self,
        event_id: RecordId,
        navbar_section: &str,
        slug: &str,
    ) -> RepoResult<Option<AboutPage>> {
        let id: Option<RecordId> = self
            .conn
            .query_row(
                "SELECT id
                 FROM about_pages
                 WHERE event_id = ?1
                   AND navbar_section = ?2
                   AND slug = ?3;",
                params![event_id, navbar_section, slug],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => self.get_page(id),
            None => Ok(None),
        }
    }

    fn list_pages(&self, query: &AboutPageListQuery) -> RepoResult<Vec<AboutPage>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ABOUT_PAGE_SELECT_SQL}
             WHERE event_id = ?1
               AND (?2 = 1 OR active = 1)
             ORDER BY navbar_section ASC, title ASC, id ASC;"
        ))?;

        let mut rows = stmt.query(params![query.event_id, bool_to_int(query.include_inactive)])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }
}

fn routing_conflict(page: &AboutPage) -> String {
    format!(
        "about page `{}/{}` already exists for event {}",
        page.navbar_section, page.slug, page.event_id
    )
}

fn parse_page_row(row: &Row<'_>) -> RepoResult<AboutPage> {
    let page = AboutPage {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        navbar_section: row.get("navbar_section")?,
        slug: row.get("slug")?,
        title: row.get("title")?,
        content: row.get("content")?,
        active: int_to_bool("about_pages.active", row.get("active")?)?,
    };
    page.validate()?;
    Ok(page)
}
