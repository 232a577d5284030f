use chrono::NaiveDate;
use pygotham_core::db::open_db_in_memory;
use pygotham_core::{
    AboutPage, AboutPageRepository, AboutService, AboutServiceError, CreateAboutPageRequest,
    Event, EventRepository, RecordId, RepoError, SqliteAboutPageRepository,
    SqliteEventRepository,
};
use rusqlite::Connection;

fn seed_event(conn: &Connection, name: &str) -> RecordId {
    let begins = NaiveDate::from_ymd_opt(2016, 7, 16)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let ends = NaiveDate::from_ymd_opt(2016, 7, 17)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    SqliteEventRepository::try_new(conn)
        .unwrap()
        .create_event(&Event::new(name, None, begins, ends))
        .unwrap()
}

fn request(event_id: RecordId, section: &str, title: &str, slug: Option<&str>) -> CreateAboutPageRequest {
    CreateAboutPageRequest {
        event_id,
        navbar_section: section.to_string(),
        title: title.to_string(),
        content: format!("{title} body"),
        slug: slug.map(str::to_string),
        active: true,
    }
}

#[test]
fn slug_is_derived_from_title_when_absent() {
    let page = AboutPage::new(1, "about", "Hello World!", "", None);
    assert_eq!(page.slug, "hello-world");
}

#[test]
fn preset_slug_is_not_overwritten() {
    let page = AboutPage::new(1, "about", "Hello World!", "", Some("custom".to_string()));
    assert_eq!(page.slug, "custom");
}

#[test]
fn create_page_persists_derived_slug() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let service = AboutService::new(SqliteAboutPageRepository::try_new(&conn).unwrap());

    let page = service
        .create_page(request(event_id, "about", "Code of Conduct", None))
        .unwrap();
    assert_eq!(page.slug, "code-of-conduct");
    assert_eq!(page.event_id, event_id);
    assert!(page.active);
}

#[test]
fn non_latin_title_creates_page_with_transliterated_slug() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let service = AboutService::new(SqliteAboutPageRepository::try_new(&conn).unwrap());

    let page = service
        .create_page(request(event_id, "about", "北京", None))
        .unwrap();
    assert!(!page.slug.is_empty());
    assert!(service
        .get_active_page(event_id, "about", &page.slug)
        .unwrap()
        .is_some());

    let accented = service
        .create_page(request(event_id, "about", "Café Night", None))
        .unwrap();
    assert_eq!(accented.slug, "cafe-night");
}

#[test]
fn editing_title_keeps_slug() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let service = AboutService::new(SqliteAboutPageRepository::try_new(&conn).unwrap());

    let page = service
        .create_page(request(event_id, "about", "Venue", None))
        .unwrap();
    let edited = service
        .edit_page(page.id, "Venue and Travel", "New directions")
        .unwrap();
    assert_eq!(edited.title, "Venue and Travel");
    assert_eq!(edited.slug, "venue");
}

#[test]
fn routing_triple_is_unique_per_event() {
    let conn = open_db_in_memory().unwrap();
    let first_event = seed_event(&conn, "PyGotham 2015");
    let second_event = seed_event(&conn, "PyGotham 2016");
    let service = AboutService::new(SqliteAboutPageRepository::try_new(&conn).unwrap());

    service
        .create_page(request(first_event, "about", "Sponsors", None))
        .unwrap();

    let err = service
        .create_page(request(first_event, "about", "Sponsors", None))
        .unwrap_err();
    assert!(matches!(err, AboutServiceError::RouteTaken(_)));

    service
        .create_page(request(first_event, "speaking", "Sponsors", None))
        .unwrap();
    service
        .create_page(request(second_event, "about", "Sponsors", None))
        .unwrap();
}

#[test]
fn repository_reports_conflict_on_duplicate_triple() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let repo = SqliteAboutPageRepository::try_new(&conn).unwrap();

    let page = AboutPage::new(event_id, "about", "FAQ", "", None);
    repo.create_page(&page).unwrap();
    let err = repo.create_page(&page).unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn symbol_only_title_without_slug_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let repo = SqliteAboutPageRepository::try_new(&conn).unwrap();

    let page = AboutPage::new(event_id, "about", "???", "", None);
    assert_eq!(page.slug, "");
    let err = repo.create_page(&page).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn inactive_pages_are_hidden_from_public_lookup_and_navbar() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let service = AboutService::new(SqliteAboutPageRepository::try_new(&conn).unwrap());

    let draft = service
        .create_page(CreateAboutPageRequest {
            active: false,
            ..request(event_id, "about", "Draft", None)
        })
        .unwrap();
    service
        .create_page(request(event_id, "about", "Venue", None))
        .unwrap();
    service
        .create_page(request(event_id, "speaking", "Call for Proposals", None))
        .unwrap();
    service
        .create_page(request(event_id, "about", "Code of Conduct", None))
        .unwrap();

    assert!(service
        .get_active_page(event_id, "about", "draft")
        .unwrap()
        .is_none());
    assert!(service
        .get_active_page(event_id, "about", "venue")
        .unwrap()
        .is_some());

    let navbar = service.navbar(event_id).unwrap();
    let layout: Vec<(String, Vec<String>)> = navbar
        .into_iter()
        .map(|section| {
            (
                section.name,
                section.pages.into_iter().map(|page| page.title).collect(),
            )
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            (
                "about".to_string(),
                vec!["Code of Conduct".to_string(), "Venue".to_string()]
            ),
            (
                "speaking".to_string(),
                vec!["Call for Proposals".to_string()]
            ),
        ]
    );

    let published = service.set_active(draft.id, true).unwrap();
    assert!(published.active);
    assert!(service
        .get_active_page(event_id, "about", "draft")
        .unwrap()
        .is_some());
}

#[test]
fn deleting_event_cascades_to_pages() {
    let conn = open_db_in_memory().unwrap();
    let event_id = seed_event(&conn, "PyGotham");
    let repo = SqliteAboutPageRepository::try_new(&conn).unwrap();
    let id = repo
        .create_page(&AboutPage::new(event_id, "about", "FAQ", "", None))
        .unwrap();

    conn.execute("DELETE FROM events WHERE id = ?1;", [event_id])
        .unwrap();
    assert!(repo.get_page(id).unwrap().is_none());
}
