use chrono::{NaiveDate, NaiveTime};
use pygotham_core::db::open_db_in_memory;
use pygotham_core::{
    marshal, ApiError, ApiService, Day, Duration, Event, EventRepository, NewTalk, RecordId,
    Room, ScheduleRepository, SqliteEventRepository, SqliteScheduleRepository,
    SqliteTalkRepository, SqliteUserRepository, TalkRepository, TalkStatus, User,
    UserRepository, TALK_FIELDS, USER_FIELDS,
};
use rusqlite::Connection;
use serde_json::{json, Value};

struct Seed {
    event_id: RecordId,
    user_id: RecordId,
    duration_id: RecordId,
    day_id: RecordId,
    hall_a: RecordId,
    hall_b: RecordId,
}

fn seed(conn: &Connection) -> Seed {
    let date = NaiveDate::from_ymd_opt(2016, 7, 16).unwrap();
    let event_id = SqliteEventRepository::try_new(conn)
        .unwrap()
        .create_event(&Event::new(
            "PyGotham 2016",
            None,
            date.and_hms_opt(9, 0, 0).unwrap(),
            date.and_hms_opt(18, 0, 0).unwrap(),
        ))
        .unwrap();

    let mut speaker = User::new("speaker@example.com", Some("Ada Lovelace".to_string()));
    speaker.bio = Some("Analyst.".to_string());
    speaker.twitter_handle = Some("ada".to_string());
    speaker.picture_url = Some("https://example.com/ada.png".to_string());
    let user_id = SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(&speaker)
        .unwrap();

    let schedule = SqliteScheduleRepository::try_new(conn).unwrap();
    let duration_id = schedule
        .create_duration(&Duration::new("30 minutes", 30))
        .unwrap();
    let day_id = schedule.create_day(&Day::new(event_id, date)).unwrap();
    let hall_b = schedule.create_room(&Room::new("Hall B", 2)).unwrap();
    let hall_a = schedule.create_room(&Room::new("Hall A", 1)).unwrap();

    Seed {
        event_id,
        user_id,
        duration_id,
        day_id,
        hall_a,
        hall_b,
    }
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn accepted_talk(seed: &Seed, name: &str) -> NewTalk {
    let mut talk = NewTalk::new(seed.event_id, seed.user_id, name, format!("{name} abstract"));
    talk.status = TalkStatus::Accepted;
    talk.duration_id = Some(seed.duration_id);
    talk
}

#[test]
fn scheduled_talk_serializes_every_field() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let schedule = SqliteScheduleRepository::try_new(&conn).unwrap();
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let mut new_talk = accepted_talk(&seed, "Parsing with Rust");
    new_talk.recording_release = Some(true);
    let talk_id = talks.create_talk(&new_talk).unwrap();
    let slot_id = schedule
        .create_slot(seed.day_id, time(10, 30), time(11, 0), &[seed.hall_b, seed.hall_a])
        .unwrap();
    talks.schedule_talk(talk_id, slot_id).unwrap();

    let talk = talks.get_talk(talk_id).unwrap().unwrap();
    let record = marshal(&TALK_FIELDS, &talk).unwrap();

    assert_eq!(
        Value::Object(record),
        json!({
            "id": talk_id,
            "conf_key": talk_id,
            "description": "Parsing with Rust abstract",
            "duration": 30,
            "language": "English",
            "summary": "Parsing with Rust abstract",
            "room": "Hall A & Hall B",
            "room_alias": "Hall A & Hall B",
            "start": "2016-07-16T10:30:00",
            "priority": 9,
            "released": true,
            "license": "Creative Commons",
            "tags": [],
            "title": "Parsing with Rust",
            "user": {
                "id": seed.user_id,
                "bio": "Analyst.",
                "email": "<redacted>",
                "name": "Ada Lovelace",
                "picture_url": null,
                "twitter_id": "ada",
            },
        })
    );
}

#[test]
fn unscheduled_talk_degrades_schedule_fields_to_null() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let mut new_talk = NewTalk::new(seed.event_id, seed.user_id, "Unplaced", "");
    new_talk.recording_release = Some(false);
    let talk_id = talks.create_talk(&new_talk).unwrap();

    let talk = talks.get_talk(talk_id).unwrap().unwrap();
    let record = marshal(&TALK_FIELDS, &talk).unwrap();

    assert_eq!(record["room"], Value::Null);
    assert_eq!(record["room_alias"], Value::Null);
    assert_eq!(record["start"], Value::Null);
    assert_eq!(record["duration"], Value::Null);
    assert_eq!(record["priority"], json!(0));
    assert_eq!(record["released"], json!(false));
}

#[test]
fn unknown_recording_release_maps_to_middle_priority() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let talk_id = talks.create_talk(&accepted_talk(&seed, "Undecided")).unwrap();
    let record = marshal(&TALK_FIELDS, &talks.get_talk(talk_id).unwrap().unwrap()).unwrap();
    assert_eq!(record["priority"], json!(5));
    assert_eq!(record["released"], Value::Null);

    talks.set_recording_release(talk_id, Some(true)).unwrap();
    let record = marshal(&TALK_FIELDS, &talks.get_talk(talk_id).unwrap().unwrap()).unwrap();
    assert_eq!(record["priority"], json!(9));
}

#[test]
fn slot_without_rooms_joins_to_empty_string() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let schedule = SqliteScheduleRepository::try_new(&conn).unwrap();
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let talk_id = talks.create_talk(&accepted_talk(&seed, "Lightning")).unwrap();
    let slot_id = schedule
        .create_slot(seed.day_id, time(17, 0), time(17, 5), &[])
        .unwrap();
    talks.schedule_talk(talk_id, slot_id).unwrap();

    let record = marshal(&TALK_FIELDS, &talks.get_talk(talk_id).unwrap().unwrap()).unwrap();
    assert_eq!(record["room"], json!(""));
    assert_eq!(record["start"], json!("2016-07-16T17:00:00"));
}

#[test]
fn nested_user_matches_standalone_user_record() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let talk_id = talks.create_talk(&accepted_talk(&seed, "Nested")).unwrap();
    let talk = talks.get_talk(talk_id).unwrap().unwrap();

    let talk_record = marshal(&TALK_FIELDS, &talk).unwrap();
    let user_record = marshal(&USER_FIELDS, &talk.user).unwrap();
    assert_eq!(talk_record["user"], Value::Object(user_record));
}

#[test]
fn talk_can_only_be_scheduled_once() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let schedule = SqliteScheduleRepository::try_new(&conn).unwrap();
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let talk_id = talks.create_talk(&accepted_talk(&seed, "Once")).unwrap();
    let first = schedule
        .create_slot(seed.day_id, time(9, 0), time(9, 30), &[seed.hall_a])
        .unwrap();
    let second = schedule
        .create_slot(seed.day_id, time(9, 30), time(10, 0), &[seed.hall_a])
        .unwrap();

    talks.schedule_talk(talk_id, first).unwrap();
    let err = talks.schedule_talk(talk_id, second).unwrap_err();
    assert!(matches!(err, pygotham_core::RepoError::Conflict(_)));

    talks.unschedule_talk(talk_id).unwrap();
    talks.schedule_talk(talk_id, second).unwrap();
    let talk = talks.get_talk(talk_id).unwrap().unwrap();
    assert_eq!(talk.presentation.unwrap().slot.id, second);
}

#[test]
fn api_lists_only_accepted_talks_of_the_event() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks_repo = SqliteTalkRepository::try_new(&conn).unwrap();

    let accepted = talks_repo
        .create_talk(&accepted_talk(&seed, "Accepted"))
        .unwrap();
    let pending = talks_repo
        .create_talk(&NewTalk::new(seed.event_id, seed.user_id, "Pending", ""))
        .unwrap();

    let api = ApiService::new(
        SqliteEventRepository::try_new(&conn).unwrap(),
        SqliteTalkRepository::try_new(&conn).unwrap(),
    );

    let listed = api.talks(seed.event_id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(accepted));

    talks_repo.set_status(pending, TalkStatus::Accepted).unwrap();
    assert_eq!(api.talks(seed.event_id).unwrap().len(), 2);

    let detail = api.talk(pending).unwrap();
    assert_eq!(detail["title"], json!("Pending"));
}

#[test]
fn api_event_record_uses_iso_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let api = ApiService::new(
        SqliteEventRepository::try_new(&conn).unwrap(),
        SqliteTalkRepository::try_new(&conn).unwrap(),
    );

    let record = api.event(seed.event_id).unwrap();
    assert_eq!(
        Value::Object(record),
        json!({
            "id": seed.event_id,
            "begins": "2016-07-16T09:00:00",
            "ends": "2016-07-16T18:00:00",
            "name": "PyGotham 2016",
            "registration_url": null,
            "slug": "pygotham-2016",
        })
    );
    assert_eq!(
        api.event_id_for_slug("pygotham-2016").unwrap(),
        Some(seed.event_id)
    );
    assert_eq!(api.events().unwrap().len(), 1);
}

#[test]
fn api_reports_missing_resources() {
    let conn = open_db_in_memory().unwrap();
    let api = ApiService::new(
        SqliteEventRepository::try_new(&conn).unwrap(),
        SqliteTalkRepository::try_new(&conn).unwrap(),
    );

    assert!(matches!(
        api.event(404).unwrap_err(),
        ApiError::NotFound { resource: "event", id: 404 }
    ));
    assert!(matches!(
        api.talks(404).unwrap_err(),
        ApiError::NotFound { resource: "event", .. }
    ));
    assert!(matches!(
        api.talk(7).unwrap_err(),
        ApiError::NotFound { resource: "talk", id: 7 }
    ));
}

#[test]
fn marshal_is_idempotent_on_the_same_graph() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();

    let talk_id = talks.create_talk(&accepted_talk(&seed, "Twice")).unwrap();
    let talk = talks.get_talk(talk_id).unwrap().unwrap();

    let first = marshal(&TALK_FIELDS, &talk).unwrap();
    let second = marshal(&TALK_FIELDS, &talk).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.keys().map(String::as_str).collect::<Vec<_>>(),
        TALK_FIELDS.keys().collect::<Vec<_>>()
    );
}

#[test]
fn marshal_is_safe_to_share_across_threads() {
    let conn = open_db_in_memory().unwrap();
    let seed = seed(&conn);
    let talks = SqliteTalkRepository::try_new(&conn).unwrap();
    let talk_id = talks.create_talk(&accepted_talk(&seed, "Shared")).unwrap();
    let talk = talks.get_talk(talk_id).unwrap().unwrap();
    let expected = marshal(&TALK_FIELDS, &talk).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| marshal(&TALK_FIELDS, &talk).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
