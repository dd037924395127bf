use chrono::Duration;
use sheetcal_core::{CalendarStore, Event, EventDetails, EventTime, MemoryStore, reconcile};

fn match_day(location: &str) -> Event {
    Event {
        summary: "Tennis - Match vs Righetti".into(),
        location: location.into(),
        description: format!("Location: {}\nTime: 4", location),
        start: EventTime::DateTime {
            date_time: "2025-03-04T16:00:00".into(),
            time_zone: Some("America/Los_Angeles".into()),
        },
        end: EventTime::DateTime {
            date_time: "2025-03-04T18:00:00".into(),
            time_zone: Some("America/Los_Angeles".into()),
        },
        details: EventDetails::default(),
    }
}

fn practice() -> Event {
    Event {
        summary: "Tennis - Practice at Home Courts".into(),
        location: "Home Courts".into(),
        description: "Location: Home Courts\nTime: TBD".into(),
        start: EventTime::Date {
            date: "2025-03-05".parse().expect("Should parse date"),
        },
        end: EventTime::Date {
            date: "2025-03-06".parse().expect("Should parse date"),
        },
        details: EventDetails::default(),
    }
}

#[tokio::test]
async fn test_new_row_is_inserted() {
    let store = MemoryStore::new();
    store.seed("Tennis", practice());
    let calendar = store
        .resolve_or_create_calendar("Tennis")
        .await
        .expect("Should resolve");

    let outcome = reconcile(&store, &calendar, vec![practice(), match_day("Arroyo Grande")], Duration::hours(2))
        .await
        .expect("Should reconcile");

    assert_eq!((outcome.inserted, outcome.updated, outcome.deleted), (1, 0, 0));
    assert_eq!(outcome.unchanged, 1);
}

#[tokio::test]
async fn test_changed_location_text_updates() {
    let store = MemoryStore::new();
    store.seed("Tennis", match_day("Arroyo Grande"));
    let calendar = store.resolve_or_create_calendar("Tennis").await.unwrap();

    let outcome = reconcile(&store, &calendar, vec![match_day("Arroyo Grande HS")], Duration::hours(2))
        .await
        .unwrap();

    assert_eq!((outcome.inserted, outcome.updated, outcome.deleted), (0, 1, 0));
    let stored = store.events("Tennis");
    assert_eq!(stored[0].event.location, "Arroyo Grande HS");
}

#[tokio::test]
async fn test_removed_row_is_deleted() {
    let store = MemoryStore::new();
    store.seed("Tennis", practice());
    store.seed("Tennis", match_day("Arroyo Grande"));
    let calendar = store.resolve_or_create_calendar("Tennis").await.unwrap();

    let outcome = reconcile(&store, &calendar, vec![practice()], Duration::hours(2))
        .await
        .unwrap();

    assert_eq!((outcome.inserted, outcome.updated, outcome.deleted), (0, 0, 1));
    assert_eq!(store.events("Tennis").len(), 1);
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let store = MemoryStore::new();
    let calendar = store.resolve_or_create_calendar("Tennis").await.unwrap();
    let events = vec![practice(), match_day("Arroyo Grande")];

    let first = reconcile(&store, &calendar, events.clone(), Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(first.inserted, 2);

    store.reset_writes();
    let second = reconcile(&store, &calendar, events, Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(second.changes(), 0);
    assert_eq!(store.writes().total(), 0);
}

#[tokio::test]
async fn test_invalid_events_are_fixed_or_left_out() {
    let store = MemoryStore::new();
    let calendar = store.resolve_or_create_calendar("Tennis").await.unwrap();

    let mut zero_length = match_day("Arroyo Grande");
    zero_length.end = zero_length.start.clone();

    let mut mixed = practice();
    mixed.end = match_day("Ojai").end;

    let outcome = reconcile(&store, &calendar, vec![zero_length, mixed], Duration::hours(2))
        .await
        .unwrap();

    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.skipped, 1);
    let stored = store.events("Tennis");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].event.end.wall_clock(), Some("2025-03-04T18:00:00"));
}
