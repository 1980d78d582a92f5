//! Tests for the owned event set: validated, conflict-checked writes.

use chrono::{NaiveDate, NaiveDateTime};
use occurrence_engine::{Calendar, CalendarError, EventDefinition, EventId, Recurrence, SearchFilter};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn seeded() -> Calendar {
    let mut calendar = Calendar::new();
    calendar
        .create(
            EventDefinition::new(1, "Standup", at(3, 9), at(3, 10))
                .with_recurrence(Recurrence::Daily, 1),
        )
        .unwrap();
    calendar
        .create(
            EventDefinition::new(2, "Lunch with Sam", at(4, 12), at(4, 13))
                .with_description("Ramen place"),
        )
        .unwrap();
    calendar
}

#[test]
fn create_appends_a_free_event() {
    let calendar = seeded();

    assert_eq!(calendar.len(), 2);
    assert_eq!(calendar.get(&EventId::Int(2)).unwrap().title, "Lunch with Sam");
}

#[test]
fn next_id_follows_the_largest_integer_id() {
    let mut calendar = seeded();
    assert_eq!(calendar.next_id(), EventId::Int(3));

    calendar
        .create(EventDefinition::new("imported", "Import", at(20, 14), at(20, 15)))
        .unwrap();
    assert_eq!(calendar.next_id(), EventId::Int(3));
    assert_eq!(Calendar::new().next_id(), EventId::Int(1));
}

#[test]
fn create_rejects_end_before_start() {
    let mut calendar = seeded();
    let err = calendar
        .create(EventDefinition::new(3, "Backwards", at(5, 15), at(5, 14)))
        .unwrap_err();

    assert!(matches!(err, CalendarError::InvalidTimeRange { .. }));
    assert_eq!(calendar, seeded());
}

#[test]
fn create_rejects_zero_length_event() {
    let mut calendar = Calendar::new();
    let err = calendar
        .create(EventDefinition::new(1, "Instant", at(5, 15), at(5, 15)))
        .unwrap_err();

    assert!(matches!(err, CalendarError::InvalidTimeRange { .. }));
    assert!(calendar.is_empty());
}

#[test]
fn create_rejects_blank_title_and_bad_weekday() {
    let mut calendar = Calendar::new();

    let err = calendar
        .create(EventDefinition::new(1, "   ", at(5, 15), at(5, 16)))
        .unwrap_err();
    assert!(matches!(err, CalendarError::EmptyTitle));

    let err = calendar
        .create(
            EventDefinition::new(1, "Gym", at(5, 15), at(5, 16))
                .with_recurrence(Recurrence::Weekly, 1)
                .with_days(vec![1, 7]),
        )
        .unwrap_err();
    assert!(matches!(err, CalendarError::InvalidWeekday(7)));
}

#[test]
fn create_rejects_duplicate_id() {
    let mut calendar = seeded();
    let err = calendar
        .create(EventDefinition::new(2, "Other", at(25, 8), at(25, 9)))
        .unwrap_err();

    assert!(matches!(err, CalendarError::DuplicateId(EventId::Int(2))));
}

#[test]
fn create_rejects_conflict_and_leaves_set_unchanged() {
    let mut calendar = seeded();
    let before = calendar.clone();

    let err = calendar
        .create(EventDefinition::new(3, "Dentist", at(10, 9), at(10, 11)))
        .unwrap_err();

    match err {
        CalendarError::Conflict { id, title } => {
            assert_eq!(id, EventId::Int(1));
            assert_eq!(title, "Standup");
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(calendar, before);
}

#[test]
fn update_in_place_never_self_conflicts() {
    let mut calendar = seeded();
    let mut standup = calendar.get(&EventId::Int(1)).unwrap().clone();
    standup.title = "Daily standup".to_string();

    let updated = calendar.update(standup).unwrap();

    assert_eq!(updated.title, "Daily standup");
    assert_eq!(calendar.len(), 2);
}

#[test]
fn update_unknown_id_is_not_found() {
    let mut calendar = seeded();
    let err = calendar
        .update(EventDefinition::new(99, "Ghost", at(5, 8), at(5, 9)))
        .unwrap_err();

    assert!(matches!(err, CalendarError::NotFound(EventId::Int(99))));
}

#[test]
fn update_clears_days_for_non_weekly_rules() {
    let mut calendar = seeded();
    let lunch = calendar
        .get(&EventId::Int(2))
        .unwrap()
        .clone()
        .with_recurrence(Recurrence::Monthly, 1)
        .with_days(vec![1, 3]);

    let updated = calendar.update(lunch).unwrap();

    assert!(updated.recurrence_days.is_empty());
}

#[test]
fn move_event_reschedules() {
    let mut calendar = seeded();
    let moved = calendar
        .move_event(&EventId::Int(2), at(4, 13), at(4, 14))
        .unwrap();

    assert_eq!(moved.start, at(4, 13));
    assert_eq!(moved.description.as_deref(), Some("Ramen place"));
}

#[test]
fn move_onto_a_recurring_instance_is_rejected() {
    let mut calendar = seeded();
    let before = calendar.clone();

    let err = calendar
        .move_event(&EventId::Int(2), at(4, 9), at(4, 10))
        .unwrap_err();

    assert!(matches!(err, CalendarError::Conflict { .. }));
    assert_eq!(calendar, before);
}

#[test]
fn move_recurring_event_ignores_its_own_instances() {
    let mut calendar = seeded();
    // Shifting the standup 30 minutes overlaps its old instances, which is fine.
    let moved = calendar
        .move_event(&EventId::Int(1), at(3, 9) + chrono::Duration::minutes(30), at(3, 10) + chrono::Duration::minutes(30))
        .unwrap();

    assert_eq!(moved.recurrence, Recurrence::Daily);
}

#[test]
fn delete_removes_and_returns_the_event() {
    let mut calendar = seeded();

    let removed = calendar.delete(&EventId::Int(1)).unwrap();
    assert_eq!(removed.title, "Standup");
    assert_eq!(calendar.len(), 1);

    let err = calendar.delete(&EventId::Int(1)).unwrap_err();
    assert!(matches!(err, CalendarError::NotFound(_)));
}

#[test]
fn occurrences_are_filtered_by_search_text() {
    let calendar = seeded();

    assert_eq!(calendar.occurrences(&SearchFilter::all()).len(), 51);
    assert_eq!(calendar.occurrences(&SearchFilter::new("STAND")).len(), 50);

    let by_description = calendar.occurrences(&SearchFilter::new("ramen"));
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].event.title, "Lunch with Sam");

    assert!(calendar.occurrences(&SearchFilter::new("yoga")).is_empty());
}

#[test]
fn resolve_id_matches_integer_and_text_spellings() {
    let mut calendar = seeded();
    calendar
        .create(EventDefinition::new("42", "Gym", at(5, 18), at(5, 19)))
        .unwrap();
    calendar
        .create(EventDefinition::new("gym", "Yoga", at(6, 18), at(6, 19)))
        .unwrap();

    assert_eq!(calendar.resolve_id(&EventId::Int(1)), Some(EventId::Int(1)));
    assert_eq!(calendar.resolve_id(&EventId::from("1")), Some(EventId::Int(1)));
    assert_eq!(calendar.resolve_id(&EventId::Int(42)), Some(EventId::from("42")));
    assert_eq!(calendar.resolve_id(&EventId::from("gym")), Some(EventId::from("gym")));
    assert_eq!(calendar.resolve_id(&EventId::Int(7)), None);
    assert_eq!(calendar.resolve_id(&EventId::from("swim")), None);
}

#[test]
fn resolve_id_prefers_an_exact_match() {
    let mut calendar = seeded();
    calendar
        .create(EventDefinition::new("2", "Dentist", at(7, 8), at(7, 9)))
        .unwrap();

    assert_eq!(calendar.resolve_id(&EventId::Int(2)), Some(EventId::Int(2)));
    assert_eq!(calendar.resolve_id(&EventId::from("2")), Some(EventId::from("2")));
}
