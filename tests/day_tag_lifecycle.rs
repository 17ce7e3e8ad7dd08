//! End-to-end lifecycle of tags and their day associations.

use gutlog::models::date::{format_day, parse_day};
use gutlog::{Database, MonthProjector, TagError, TagService};

fn service() -> TagService {
    let db = Database::in_memory().expect("failed to create in-memory database");
    TagService::new(db)
}

#[test]
fn vacation_weekend_scenario() {
    let service = service();

    // Create tag "Vacation" and apply it to two October days
    let tag = service
        .create_or_get_tag("Vacation", None)
        .expect("failed to create tag");
    service.add_tag_to_day(tag.id, "2025-10-25").unwrap();
    service.add_tag_to_day(tag.id, "2025-10-26").unwrap();

    // The month view decorates exactly those days
    let month = service.tagged_days_in_month(2025, 10).unwrap();
    assert_eq!(month.len(), 2);
    assert_eq!(
        month.get(&parse_day("2025-10-25").unwrap()),
        Some(&vec!["Vacation".to_string()])
    );
    assert_eq!(
        month.get(&parse_day("2025-10-26").unwrap()),
        Some(&vec!["Vacation".to_string()])
    );

    // Deleting the tag afterward empties both days
    service.delete_tag(tag.id).unwrap();
    assert!(service.tagged_days_in_month(2025, 10).unwrap().is_empty());
    assert!(service.tags_for_day("2025-10-25").unwrap().is_empty());
    assert!(service.tags_for_day("2025-10-26").unwrap().is_empty());
}

#[test]
fn reused_names_resolve_to_one_tag_with_first_seen_casing() {
    let service = service();

    let first = service.create_or_get_tag("Vacation", None).unwrap();
    for name in ["VACATION", "vacation", " Vacation "] {
        let again = service.create_or_get_tag(name, None).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.display_name, "Vacation");
    }

    assert_eq!(service.list_tags().unwrap().len(), 1);
}

#[test]
fn usage_counts_survive_a_full_lifecycle() {
    let service = service();

    let vacation = service.create_or_get_tag("Vacation", None).unwrap();
    let flare = service.create_or_get_tag("Flare", None).unwrap();

    for day in ["2025-10-01", "2025-10-02", "2025-10-03"] {
        service.add_tag_to_day(vacation.id, day).unwrap();
    }
    service.add_tag_to_day(flare.id, "2025-10-02").unwrap();
    service.remove_tag_from_day(vacation.id, "2025-10-02").unwrap();

    let tags = service.list_tags().unwrap();
    assert_eq!(tags[0].display_name, "Vacation");
    assert_eq!(tags[0].usage_count, 2);
    assert_eq!(tags[1].display_name, "Flare");
    assert_eq!(tags[1].usage_count, 1);

    // Removing the association that is not there is a no-op
    assert!(!service.remove_tag_from_day(vacation.id, "2025-10-02").unwrap());
    assert_eq!(service.tag_by_id(vacation.id).unwrap().unwrap().usage_count, 2);
}

#[test]
fn month_projection_tracks_mutations_after_invalidation() {
    let service = service();
    let tag = service.create_or_get_tag("Travel", None).unwrap();
    service.add_tag_to_day(tag.id, "2025-06-10").unwrap();

    let projector = MonthProjector::new(&service);
    let june = projector.month(2025, 6).unwrap();
    assert_eq!(june.days.len(), 1);
    assert_eq!(
        june.days.keys().map(|d| format_day(*d)).collect::<Vec<_>>(),
        vec!["2025-06-10"]
    );

    service.add_tag_to_day(tag.id, "2025-06-11").unwrap();
    projector.invalidate();
    assert_eq!(projector.month(2025, 6).unwrap().days.len(), 2);
}

#[test]
fn capacity_and_duplicates_are_reported_as_distinct_errors() {
    let service = service();
    let first = service.create_or_get_tag("tag-0", None).unwrap();
    service.add_tag_to_day(first.id, "2025-10-25").unwrap();

    assert!(matches!(
        service.add_tag_to_day(first.id, "2025-10-25"),
        Err(TagError::AlreadyTagged { .. })
    ));

    for i in 1..10 {
        let tag = service.create_or_get_tag(&format!("tag-{i}"), None).unwrap();
        service.add_tag_to_day(tag.id, "2025-10-25").unwrap();
    }
    let overflow = service.create_or_get_tag("tag-10", None).unwrap();
    assert!(matches!(
        service.add_tag_to_day(overflow.id, "2025-10-25"),
        Err(TagError::DayFull { .. })
    ));
}
