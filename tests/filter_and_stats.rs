//! Filtering entries through day tags, reporting, and export.

use gutlog::{
    BowelMovement, Database, EntryService, FilterEngine, NoteDetails, StatsReporter, TagError,
    TagFilter, TagId, TagService,
};

/// Two tags over an October week:
///   2025-10-20  vacation
///   2025-10-21  vacation + new medicine
///   2025-10-22  new medicine
/// with one movement entry per tagged day and a note on the 21st.
fn fixture() -> TagService {
    let service = TagService::new(Database::in_memory().unwrap());

    let vacation = service.create_or_get_tag("Vacation", None).unwrap();
    let medicine = service.create_or_get_tag("New Medicine", None).unwrap();

    service.add_tag_to_day(vacation.id, "2025-10-20").unwrap();
    service.add_tag_to_day(vacation.id, "2025-10-21").unwrap();
    service.add_tag_to_day(medicine.id, "2025-10-21").unwrap();
    service.add_tag_to_day(medicine.id, "2025-10-22").unwrap();

    let entries = EntryService::new(service.database());
    let movement = |c, u| BowelMovement {
        consistency: c,
        urgency: u,
        notes: None,
    };
    entries.log_movement("2025-10-20", "08:00", movement(3, 1)).unwrap();
    entries.log_movement("2025-10-21", "09:30", movement(5, 2)).unwrap();
    entries.log_movement("2025-10-22", "07:45", movement(4, 3)).unwrap();
    // An untagged day: must never appear in filtered results
    entries.log_movement("2025-10-23", "08:15", movement(6, 4)).unwrap();
    entries
        .log_note(
            "2025-10-21",
            "12:00",
            NoteDetails {
                category: "diet".to_string(),
                content: "started the new course".to_string(),
                tags: None,
            },
        )
        .unwrap();

    service
}

#[test]
fn any_mode_unions_tagged_days() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let filter = TagFilter::any(vec!["vacation".to_string(), "new medicine".to_string()]);
    let matched = engine
        .entries_by_tags(&filter, "2025-10-01", "2025-10-31")
        .unwrap();

    // Three movements and one note across the three tagged days;
    // the untagged 23rd is excluded
    assert_eq!(matched.len(), 4);
    assert!(
        matched
            .iter()
            .all(|t| gutlog::models::date::format_day(t.entry.day) != "2025-10-23")
    );
}

#[test]
fn all_mode_keeps_only_days_with_every_tag() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let filter = TagFilter::all(vec!["Vacation".to_string(), "NEW MEDICINE".to_string()]);
    let matched = engine
        .entries_by_tags(&filter, "2025-10-01", "2025-10-31")
        .unwrap();

    // Only the 21st carries both tags: one movement and one note
    assert_eq!(matched.len(), 2);
    for tagged in &matched {
        assert_eq!(gutlog::models::date::format_day(tagged.entry.day), "2025-10-21");
    }
}

#[test]
fn results_are_newest_first_and_annotated_with_day_tags() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let filter = TagFilter::any(vec!["vacation".to_string(), "new medicine".to_string()]);
    let matched = engine
        .entries_by_tags(&filter, "2025-10-01", "2025-10-31")
        .unwrap();

    let timestamps: Vec<_> = matched.iter().map(|t| t.entry.timestamp).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "entries should be newest first");

    // Entries on the 21st inherit both of that day's tags, in display
    // name order
    let on_21st = matched
        .iter()
        .find(|t| gutlog::models::date::format_day(t.entry.day) == "2025-10-21")
        .unwrap();
    let names: Vec<&str> = on_21st.day_tags.iter().map(|t| t.display_name.as_str()).collect();
    assert_eq!(names, vec!["New Medicine", "Vacation"]);
}

#[test]
fn unknown_filter_tag_is_an_error_not_an_empty_result() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let filter = TagFilter::any(vec!["vacation".to_string(), "vaaction".to_string()]);
    let err = engine.entries_by_tags(&filter, "2025-10-01", "2025-10-31");

    match err {
        Err(TagError::UnknownTag(name)) => assert_eq!(name, "vaaction"),
        other => panic!("expected UnknownTag, got {other:?}"),
    }
}

#[test]
fn single_tag_query_matches_any_mode() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let by_one = engine
        .entries_by_tag("vacation", "2025-10-01", "2025-10-31")
        .unwrap();
    let by_filter = engine
        .entries_by_tags(
            &TagFilter::any(vec!["vacation".to_string()]),
            "2025-10-01",
            "2025-10-31",
        )
        .unwrap();

    assert_eq!(by_one, by_filter);
    assert_eq!(by_one.len(), 3);
}

#[test]
fn statistics_cover_counts_means_and_distributions() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let reporter = StatsReporter::new(&service, &entries);

    let medicine = service.tag_by_name("new medicine").unwrap().unwrap();
    let stats = reporter
        .statistics_for_tag(medicine.id)
        .unwrap()
        .expect("tag exists");

    // Days 21 and 22, one movement each (consistency 5 and 4, urgency 2
    // and 3); the note on the 21st is not a movement and does not count
    assert_eq!(stats.tagged_days, 2);
    assert_eq!(stats.movement_entries, 2);
    assert!((stats.entries_per_day - 1.0).abs() < f64::EPSILON);
    assert_eq!(stats.mean_consistency, Some(4.5));
    assert_eq!(stats.mean_urgency, Some(2.5));
    assert_eq!(stats.consistency_distribution.get(&5), Some(&1));
    assert_eq!(stats.consistency_distribution.get(&4), Some(&1));
    assert_eq!(stats.urgency_distribution.len(), 2);
    assert_eq!(stats.first_day.as_deref(), Some("2025-10-21"));
    assert_eq!(stats.last_day.as_deref(), Some("2025-10-22"));
}

#[test]
fn statistics_for_unused_tag_are_all_zero() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let reporter = StatsReporter::new(&service, &entries);

    let unused = service.create_or_get_tag("Unused", None).unwrap();
    let stats = reporter
        .statistics_for_tag(unused.id)
        .unwrap()
        .expect("tag exists");

    assert_eq!(stats.tagged_days, 0);
    assert_eq!(stats.movement_entries, 0);
    assert_eq!(stats.entries_per_day, 0.0);
    assert_eq!(stats.mean_consistency, None);
    assert!(stats.consistency_distribution.is_empty());
    assert_eq!(stats.first_day, None);
}

#[test]
fn statistics_for_unknown_tag_are_absent() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let reporter = StatsReporter::new(&service, &entries);

    assert!(reporter.statistics_for_tag(TagId::new(999)).unwrap().is_none());
}

#[test]
fn export_writes_the_filtered_document() {
    let service = fixture();
    let entries = EntryService::new(service.database());
    let engine = FilterEngine::new(&service, &entries);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let filter = TagFilter::all(vec!["vacation".to_string(), "new medicine".to_string()]);
    gutlog::export::write_json(&path, &engine, &filter, "2025-10-01", "2025-10-31").unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let document: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(document["start"], "2025-10-01");
    assert_eq!(document["filter"]["match_mode"], "all");
    let exported = document["entries"].as_array().unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0]["entry"]["day"], "2025-10-21");
    let names: Vec<&str> = exported[0]["day_tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["New Medicine", "Vacation"]);
}
