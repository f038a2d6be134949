use chrono::{TimeZone, Utc};
use uiwalk_core::ReviewType;
use uiwalk_core::storage::{self, HistoryEntry};
use tempfile::TempDir;

fn entry(source: &str, minute: u32) -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
        source: source.to_string(),
        review_type: ReviewType::Standard,
        case_count: 16,
        module_count: 2,
        high_priority: 10,
        fallback_modules: 2,
        output_file: Some(format!("{source}-UI走查用例.csv")),
    }
}

#[test]
fn test_record_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    storage::record_history(root, entry("需求A", 0), 50).unwrap();
    assert!(storage::history_file(root).exists());

    let loaded = storage::load_history(root).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], entry("需求A", 0));
}

#[test]
fn test_history_is_newest_first() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    storage::record_history(root, entry("first", 0), 50).unwrap();
    storage::record_history(root, entry("second", 1), 50).unwrap();
    storage::record_history(root, entry("third", 2), 50).unwrap();

    let sources: Vec<_> = storage::load_history(root)
        .unwrap()
        .into_iter()
        .map(|e| e.source)
        .collect();
    assert_eq!(sources, vec!["third", "second", "first"]);
}

#[test]
fn test_history_is_truncated() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    for i in 0..5 {
        storage::record_history(root, entry(&format!("doc{i}"), i), 3).unwrap();
    }

    let loaded = storage::load_history(root).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].source, "doc4");
    assert_eq!(loaded[2].source, "doc2");
}

#[test]
fn test_competitive_review_type_persists() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let mut e = entry("竞品", 5);
    e.review_type = ReviewType::Competitive;
    e.output_file = None;
    storage::record_history(root, e, 50).unwrap();

    let raw = std::fs::read_to_string(storage::history_file(root)).unwrap();
    assert!(raw.contains("\"competitive\""));

    let loaded = storage::load_history(root).unwrap();
    assert_eq!(loaded[0].review_type, ReviewType::Competitive);
    assert_eq!(loaded[0].output_file, None);
}

#[test]
fn test_corrupt_history_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(storage::uiwalk_dir(root)).unwrap();
    std::fs::write(storage::history_file(root), "not json").unwrap();

    let err = storage::load_history(root).unwrap_err();
    assert!(err.to_string().contains("failed to parse history"));
}
