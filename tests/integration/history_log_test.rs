//! History log behaviour through the public API and the on-disk layout.

use restcli::history::{format_history_list, History, HistoryError, StoreOutcome, HEAD_FILE};
use std::fs;
use tempfile::TempDir;

fn entries() -> Vec<(&'static str, String, Option<String>)> {
    (1..=5)
        .map(|i| {
            let body = (i % 2 == 1).then(|| format!("{{\n    \"n\": {}\n}}", i));
            ("POST", format!("groups/{}", i), body)
        })
        .collect()
}

fn filled_log() -> (TempDir, History) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let history = History::open(temp_dir.path().join("history")).unwrap();
    for (method, resource, body) in entries() {
        let outcome = history.store(method, &resource, body.as_deref()).unwrap();
        assert!(matches!(outcome, StoreOutcome::Stored(_)));
    }
    (temp_dir, history)
}

#[test]
fn test_five_entries_newest_first() {
    let (_temp_dir, history) = filled_log();
    assert_eq!(history.last(), 5);

    let resources: Vec<String> = history.items(true).map(|e| e.resource).collect();
    assert_eq!(
        resources,
        vec!["groups/5", "groups/4", "groups/3", "groups/2", "groups/1"]
    );

    let newest = history.get(1).unwrap();
    assert_eq!(newest.resource, "groups/5");
    assert_eq!(newest.body.as_deref(), Some("{\n    \"n\": 5\n}"));
    assert_eq!(history.get(4).unwrap().body, None);
    assert_eq!(history.get(5).unwrap().resource, "groups/1");
    assert!(matches!(
        history.get(6),
        Err(HistoryError::NotFound { index: 6 })
    ));
}

#[test]
fn test_deleted_entry_truncates_walk_only() {
    let (_temp_dir, history) = filled_log();
    fs::remove_file(history.path().join("00003")).unwrap();

    let resources: Vec<String> = history.items(false).map(|e| e.resource).collect();
    assert_eq!(resources, vec!["groups/5", "groups/4"]);

    assert!(matches!(
        history.get(3),
        Err(HistoryError::NotFound { index: 3 })
    ));
    assert_eq!(history.get(4).unwrap().resource, "groups/2");
}

#[test]
fn test_on_disk_layout() {
    let (_temp_dir, history) = filled_log();
    assert_eq!(
        fs::read_to_string(history.path().join("00001")).unwrap(),
        "POST\ngroups/1\n{\n    \"n\": 1\n}\n"
    );
    assert_eq!(
        fs::read_to_string(history.path().join("00002")).unwrap(),
        "POST\ngroups/2\n"
    );
    assert_eq!(
        fs::read_to_string(history.path().join(HEAD_FILE)).unwrap(),
        "00005"
    );
}

#[test]
fn test_reads_existing_history_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path().join("history");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("00001"), "GET\nservers\n").unwrap();
    fs::write(dir.join("00002"), "POST\nservers\n{\"server\": {}}\n").unwrap();
    fs::write(dir.join(HEAD_FILE), "2\n").unwrap();

    let history = History::open(&dir).unwrap();
    assert_eq!(history.last(), 2);
    assert_eq!(
        history.get(1).unwrap().body.as_deref(),
        Some("{\"server\": {}}")
    );

    // the replayed request is identical to the newest entry
    assert_eq!(
        history
            .store("POST", "servers", Some("{\"server\": {}}"))
            .unwrap(),
        StoreOutcome::Duplicate
    );
    assert_eq!(
        history.store("GET", "servers", None).unwrap(),
        StoreOutcome::Stored(3)
    );
}

#[test]
fn test_lost_head_is_repaired() {
    let (_temp_dir, history) = filled_log();
    fs::remove_file(history.path().join(HEAD_FILE)).unwrap();
    assert_eq!(history.last(), 0);
    assert_eq!(history.items(false).count(), 0);

    assert_eq!(history.repair().unwrap(), 5);
    assert_eq!(history.items(false).count(), 5);
}

#[test]
fn test_listing_lines() {
    let (_temp_dir, history) = filled_log();
    let lines = format_history_list(history.items(false));
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "1     POST      groups/5");
    assert_eq!(lines[4], "5     POST      groups/1");
}
