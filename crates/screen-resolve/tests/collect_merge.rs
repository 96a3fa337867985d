mod common;

use common::{MockProvider, make_file, make_screen, make_sheet, write_index};
use screen_core::error::{ResolveError, StoreError};
use screen_core::storage;
use screen_resolve::{CollectEvent, CollectOptions, Collector};
use screen_tree::TreeClient;
use screen_tree::extract::ExtractOptions;
use std::time::Duration;
use tempfile::TempDir;

fn make_options(projects: &[&str]) -> CollectOptions {
    CollectOptions {
        projects: projects.iter().map(|p| p.to_string()).collect(),
        depth: 8,
        allow_empty_overwrite: false,
        pacing: Duration::ZERO,
    }
}

fn make_extract() -> ExtractOptions {
    ExtractOptions {
        depth_cap: 64,
        excluded_texts: vec!["CONTRABASS".to_string()],
    }
}

fn two_version_remote() -> MockProvider {
    MockProvider::default()
        .with_project("p1", "CONTRABASS")
        .with_file(
            "p1",
            "file-305",
            "CONTRABASS 3.0.5",
            make_file(vec![make_sheet(
                "1:1",
                "CONT-01_01_01",
                "User Management",
                "Create, edit and delete user accounts",
            )]),
        )
        .with_file(
            "p1",
            "file-306",
            "CONTRABASS 3.0.6",
            make_file(vec![
                make_sheet(
                    "1:1",
                    "CONT-01_01_01",
                    "User Management",
                    "Create, edit and delete user accounts",
                ),
                make_sheet(
                    "5:54",
                    "CONT-05_04_54",
                    "Alert Policy Settings",
                    "Configure alert thresholds per cluster and node group",
                ),
            ]),
        )
        .with_file("p1", "file-notes", "Meeting notes", make_file(Vec::new()))
}

#[test]
fn test_collection_builds_a_fresh_index() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data").join("screen-index.json");
    let client = TreeClient::new(two_version_remote());
    let options = make_options(&["CONTRABASS"]);
    let extract = make_extract();

    let mut events = Vec::new();
    let report = Collector::new(&client, &options, &extract)
        .run(&path, &mut |event| events.push(event))
        .unwrap();

    assert!(report.saved);
    assert_eq!(report.backup, None);
    assert_eq!(report.collected_projects, vec!["CONTRABASS"]);
    assert_eq!(report.merge.updated_versions, 2);
    assert_eq!(report.total_screens, 3);
    assert!(events.contains(&CollectEvent::FileSkipped {
        file_name: "Meeting notes".to_string()
    }));

    let stored = storage::load(&path).unwrap();
    let stats = stored.stats();
    assert_eq!(stats.total_screens, 3);
    assert_eq!(
        stats.projects[0].versions,
        vec![("3.0.6".to_string(), 2), ("3.0.5".to_string(), 1)]
    );
    let alert = stored
        .find_screen("CONTRABASS", "3.0.6", "CONT-05_04_54")
        .unwrap();
    assert_eq!(alert.page_title, "Alert Policy Settings");
    assert!(!alert.needs_enrichment());
}

#[test]
fn test_empty_version_keeps_previous_screens() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("screen-index.json");
    write_index(
        &path,
        vec![
            make_screen("CONTRABASS", "3.0.4", "CONT-09_00_01", "Legacy Page", "Only in an old release", "9:1"),
            make_screen("CONTRABASS", "3.0.5", "CONT-02_00_01", "Old Layout", "Previously collected screen", "2:1"),
        ],
    );

    let remote = MockProvider::default()
        .with_project("p1", "CONTRABASS")
        .with_file("p1", "file-305", "CONTRABASS 3.0.5", make_file(Vec::new()));
    let client = TreeClient::new(remote);
    let options = make_options(&["CONTRABASS"]);
    let extract = make_extract();

    let report = Collector::new(&client, &options, &extract)
        .run(&path, &mut |_| {})
        .unwrap();
    assert_eq!(report.merge.preserved_versions, 1);
    assert_eq!(report.merge.updated_versions, 0);
    assert_eq!(report.backup, Some(storage::backup_path(&path)));
    assert!(storage::backup_path(&path).exists());

    let stored = storage::load(&path).unwrap();
    assert!(stored.find_screen("CONTRABASS", "3.0.5", "CONT-02_00_01").is_some());
    assert!(stored.find_screen("CONTRABASS", "3.0.4", "CONT-09_00_01").is_some());
    assert_eq!(stored.total_screens, 2);
}

#[test]
fn test_empty_version_overwrite_when_allowed() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("screen-index.json");
    write_index(
        &path,
        vec![make_screen("CONTRABASS", "3.0.5", "CONT-02_00_01", "Old Layout", "Previously collected screen", "2:1")],
    );

    let remote = MockProvider::default()
        .with_project("p1", "CONTRABASS")
        .with_file("p1", "file-305", "CONTRABASS 3.0.5", make_file(Vec::new()));
    let client = TreeClient::new(remote);
    let mut options = make_options(&["CONTRABASS"]);
    options.allow_empty_overwrite = true;
    let extract = make_extract();

    let report = Collector::new(&client, &options, &extract)
        .run(&path, &mut |_| {})
        .unwrap();
    assert_eq!(report.merge.updated_versions, 1);
    assert_eq!(report.total_screens, 0);
}

#[test]
fn test_failed_file_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("screen-index.json");
    let client = TreeClient::new(two_version_remote().failing("file-305"));
    let options = make_options(&["CONTRABASS"]);
    let extract = make_extract();

    let mut events = Vec::new();
    let report = Collector::new(&client, &options, &extract)
        .run(&path, &mut |event| events.push(event))
        .unwrap();
    assert_eq!(report.total_screens, 2);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, CollectEvent::FileFailed { file_name, .. } if file_name == "CONTRABASS 3.0.5"))
    );
}

#[test]
fn test_unknown_project_leaves_index_untouched() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("screen-index.json");
    let client = TreeClient::new(two_version_remote());
    let options = make_options(&["VIOLA"]);
    let extract = make_extract();

    let report = Collector::new(&client, &options, &extract)
        .run(&path, &mut |_| {})
        .unwrap();
    assert!(!report.saved);
    assert_eq!(report.failed_projects, vec!["VIOLA"]);
    assert!(!path.exists());
}

#[test]
fn test_unreadable_index_is_not_replaced() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("screen-index.json");
    std::fs::write(&path, "{ not json").unwrap();
    let client = TreeClient::new(two_version_remote());
    let options = make_options(&["CONTRABASS"]);
    let extract = make_extract();

    let err = Collector::new(&client, &options, &extract)
        .run(&path, &mut |_| {})
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Storage(StoreError::Parse { .. })
    ));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}
