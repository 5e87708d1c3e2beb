//! Integration tests for the feature-tracking file commands.

use std::path::Path;

use shop_smoke_cli::commands::features::{self, DEFAULT_TARGETS, FeatureFileError};
use shop_smoke_cli::report::MemoryReporter;
use shop_smoke_core::FeatureList;
use tempfile::TempDir;

const FEATURE_LIST: &str = r#"[
  {
    "category": "functional",
    "description": "Frontend server starts successfully on specified port",
    "steps": [
      "Start the dev server",
      "Open the home page"
    ],
    "passes": false
  },
  {
    "category": "functional",
    "description": "User login with valid credentials",
    "steps": [
      "Open the login page",
      "Submit valid credentials"
    ],
    "passes": false
  },
  {
    "category": "style",
    "description": "Footer links are visible on mobile",
    "steps": [],
    "passes": false
  },
  {
    "category": "functional",
    "description": "Product listing page displays all products in grid view",
    "steps": [],
    "passes": true
  }
]"#;

fn write_fixture(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("feature_list.json");
    std::fs::write(&path, content).expect("write fixture");
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read feature file")
}

#[tokio::test]
async fn test_mark_updates_only_matching_records() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, FEATURE_LIST);
    let before = FeatureList::from_json(FEATURE_LIST).expect("fixture parses");
    let mut out = MemoryReporter::new();

    let summary = features::mark(&path, &DEFAULT_TARGETS, false, &mut out)
        .await
        .expect("mark should succeed");

    assert_eq!(
        summary.matched,
        [
            "Frontend server starts successfully on specified port",
            "User login with valid credentials",
            "Product listing page displays all products in grid view",
        ]
    );
    assert_eq!(summary.newly_passing, 2);
    assert_eq!(summary.passing, 3);
    assert_eq!(summary.failing, 1);
    assert!(out.contains("Updated 3 tests to passing"));

    let after = FeatureList::from_json(&read(&path)).expect("rewritten file parses");
    assert_eq!(after.len(), before.len());
    for (old, new) in before.records().iter().zip(after.records()) {
        assert_eq!(old.description(), new.description());
        assert_eq!(old.get("steps"), new.get("steps"));
        assert_eq!(old.get("category"), new.get("category"));
        let matched = DEFAULT_TARGETS.contains(&old.description());
        assert_eq!(new.passes(), matched || old.passes());
    }
}

#[tokio::test]
async fn test_login_record_scenario() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(
        &dir,
        r#"[{"description":"User login with valid credentials","passes":false},{"description":"Other","passes":false}]"#,
    );
    let mut out = MemoryReporter::new();

    features::mark(&path, &DEFAULT_TARGETS, false, &mut out)
        .await
        .expect("mark should succeed");

    let list = FeatureList::from_json(&read(&path)).expect("parses");
    let records = list.records();
    assert_eq!(records.len(), 2);
    assert!(records.first().is_some_and(|r| r.passes()));
    assert!(records.get(1).is_some_and(|r| r.description() == "Other" && !r.passes()));
}

#[tokio::test]
async fn test_mark_twice_equals_mark_once() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, FEATURE_LIST);
    let mut out = MemoryReporter::new();

    features::mark(&path, &DEFAULT_TARGETS, false, &mut out)
        .await
        .expect("first run");
    let once = read(&path);

    let second = features::mark(&path, &DEFAULT_TARGETS, false, &mut out)
        .await
        .expect("second run");
    let twice = read(&path);

    assert_eq!(once, twice);
    assert_eq!(second.newly_passing, 0);
}

#[tokio::test]
async fn test_rewrite_preserves_layout() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, FEATURE_LIST);
    let mut out = MemoryReporter::new();

    features::mark(&path, &["Footer links are visible on mobile"], false, &mut out)
        .await
        .expect("mark should succeed");

    let expected = FEATURE_LIST.replacen(
        "\"steps\": [],\n    \"passes\": false",
        "\"steps\": [],\n    \"passes\": true",
        1,
    );
    assert_eq!(read(&path), expected);
}

#[tokio::test]
async fn test_no_match_reports_zero() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, FEATURE_LIST);
    let mut out = MemoryReporter::new();

    let summary = features::mark(&path, &["Does not exist"], false, &mut out)
        .await
        .expect("zero matches is not an error");

    assert!(summary.matched.is_empty());
    assert!(out.contains("Updated 0 tests to passing"));
    assert_eq!(read(&path), FEATURE_LIST);
}

#[tokio::test]
async fn test_invalid_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_fixture(&dir, r#"{"features": []}"#);
    let mut out = MemoryReporter::new();

    let err = features::mark(&path, &DEFAULT_TARGETS, false, &mut out)
        .await
        .expect_err("object document must fail");

    assert!(matches!(err, FeatureFileError::Invalid { .. }));
    assert_eq!(read(&path), r#"{"features": []}"#);
}
