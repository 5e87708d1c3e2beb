//! Feature-tracking file commands.
//!
//! # Usage
//!
//! ```bash
//! # Mark the default set of features as passing
//! shop-smoke features mark
//!
//! # Mark specific features, failing if any is not in the file
//! shop-smoke features mark -d "User login with valid credentials" --strict
//!
//! # Show totals and the first 15 failing features
//! shop-smoke features status
//! ```
//!
//! The file is rewritten in place, pretty-printed. There is no backup and no
//! atomic rename.

use std::path::{Path, PathBuf};

use shop_smoke_core::{FeatureError, FeatureList, UpdateSummary};
use thiserror::Error;
use tracing::{debug, info};

use crate::report::Reporter;

/// Features marked as passing when no description is given.
pub const DEFAULT_TARGETS: [&str; 4] = [
    "Frontend server starts successfully on specified port",
    "User registration with email and password works",
    "User login with valid credentials",
    "Product listing page displays all products in grid view",
];

/// Default number of failing features listed by `status`.
pub const DEFAULT_STATUS_LIMIT: usize = 15;

/// Errors that can occur while working on the feature file.
#[derive(Debug, Error)]
pub enum FeatureFileError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid feature list.
    #[error("{}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: FeatureError,
    },

    /// Strict mode: some target descriptions are not in the file.
    #[error("Features not found: {}", .0.join("; "))]
    MissingTargets(Vec<String>),
}

/// Load and validate the feature file at `path`.
///
/// # Errors
///
/// Returns `FeatureFileError::Read` or `FeatureFileError::Invalid`.
pub async fn load(path: &Path) -> Result<FeatureList, FeatureFileError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FeatureFileError::Read {
            path: path.to_owned(),
            source,
        })?;

    let list = FeatureList::from_json(&text).map_err(|source| FeatureFileError::Invalid {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), records = list.len(), "Loaded feature file");
    Ok(list)
}

/// Mark `targets` as passing and rewrite the file.
///
/// Zero matches is not an error unless `strict` is set, in which case the
/// file is left untouched when any target is missing.
///
/// # Errors
///
/// Returns `FeatureFileError` if the file cannot be read, parsed or written,
/// or, with `strict`, if a target is missing.
pub async fn mark<R: Reporter>(
    path: &Path,
    targets: &[&str],
    strict: bool,
    out: &mut R,
) -> Result<UpdateSummary, FeatureFileError> {
    let mut list = load(path).await?;

    if strict {
        let missing = list.missing(targets);
        if !missing.is_empty() {
            for description in &missing {
                out.fail(&format!("Feature not found: \"{description}\""));
            }
            return Err(FeatureFileError::MissingTargets(
                missing.into_iter().map(str::to_owned).collect(),
            ));
        }
    }

    let summary = list.mark_passing(targets);
    let text = list
        .to_pretty_json()
        .map_err(|source| FeatureFileError::Invalid {
            path: path.to_owned(),
            source,
        })?;
    tokio::fs::write(path, text)
        .await
        .map_err(|source| FeatureFileError::Write {
            path: path.to_owned(),
            source,
        })?;

    info!(
        path = %path.display(),
        matched = summary.matched.len(),
        newly_passing = summary.newly_passing,
        "Feature file updated"
    );

    for description in &summary.matched {
        out.line(format!("Updated: {description}"));
    }
    out.section(&format!("Updated {} tests to passing", summary.matched.len()));
    out.line(format!("Total passing tests: {}", summary.passing));
    out.line(format!("Total failing tests: {}", summary.failing));

    Ok(summary)
}

/// Print pass/fail totals and the first `limit` failing features.
///
/// # Errors
///
/// Returns `FeatureFileError` if the file cannot be read or parsed.
pub async fn status<R: Reporter>(
    path: &Path,
    limit: usize,
    out: &mut R,
) -> Result<(), FeatureFileError> {
    let list = load(path).await?;

    out.line("=== HIGHEST PRIORITY FAILING TESTS ===".to_owned());
    out.line(format!("Total passing: {}", list.passing()));
    out.line(format!("Total failing: {}", list.failing()));

    if list.failing() > 0 {
        out.section(&format!("Top {limit} failing tests:"));
        for (rank, record) in list.failing_records().take(limit).enumerate() {
            out.line(format!("{}. {}", rank + 1, record.description()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::report::MemoryReporter;

    const FIXTURE: &str = r#"[
  {"description": "User login with valid credentials", "passes": false},
  {"description": "Shopping cart persists across sessions", "passes": false},
  {"description": "Frontend server starts successfully on specified port", "passes": true}
]"#;

    fn fixture_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_mark_defaults_rewrites_file() {
        let file = fixture_file();
        let mut out = MemoryReporter::new();

        let summary = mark(file.path(), &DEFAULT_TARGETS, false, &mut out)
            .await
            .unwrap();

        assert_eq!(summary.matched.len(), 2);
        assert_eq!(summary.newly_passing, 1);
        assert!(out.contains("Updated: User login with valid credentials"));
        assert!(out.contains("Total passing tests: 2"));
        assert!(out.contains("Total failing tests: 1"));

        let reloaded = load(file.path()).await.unwrap();
        assert!(reloaded.records()[0].passes());
        assert!(!reloaded.records()[1].passes());
    }

    #[tokio::test]
    async fn test_strict_mode_leaves_file_untouched() {
        let file = fixture_file();
        let mut out = MemoryReporter::new();

        let err = mark(file.path(), &["No such feature"], true, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, FeatureFileError::MissingTargets(ref m) if m.len() == 1));
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), FIXTURE);
    }

    #[tokio::test]
    async fn test_status_lists_failing() {
        let file = fixture_file();
        let mut out = MemoryReporter::new();

        status(file.path(), 1, &mut out).await.unwrap();

        assert!(out.contains("Total failing: 2"));
        assert!(out.contains("1. User login with valid credentials"));
        assert!(!out.contains("2. Shopping cart persists across sessions"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("feature_list.json")).await.unwrap_err();
        assert!(matches!(err, FeatureFileError::Read { .. }));
    }
}
