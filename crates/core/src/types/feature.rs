//! Feature records from the feature-tracking file.
//!
//! The file is a JSON array of objects, each with a unique `description` and
//! a boolean `passes`. Records may carry other keys (`category`, `steps`, ...);
//! those are kept verbatim and in their original order so that a rewrite
//! only ever changes `passes`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Errors that can occur when loading a feature list.
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    /// The document is not valid JSON.
    #[error("invalid feature file JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The top-level value is not an array.
    #[error("feature file must contain a JSON array of records")]
    NotAnArray,
    /// A record is malformed.
    #[error("feature record {index}: {reason}")]
    InvalidRecord {
        /// Zero-based position of the record in the file.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// A single feature record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    fields: Map<String, Value>,
}

impl FeatureRecord {
    fn from_value(index: usize, value: Value) -> Result<Self, FeatureError> {
        let Value::Object(fields) = value else {
            return Err(FeatureError::InvalidRecord {
                index,
                reason: "record is not an object",
            });
        };
        if !matches!(fields.get("description"), Some(Value::String(_))) {
            return Err(FeatureError::InvalidRecord {
                index,
                reason: "missing string `description`",
            });
        }
        if !matches!(fields.get("passes"), Some(Value::Bool(_))) {
            return Err(FeatureError::InvalidRecord {
                index,
                reason: "missing boolean `passes`",
            });
        }
        Ok(Self { fields })
    }

    /// The record's description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.fields
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Whether the feature is marked as passing.
    #[must_use]
    pub fn passes(&self) -> bool {
        self.fields
            .get("passes")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Look up any other key of the record.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Mark as passing. Returns `true` if the flag changed.
    ///
    /// The existing `passes` entry is overwritten in place so its position
    /// within the object is kept.
    fn mark_passing(&mut self) -> bool {
        let was_passing = self.passes();
        self.fields.insert("passes".to_owned(), Value::Bool(true));
        !was_passing
    }
}

/// Outcome of [`FeatureList::mark_passing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Descriptions of the records that matched a target, in file order.
    pub matched: Vec<String>,
    /// How many matched records were failing before the update.
    pub newly_passing: usize,
    /// Passing records after the update.
    pub passing: usize,
    /// Failing records after the update.
    pub failing: usize,
}

/// Ordered feature records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureList(Vec<FeatureRecord>);

impl FeatureList {
    /// Parse a feature list from the file's JSON text.
    ///
    /// # Errors
    ///
    /// Returns `FeatureError` if the text is not JSON, is not an array, or a
    /// record lacks a string `description` or boolean `passes`.
    pub fn from_json(text: &str) -> Result<Self, FeatureError> {
        let Value::Array(values) = serde_json::from_str(text)? else {
            return Err(FeatureError::NotAnArray);
        };
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| FeatureRecord::from_value(index, value))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Render the list with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `FeatureError::Json` if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, FeatureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The records in file order.
    #[must_use]
    pub fn records(&self) -> &[FeatureRecord] {
        &self.0
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of records marked as passing.
    #[must_use]
    pub fn passing(&self) -> usize {
        self.0.iter().filter(|r| r.passes()).count()
    }

    /// Number of records not marked as passing.
    #[must_use]
    pub fn failing(&self) -> usize {
        self.len() - self.passing()
    }

    /// Failing records in file order.
    pub fn failing_records(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.0.iter().filter(|r| !r.passes())
    }

    /// Targets that no record's description matches exactly.
    #[must_use]
    pub fn missing<'a>(&self, targets: &[&'a str]) -> Vec<&'a str> {
        targets
            .iter()
            .copied()
            .filter(|t| !self.0.iter().any(|r| r.description() == *t))
            .collect()
    }

    /// Set `passes = true` on every record whose description exactly matches
    /// one of `targets`. Other records are left untouched.
    pub fn mark_passing(&mut self, targets: &[&str]) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        for record in &mut self.0 {
            if targets.contains(&record.description()) {
                summary.matched.push(record.description().to_owned());
                if record.mark_passing() {
                    summary.newly_passing += 1;
                }
            }
        }
        summary.passing = self.passing();
        summary.failing = self.failing();
        summary
    }
}
