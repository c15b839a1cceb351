//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! an anonymization run.

use crate::core::run::batch::BatchResult;
use crate::domain::{RecordError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Summary of an anonymization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run identifier
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Records read from the input
    pub records_read: u64,

    /// Records written to the output
    pub records_anonymized: u64,

    /// Records dropped because they could not be anonymized
    pub records_failed: u64,

    /// Substitutions applied, per group name
    pub substitutions: BTreeMap<String, u64>,

    /// Wall-clock duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,

    /// Stopped early by a shutdown signal
    pub interrupted: bool,

    /// Stopped early by a record failure under the halt policy
    pub halted: bool,

    /// Record failures
    pub errors: Vec<RunError>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            records_read: 0,
            records_anonymized: 0,
            records_failed: 0,
            substitutions: BTreeMap::new(),
            duration: Duration::from_secs(0),
            interrupted: false,
            halted: false,
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Fold a processed batch into the totals
    pub fn record_batch(&mut self, batch: &BatchResult) {
        self.records_anonymized += batch.successful as u64;
        self.records_failed += batch.failed as u64;
        self.halted |= batch.halted;

        for record in &batch.records {
            for substitution in &record.substitutions {
                *self
                    .substitutions
                    .entry(substitution.group.clone())
                    .or_insert(0) += 1;
            }
        }

        self.errors.extend(batch.errors.iter().map(RunError::from));
    }

    /// Total substitutions across all groups
    pub fn total_substitutions(&self) -> u64 {
        self.substitutions.values().sum()
    }

    /// Check if the run was successful (no failures, not stopped early)
    pub fn is_successful(&self) -> bool {
        self.records_failed == 0 && !self.interrupted && !self.halted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let processed = self.records_anonymized + self.records_failed;
        if processed == 0 {
            return 100.0;
        }
        (self.records_anonymized as f64 / processed as f64) * 100.0
    }

    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            records_read = self.records_read,
            anonymized = self.records_anonymized,
            failed = self.records_failed,
            substitutions = self.total_substitutions(),
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Anonymization run summary"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Run completed with record failures"
            );
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Record failure as reported in a summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    /// Record position in the input
    pub record_index: Option<u64>,
    /// Field being processed
    pub field: String,
    /// Group being resolved
    pub group: Option<String>,
    /// Error message
    pub message: String,
}

impl From<&RecordError> for RunError {
    fn from(error: &RecordError) -> Self {
        Self {
            record_index: error.record_index,
            field: error.field.clone(),
            group: error.group.clone(),
            message: error.to_string(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::{AnonymizedRecord, Substitution};
    use crate::domain::{Record, RecordErrorKind};
    use tempfile::NamedTempFile;

    fn batch() -> BatchResult {
        let mut batch = BatchResult::new();
        batch.add_success(AnonymizedRecord {
            index: Some(0),
            record: Record::new(),
            substitutions: vec![
                Substitution {
                    field: "name".into(),
                    group: "fname".into(),
                    resolver: "pool".into(),
                },
                Substitution {
                    field: "bio".into(),
                    group: "fname".into(),
                    resolver: "pool".into(),
                },
                Substitution {
                    field: "phone".into(),
                    group: "phone".into(),
                    resolver: "phone".into(),
                },
            ],
        });
        batch.add_failure(
            RecordError::new(RecordErrorKind::UnresolvableGroup, "notes", r"(?P<pet>\w+)")
                .with_group("pet")
                .with_record_index(1),
        );
        batch
    }

    #[test]
    fn test_run_summary_creation() {
        let summary = RunSummary::new();
        assert_eq!(summary.records_read, 0);
        assert_eq!(summary.records_anonymized, 0);
        assert!(summary.errors.is_empty());
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_record_batch_totals() {
        let mut summary = RunSummary::new();
        summary.record_batch(&batch());

        assert_eq!(summary.records_anonymized, 1);
        assert_eq!(summary.records_failed, 1);
        assert_eq!(summary.substitutions.get("fname"), Some(&2));
        assert_eq!(summary.substitutions.get("phone"), Some(&1));
        assert_eq!(summary.total_substitutions(), 3);
        assert_eq!(summary.errors[0].group.as_deref(), Some("pet"));
        assert!(!summary.is_successful());
        assert_eq!(summary.success_rate(), 50.0);
    }

    #[test]
    fn test_interrupted_is_not_successful() {
        let mut summary = RunSummary::new();
        summary.interrupted = true;
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_write_json_report() {
        let mut summary = RunSummary::new().with_duration(Duration::from_millis(1500));
        summary.record_batch(&batch());

        let file = NamedTempFile::new().unwrap();
        summary.write_json(file.path()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(json["duration"], 1500);
        assert_eq!(json["records_failed"], 1);
        assert_eq!(json["substitutions"]["fname"], 2);
        assert_eq!(json["run_id"], summary.run_id.to_string());
    }
}
