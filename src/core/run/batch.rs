//! Batch processing of records
//!
//! Records of a batch are anonymized in parallel on tokio's blocking pool,
//! each with its own row cache and random source. Results come back in input
//! order.

use crate::anonymization::{AnonymizationEngine, AnonymizedRecord};
use crate::domain::{AnonymizerError, Record, RecordError, Result};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// What happens to a record that cannot be anonymized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Drop the record from the output and continue
    #[default]
    Skip,
    /// Stop processing at the first failed record
    Halt,
}

impl FromStr for ErrorPolicy {
    type Err = AnonymizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "halt" => Ok(Self::Halt),
            _ => Err(AnonymizerError::Configuration(format!(
                "Invalid on_error policy '{s}'. Must be one of: skip, halt"
            ))),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Halt => f.write_str("halt"),
        }
    }
}

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Records in flight at once
    pub parallelism: usize,
    /// Failure handling
    pub on_error: ErrorPolicy,
}

impl BatchConfig {
    /// Create a new batch configuration
    pub fn new(parallelism: usize, on_error: ErrorPolicy) -> Self {
        Self {
            parallelism: parallelism.max(1),
            on_error,
        }
    }
}

/// Result of processing a batch
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Anonymized records, in input order
    pub records: Vec<AnonymizedRecord>,
    /// Number of records successfully anonymized
    pub successful: usize,
    /// Number of records that failed
    pub failed: usize,
    /// Errors encountered
    pub errors: Vec<RecordError>,
    /// Processing stopped early under [`ErrorPolicy::Halt`]
    pub halted: bool,
}

impl BatchResult {
    /// Create a new empty batch result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an anonymized record
    pub fn add_success(&mut self, record: AnonymizedRecord) {
        self.successful += 1;
        self.records.push(record);
    }

    /// Add a failed record
    pub fn add_failure(&mut self, error: RecordError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Merge another batch result into this one
    pub fn merge(&mut self, other: BatchResult) {
        self.successful += other.successful;
        self.failed += other.failed;
        self.records.extend(other.records);
        self.errors.extend(other.errors);
        self.halted |= other.halted;
    }
}

/// Batch processor for records
pub struct BatchProcessor {
    engine: Arc<AnonymizationEngine>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(engine: Arc<AnonymizationEngine>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    /// Shared engine
    pub fn engine(&self) -> &Arc<AnonymizationEngine> {
        &self.engine
    }

    /// Process a batch of `(index, record)` pairs
    ///
    /// Failed records never appear in [`BatchResult::records`].
    ///
    /// # Errors
    ///
    /// Record failures are reported in the result; an error is returned only
    /// if a worker task itself fails.
    pub async fn process_batch(&self, records: Vec<(u64, Record)>) -> Result<BatchResult> {
        let mut result = BatchResult::new();

        if records.is_empty() {
            tracing::debug!("No records to process in batch");
            return Ok(result);
        }

        tracing::debug!(
            batch_size = records.len(),
            parallelism = self.config.parallelism,
            "Processing batch of records"
        );

        let engine = Arc::clone(&self.engine);
        let mut outcomes = stream::iter(records)
            .map(move |(index, record)| {
                let engine = Arc::clone(&engine);
                tokio::task::spawn_blocking(move || engine.anonymize_record_at(index, record))
            })
            .buffered(self.config.parallelism);

        while let Some(joined) = outcomes.next().await {
            let outcome = joined
                .map_err(|e| AnonymizerError::Other(format!("Anonymization worker failed: {e}")))?;

            match outcome {
                Ok(anonymized) => result.add_success(anonymized),
                Err(error) => {
                    crate::log_record_failure!(&error);
                    result.add_failure(error);

                    if self.config.on_error == ErrorPolicy::Halt {
                        tracing::warn!("Halting batch after record failure");
                        result.halted = true;
                        break;
                    }
                }
            }
        }

        Ok(result)
    }
}
