//! Run coordinator - main orchestrator for an anonymization run
//!
//! Builds the engine once, streams the data file through the batch
//! processor in chunks and writes the surviving records to the output file.

use crate::adapters::csv::{CsvSink, CsvSource};
use crate::anonymization::AnonymizationEngine;
use crate::config::{build_patterns, build_pools, AnonymizerConfig};
use crate::core::run::batch::{BatchConfig, BatchProcessor};
use crate::core::run::summary::RunSummary;
use crate::domain::{AnonymizerError, Record, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Run coordinator
pub struct RunCoordinator {
    config: AnonymizerConfig,
    processor: BatchProcessor,
    shutdown_signal: watch::Receiver<bool>,
}

impl RunCoordinator {
    /// Create a new run coordinator
    ///
    /// Compiles the field patterns and builds the replacement pools; both
    /// stay fixed for the whole run.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid patterns and a pool error
    /// for replacement sources that cannot be loaded.
    pub fn new(config: AnonymizerConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let patterns = build_patterns(&config)?;
        let pools = build_pools(&config)?;

        tracing::info!(
            fields = patterns.len(),
            pools = pools.len(),
            pool_size = config.anonymization.pool_size,
            "Anonymization engine ready"
        );

        let engine = AnonymizationEngine::new(patterns, &pools, config.anonymization.clone())?;
        Ok(Self::with_engine(config, Arc::new(engine), shutdown_signal))
    }

    /// Create a coordinator around an already built engine
    pub fn with_engine(
        config: AnonymizerConfig,
        engine: Arc<AnonymizationEngine>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        let batch_config =
            BatchConfig::new(config.processing.parallelism, config.processing.on_error);
        Self {
            processor: BatchProcessor::new(engine, batch_config),
            config,
            shutdown_signal,
        }
    }

    /// Shared engine
    pub fn engine(&self) -> &Arc<AnonymizationEngine> {
        self.processor.engine()
    }

    /// Execute the run
    ///
    /// This is the main entry point. It:
    /// 1. Opens the data file and checks every mapped column exists
    /// 2. Creates the output file with the (suffixed) header
    /// 3. Reads, anonymizes and writes records batch by batch
    /// 4. Stops submitting new batches once a shutdown is signalled
    /// 5. Returns the run summary
    pub async fn execute_run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new();
        let input = &self.config.input;
        let delimiter = input.delimiter_byte()?;

        let mut source = CsvSource::open(&input.data_file, delimiter)?;
        self.check_columns(source.headers())?;

        let output_headers = self.output_headers(source.headers());
        let mut sink = CsvSink::create(&input.output_file, delimiter, &output_headers)?;

        crate::log_run_start!(
            input.data_file.display(),
            input.output_file.display(),
            self.engine().patterns().len()
        );

        let batch_size = self.config.processing.batch_size;
        let mut batch_number: u64 = 0;

        loop {
            if *self.shutdown_signal.borrow() {
                tracing::warn!(
                    records_read = summary.records_read,
                    "Shutdown signal received, no further records will be processed"
                );
                summary.interrupted = true;
                break;
            }

            let chunk = source.next_chunk(batch_size)?;
            if chunk.is_empty() {
                break;
            }

            let first_index = summary.records_read;
            summary.records_read += chunk.len() as u64;
            let indexed: Vec<(u64, Record)> = (first_index..).zip(chunk).collect();

            let batch = self.processor.process_batch(indexed).await?;
            for anonymized in &batch.records {
                sink.write_record(&anonymized.record)?;
            }
            summary.record_batch(&batch);

            batch_number += 1;
            crate::log_batch_progress!(batch_number, summary.records_read);

            if batch.halted {
                tracing::error!(batch = batch_number, "Run halted after record failure");
                break;
            }
        }

        sink.flush()?;

        let summary = summary.with_duration(start_time.elapsed());
        crate::log_run_complete!(
            summary.records_anonymized,
            summary.records_failed,
            summary.duration
        );

        Ok(summary)
    }

    fn check_columns(&self, headers: &[String]) -> Result<()> {
        let missing: Vec<&str> = self
            .config
            .field_mapping
            .fields()
            .filter(|field| !headers.iter().any(|h| h == field))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(AnonymizerError::Configuration(format!(
            "Data file {} has no column for mapped field(s): {}",
            self.config.input.data_file.display(),
            missing.join(", ")
        )))
    }

    /// Header row for the output, with the column suffix applied to every
    /// anonymized column
    fn output_headers(&self, headers: &[String]) -> Vec<String> {
        let Some(suffix) = &self.config.anonymization.column_suffix else {
            return headers.to_vec();
        };

        let patterns = self.engine().patterns();
        headers
            .iter()
            .map(|header| {
                if patterns.get(header).is_some() {
                    format!("{header}{suffix}")
                } else {
                    header.clone()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldMapping, InputConfig, ReplacementValue};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config(dir: &TempDir, data: &str) -> AnonymizerConfig {
        let data_file = dir.path().join("data.csv");
        std::fs::write(&data_file, data).unwrap();

        let mut regex_patterns = HashMap::new();
        regex_patterns.insert("name".to_string(), r"(?P<fname>\w+) (?P<lname>\w+)".to_string());

        AnonymizerConfig {
            application: Default::default(),
            input: InputConfig {
                data_file,
                output_file: dir.path().join("out.csv"),
                delimiter: ",".to_string(),
            },
            anonymization: Default::default(),
            processing: Default::default(),
            regex_patterns,
            field_mapping: [("name", "name")].into_iter().collect::<FieldMapping>(),
            replacement_values: HashMap::new(),
            logging: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_missing_column_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "full_name,age\nJane Doe,30\n");
        let (_tx, rx) = watch::channel(false);

        let coordinator = RunCoordinator::new(config, rx).unwrap();
        let err = coordinator.execute_run().await.unwrap_err();

        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn test_column_suffix_applied_to_mapped_columns_only() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "name,age\nJane Doe,30\n");
        config.anonymization.column_suffix = Some("_anon".to_string());
        config.anonymization.pool_size = 20;
        config
            .replacement_values
            .insert("fname".to_string(), ReplacementValue::List(vec!["Ann".into()]));
        config
            .replacement_values
            .insert("lnames".to_string(), ReplacementValue::Text("[Lee]".into()));
        let output = config.input.output_file.clone();
        let (_tx, rx) = watch::channel(false);

        let summary = RunCoordinator::new(config, rx)
            .unwrap()
            .execute_run()
            .await
            .unwrap();

        assert_eq!(summary.records_anonymized, 1);
        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(written, "name_anon,age\nAnn Lee,30\n");
    }

    #[tokio::test]
    async fn test_repeated_header_columns_are_kept() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "name,note,note\nJane Doe,a,b\n");
        config.anonymization.pool_size = 20;
        config
            .replacement_values
            .insert("fname".to_string(), ReplacementValue::List(vec!["Ann".into()]));
        config
            .replacement_values
            .insert("lname".to_string(), ReplacementValue::List(vec!["Lee".into()]));
        let output = config.input.output_file.clone();
        let (_tx, rx) = watch::channel(false);

        let summary = RunCoordinator::new(config, rx)
            .unwrap()
            .execute_run()
            .await
            .unwrap();

        assert_eq!(summary.records_anonymized, 1);
        let written = std::fs::read_to_string(output).unwrap();
        assert_eq!(written, "name,note,note\nAnn Lee,a,b\n");
    }

    #[tokio::test]
    async fn test_shutdown_before_start_processes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "name\nJane Doe\nJohn Roe\n");
        config.anonymization.pool_size = 20;
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let summary = RunCoordinator::new(config, rx)
            .unwrap()
            .execute_run()
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.records_read, 0);
    }
}
