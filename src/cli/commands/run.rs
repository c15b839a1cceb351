//! Run command implementation
//!
//! This module implements the `run` command which anonymizes the configured
//! data file into the output file.

use crate::config::{parse_config_file, AnonymizerConfig};
use crate::core::run::{ErrorPolicy, RunCoordinator};
use crate::domain::AnonymizerError;
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Failures listed individually in the printed summary
const MAX_PRINTED_ERRORS: usize = 10;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the data file to anonymize
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Override the output file
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Override the synthetic pool size
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Override the pool generation seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also replace groups that captured nothing
    #[arg(long)]
    pub replace_empty: bool,

    /// Seed per-record randomness for reproducible output
    #[arg(long)]
    pub record_seed: Option<u64>,

    /// Suffix appended to anonymized column names
    #[arg(long)]
    pub column_suffix: Option<String>,

    /// Override the number of records anonymized concurrently
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Override the batch size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override the failure policy (skip or halt)
    #[arg(long, value_name = "POLICY")]
    pub on_error: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match parse_config_file(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Invalid command line override");
            eprintln!("{e}");
            return Ok(2);
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        tracing::info!("Creating run coordinator");
        let coordinator = match RunCoordinator::new(config, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create run coordinator");
                eprintln!("Failed to initialize run: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting anonymization...");
        println!();

        let summary = match coordinator.execute_run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary();

        println!();
        println!("📊 Run Summary:");
        println!("  Run ID: {}", summary.run_id);
        println!("  Records Read: {}", summary.records_read);
        println!("  Anonymized: {}", summary.records_anonymized);
        println!("  Failed: {}", summary.records_failed);
        println!("  Substitutions: {}", summary.total_substitutions());
        for (group, count) in &summary.substitutions {
            println!("    {group}: {count}");
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Records not anonymized:");
            for error in summary.errors.iter().take(MAX_PRINTED_ERRORS) {
                println!("  - {}", error.message);
            }
            if summary.errors.len() > MAX_PRINTED_ERRORS {
                println!(
                    "  ... and {} more failures",
                    summary.errors.len() - MAX_PRINTED_ERRORS
                );
            }
            println!();
        }

        if let Some(report) = &self.report {
            match summary.write_json(report) {
                Ok(()) => println!("📄 Report written to {}", report.display()),
                Err(e) => {
                    tracing::error!(error = %e, path = %report.display(), "Failed to write report");
                    eprintln!("Failed to write report: {e}");
                    return Ok(5);
                }
            }
        }

        let exit_code = if summary.interrupted {
            println!();
            println!("⚠️  Run interrupted gracefully. The output holds every finished batch.");
            println!();
            tracing::info!("Run interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Run completed successfully!");
            0
        } else if summary.halted {
            println!("⚠️  Run halted at the first failed record");
            1
        } else {
            println!("⚠️  Run completed with failures");
            1 // Partial success
        };

        Ok(exit_code)
    }

    /// Apply command line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut AnonymizerConfig) -> Result<(), AnonymizerError> {
        if let Some(path) = &self.data_file {
            tracing::info!(data_file = %path.display(), "Overriding data file from CLI");
            config.input.data_file = path.clone();
        }
        if let Some(path) = &self.output_file {
            tracing::info!(output_file = %path.display(), "Overriding output file from CLI");
            config.input.output_file = path.clone();
        }
        if let Some(size) = self.pool_size {
            config.anonymization.pool_size = size;
        }
        if let Some(seed) = self.seed {
            config.anonymization.seed = seed;
        }
        if self.replace_empty {
            config.anonymization.replace_empty = true;
        }
        if let Some(seed) = self.record_seed {
            config.anonymization.record_seed = Some(seed);
        }
        if let Some(suffix) = &self.column_suffix {
            config.anonymization.column_suffix = Some(suffix.clone());
        }
        if let Some(parallelism) = self.parallelism {
            config.processing.parallelism = parallelism;
        }
        if let Some(size) = self.batch_size {
            config.processing.batch_size = size;
        }
        if let Some(policy) = &self.on_error {
            config.processing.on_error = policy.parse::<ErrorPolicy>()?;
        }
        Ok(())
    }
}

/// Configuration and replacement source problems exit with 2, everything
/// else is fatal
fn exit_code_for(error: &AnonymizerError) -> i32 {
    match error {
        AnonymizerError::Configuration(_) | AnonymizerError::Pool(_) => 2,
        _ => 5,
    }
}
