//! Core run logic.
//!
//! # Modules
//!
//! - [`run`] - Run coordination, batch processing and summaries
//!
//! # Run Workflow
//!
//! 1. **Build**: Compile field patterns and build replacement pools once
//! 2. **Read**: Stream the data file in batches
//! 3. **Anonymize**: Process each batch in parallel, one row cache per record
//! 4. **Write**: Append anonymized records to the output in input order
//! 5. **Report**: Produce a run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use data_anonymizer::config::load_config;
//! use data_anonymizer::core::run::RunCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = RunCoordinator::new(config, shutdown_rx)?;
//!
//! let summary = coordinator.execute_run().await?;
//! println!("Anonymized: {}", summary.records_anonymized);
//! println!("Failed: {}", summary.records_failed);
//! # Ok(())
//! # }
//! ```

pub mod run;
