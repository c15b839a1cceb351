// Data Anonymizer - Regex driven record anonymization
// Copyright (c) 2025 Data Anonymizer Contributors
// Licensed under the MIT License

//! # Data Anonymizer
//!
//! Data Anonymizer rewrites the sensitive parts of delimited records with
//! synthetic values. Each configured field carries a regular expression with
//! named capture groups; the group name decides how the captured text is
//! replaced.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Matching** field values against patterns with named capture groups
//! - **Generating** replacement pools, synthetic or user-supplied
//! - **Resolving** each group by capability (`digits`, `chars`, `post_code`,
//!   `phone`) or from the pool of the same name
//! - **Keeping** replacements consistent within a record through a row cache
//! - **Running** whole files through the engine in parallel batches
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Run coordination, batch processing and summaries
//! - [`anonymization`] - Patterns, pools, resolvers and the row anonymizer
//! - [`adapters`] - Delimited file input and output
//! - [`domain`] - Records, errors and the result type
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use data_anonymizer::anonymization::{
//!     AnonymizationConfig, AnonymizationEngine, PatternRegistry, ReplacementPools,
//! };
//! use data_anonymizer::domain::Record;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let patterns = PatternRegistry::new([("name", r"(?P<fname>\w+) (?P<lname>\w+)")])?;
//! let pools = ReplacementPools::from_values([
//!     ("fname", vec!["Alex"]),
//!     ("lname", vec!["Smith"]),
//! ]);
//! let engine = AnonymizationEngine::new(patterns, &pools, AnonymizationConfig::default())?;
//!
//! let record = Record::new().with_field("name", "Jane Doe");
//! let anonymized = engine.anonymize_record(record, &mut rand::thread_rng())?;
//!
//! assert_eq!(anonymized.record.get("name"), Some("Alex Smith"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a file
//!
//! ```rust,no_run
//! use data_anonymizer::config::load_config;
//! use data_anonymizer::core::run::RunCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymizer.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let summary = RunCoordinator::new(config, shutdown_rx)?.execute_run().await?;
//! println!("Anonymized {} records", summary.records_anonymized);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Run-level failures use [`domain::AnonymizerError`]. A record that cannot be
//! anonymized yields a [`domain::RecordError`] naming the record, field and
//! group; the run decides whether to skip it or halt.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
