//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the anonymizer using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Data Anonymizer - regex driven record anonymization
#[derive(Parser, Debug)]
#[command(name = "data-anonymizer")]
#[command(version, about, long_about = None)]
#[command(author = "Data Anonymizer Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "anonymizer.toml", env = "ANONYMIZER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ANONYMIZER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize the configured data file
    Run(commands::run::RunArgs),

    /// Validate configuration file, patterns and replacement sources
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
