//! Validate config command implementation
//!
//! This module implements the `validate-config` command. Besides checking
//! the configuration values it compiles every pattern and loads every
//! replacement source, so a run never fails on either.

use crate::anonymization::AnonymizationEngine;
use crate::config::{build_patterns, build_pools, load_config};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let patterns = match build_patterns(&config) {
            Ok(p) => {
                println!("✅ {} field pattern(s) compiled", p.len());
                p
            }
            Err(e) => {
                println!("❌ Pattern compilation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let pools = match build_pools(&config) {
            Ok(p) => {
                println!("✅ {} replacement pool(s) built", p.len());
                p
            }
            Err(e) => {
                println!("❌ Replacement pools could not be built");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let engine = match AnonymizationEngine::new(patterns, &pools, config.anonymization.clone())
        {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Anonymization options are invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Data File: {}", config.input.data_file.display());
        println!("  Output File: {}", config.input.output_file.display());
        println!("  Delimiter: {:?}", config.input.delimiter);
        println!("  Pool Size: {}", config.anonymization.pool_size);
        println!("  Seed: {}", config.anonymization.seed);
        println!("  Replace Empty: {}", config.anonymization.replace_empty);
        if let Some(suffix) = &config.anonymization.column_suffix {
            println!("  Column Suffix: {suffix}");
        }
        println!("  Batch Size: {}", config.processing.batch_size);
        println!("  Parallelism: {}", config.processing.parallelism);
        println!("  On Error: {}", config.processing.on_error);
        println!("  Fields:");
        for pattern in engine.patterns().iter() {
            println!(
                "    {} -> {}",
                pattern.field(),
                pattern.group_names().join(", ")
            );
        }
        println!("  Pools: {}", pools.categories().join(", "));
        println!();

        let unresolved = engine.unresolved_groups();
        if !unresolved.is_empty() {
            println!("⚠️  Groups without a resolver (records matching them will fail):");
            for (field, group) in &unresolved {
                println!("    {field}: {group}");
            }
            println!();
        }

        println!("✅ Configuration is valid");
        Ok(0)
    }
}
