//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "anonymizer.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing anonymizer configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point input.data_file at the file to anonymize");
                println!("  3. Describe each sensitive field with a named-group pattern");
                println!("  4. Validate configuration: data-anonymizer validate-config");
                println!("  5. Run: data-anonymizer run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Data Anonymizer Configuration File

[application]
log_level = "info"

[input]
data_file = "data.csv"
output_file = "output.csv"
delimiter = ","

[anonymization]
pool_size = 10000
seed = 0
replace_empty = false

[processing]
batch_size = 1000
parallelism = 4
on_error = "skip"

[regex_patterns]
full_name = '(?P<fname>\w+)\s+(?P<lname>\w+)'
phone = '(?P<phone>\+?[\d\s-]{7,})'
address = '(?P<house_number>\d+)\s+(?P<street_name>[\w\s]+?),\s*(?P<city>[\w\s]+?)\s+(?P<post_code>\d{4})'

[field_mapping]
name = "full_name"
phone = "phone"
address = "address"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Data Anonymizer Configuration File
#
# Every mapped field is matched against a pattern with named capture groups.
# Each captured group is replaced according to its name:
#
#   digits       every digit replaced by a random digit
#   chars        every letter replaced by a random letter of the same case
#   post_code    a random four digit post code
#   phone        a random 642 prefixed phone number
#   <category>   a value drawn from the replacement pool of that name
#
# Built-in pools: fname, lname, email, house_number, street_name, city.
# Within one record the same group name always gets the same replacement,
# except for digits and chars which are transformed per occurrence.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Input / Output
# ============================================================================
[input]
# Delimited file to anonymize; the first row holds the column names
data_file = "data.csv"

# Where anonymized records are written (created or overwritten)
output_file = "output.csv"

# Field delimiter, a single character or "\t"
delimiter = ","

# ============================================================================
# Anonymization
# ============================================================================
[anonymization]
# Synthetic values generated per built-in pool (1-1000000)
pool_size = 10000

# Seed for pool generation; the same seed yields the same pools
seed = 0

# Also replace groups that captured nothing
replace_empty = false

# Optional: seed per-record randomness for reproducible output
# record_seed = 42

# Optional: suffix appended to anonymized column names in the output
# column_suffix = "_anon"

# ============================================================================
# Processing
# ============================================================================
[processing]
# Records read and anonymized per batch (1-100000)
batch_size = 1000

# Records anonymized concurrently (1-256)
parallelism = 4

# What to do with a record that cannot be anonymized: skip | halt
on_error = "skip"

# ============================================================================
# Patterns
# ============================================================================
[regex_patterns]
full_name = '(?P<fname>\w+)\s+(?P<lname>\w+)'
email = '(?P<email>[\w.+-]+@[\w-]+\.[\w.]+)'
phone = '(?P<phone>\+?[\d\s-]{7,})'
account = '(?P<chars>[A-Z]{2})-(?P<digits>\d+)'
address = '(?P<house_number>\d+)\s+(?P<street_name>[\w\s]+?),\s*(?P<city>[\w\s]+?)\s+(?P<post_code>\d{4})'

# Column name -> pattern name; columns are processed in this order
[field_mapping]
name = "full_name"
email = "email"
phone = "phone"
account_id = "account"
address = "address"

# ============================================================================
# Replacement Values
# ============================================================================
# Replace a built-in pool, or add a pool for a custom group name.
# Values may be listed inline or read from the first row of a .csv/.txt file.
[replacement_values]
# fname = ["Alex", "Sam", "Jordan"]
# city = "pools/cities.csv"
# pet = "[Rex, Fido, Tom]"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "./logs"

# Log rotation (daily, hourly or never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnonymizerConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "anonymizer.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "anonymizer.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_are_valid() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: AnonymizerConfig = toml::from_str(&content).unwrap();
            assert!(config.validate().is_ok());
            assert!(crate::config::build_patterns(&config).is_ok());
        }
    }

    #[test]
    fn test_generate_config_with_examples() {
        let config = InitArgs::generate_config_with_examples();
        assert!(config.contains("# Data Anonymizer Configuration File"));
        assert!(config.contains("[field_mapping]"));
        assert!(config.contains("post_code"));
    }

    #[tokio::test]
    async fn test_existing_file_requires_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anonymizer.toml");
        std::fs::write(&path, "keep").unwrap();

        let mut args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");

        args.force = true;
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[input]"));
    }
}
