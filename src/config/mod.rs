//! Configuration management for the anonymizer.
//!
//! # Overview
//!
//! The anonymizer uses one TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment overrides (`ANONYMIZER_<SECTION>_<KEY>`)
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`InputConfig`] - Data file, output file, delimiter
//! - [`AnonymizationConfig`](crate::anonymization::AnonymizationConfig) - Pool size, seeds,
//!   empty-capture policy, column suffix
//! - [`ProcessingConfig`] - Batch size, parallelism, error policy
//! - `regex_patterns`, [`FieldMapping`], [`ReplacementValue`] - What to anonymize and with what
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [input]
//! data_file = "people.csv"
//! output_file = "people_anonymized.csv"
//!
//! [anonymization]
//! pool_size = 10000
//! seed = 42
//!
//! [regex_patterns]
//! full_name = '(?P<fname>\w+) (?P<lname>\w+)'
//! mobile = '(?P<phone>\d{11})'
//!
//! [field_mapping]
//! name = "full_name"
//! phone = "mobile"
//!
//! [replacement_values]
//! city = ["Springfield", "Shelbyville"]
//! lname = "surnames.csv"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{build_patterns, build_pools, load_config, parse_config_file};
pub use schema::{
    AnonymizerConfig, ApplicationConfig, FieldMapping, InputConfig, LoggingConfig,
    ProcessingConfig, ReplacementValue,
};
