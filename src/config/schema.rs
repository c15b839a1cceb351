//! Configuration schema types
//!
//! This module defines the configuration structure for the anonymizer.

use crate::anonymization::pools::{canonical_category, ReplacementSource};
use crate::anonymization::resolver::{CHARS_GROUP, DIGITS_GROUP};
use crate::anonymization::AnonymizationConfig;
use crate::core::run::batch::ErrorPolicy;
use regex::RegexBuilder;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Matches replacement values that name a CSV or text file
const PATH_PATTERN: &str = r"^(((\w+:*|\d+)?(\\|/))*(\w+|\d+))+\.(csv|txt)\s*$";

/// Main anonymizer configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Input and output files
    pub input: InputConfig,

    /// Pool generation and record options
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Batching and parallelism
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Named regular expressions
    #[serde(default)]
    pub regex_patterns: HashMap<String, String>,

    /// Column name -> pattern name, in processing order
    #[serde(default)]
    pub field_mapping: FieldMapping,

    /// User-supplied replacement pools
    #[serde(default)]
    pub replacement_values: HashMap<String, ReplacementValue>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnonymizerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.input.validate()?;
        self.anonymization.validate()?;
        self.processing.validate()?;

        if self.field_mapping.is_empty() {
            return Err("field_mapping must map at least one field to a pattern".to_string());
        }

        for (field, pattern_name) in self.field_mapping.iter() {
            if !self.regex_patterns.contains_key(pattern_name) {
                return Err(format!(
                    "Field '{field}' refers to undefined pattern '{pattern_name}'"
                ));
            }
        }

        for category in self.replacement_values.keys() {
            let category = canonical_category(category);
            if category == DIGITS_GROUP || category == CHARS_GROUP {
                return Err(format!(
                    "'{category}' is a reserved group name and cannot have replacement values"
                ));
            }
        }

        self.logging.validate()?;
        Ok(())
    }

    /// Replacement sources keyed by the category name as written
    pub fn replacement_sources(&self) -> Result<Vec<(String, ReplacementSource)>, String> {
        let mut sources: Vec<(String, ReplacementSource)> = self
            .replacement_values
            .iter()
            .map(|(category, value)| Ok((category.clone(), value.to_source()?)))
            .collect::<Result<_, String>>()?;
        sources.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(sources)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Input and output file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Delimited file with a header row
    pub data_file: PathBuf,

    /// Where anonymized rows are written
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Field delimiter of both files
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.data_file.as_os_str().is_empty() {
            return Err("input.data_file cannot be empty".to_string());
        }
        if self.output_file.as_os_str().is_empty() {
            return Err("input.output_file cannot be empty".to_string());
        }
        if self.data_file == self.output_file {
            return Err("input.output_file must differ from input.data_file".to_string());
        }
        crate::adapters::csv::parse_delimiter(&self.delimiter).map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Delimiter as a byte
    pub fn delimiter_byte(&self) -> crate::domain::Result<u8> {
        crate::adapters::csv::parse_delimiter(&self.delimiter)
    }
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Records read and processed per batch (1-100000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Records anonymized concurrently (1-256)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// What to do with a record that fails (skip or halt)
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl ProcessingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 || self.batch_size > 100_000 {
            return Err(format!(
                "processing.batch_size must be between 1 and 100000, got {}",
                self.batch_size
            ));
        }
        if self.parallelism == 0 || self.parallelism > 256 {
            return Err(format!(
                "processing.parallelism must be between 1 and 256, got {}",
                self.parallelism
            ));
        }
        Ok(())
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            parallelism: default_parallelism(),
            on_error: ErrorPolicy::default(),
        }
    }
}

/// Ordered column -> pattern name mapping
///
/// Deserializes from a TOML table and keeps the document order, which is
/// the order fields are processed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping(Vec<(String, String)>);

impl FieldMapping {
    /// Entries in processing order
    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }

    /// Iterate over `(field, pattern name)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, p)| (f.as_str(), p.as_str()))
    }

    /// Mapped column names
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(f, _)| f.as_str())
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is mapped
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<F: Into<String>, P: Into<String>> FromIterator<(F, P)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (F, P)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(f, p)| (f.into(), p.into())).collect())
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, pattern) in &self.0 {
            map.serialize_entry(field, pattern)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMappingVisitor;

        impl<'de> Visitor<'de> for FieldMappingVisitor {
            type Value = FieldMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a table of column name to pattern name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, String)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((field, pattern)) = access.next_entry::<String, String>()? {
                    match entries.iter_mut().find(|(f, _)| *f == field) {
                        Some(existing) => existing.1 = pattern,
                        None => entries.push((field, pattern)),
                    }
                }
                Ok(FieldMapping(entries))
            }
        }

        deserializer.deserialize_map(FieldMappingVisitor)
    }
}

/// Replacement values as written in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplacementValue {
    /// TOML array of values
    List(Vec<String>),
    /// File path, or an inline list such as `"[a, b]"` or `"a,b"`
    Text(String),
}

impl ReplacementValue {
    /// Interpret the value as a pool source
    pub fn to_source(&self) -> Result<ReplacementSource, String> {
        match self {
            Self::List(values) => Ok(ReplacementSource::Inline(values.clone())),
            Self::Text(text) => {
                let path_regex = RegexBuilder::new(PATH_PATTERN)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| format!("Invalid path pattern: {e}"))?;

                if path_regex.is_match(text) {
                    return Ok(ReplacementSource::File(PathBuf::from(text.trim())));
                }

                let inner = text.trim();
                let inner = inner.strip_prefix('[').unwrap_or(inner);
                let inner = inner.strip_suffix(']').unwrap_or(inner);
                Ok(ReplacementSource::Inline(
                    inner
                        .split(',')
                        .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
                        .collect(),
                ))
            }
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation policy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err(
                "logging.local_path cannot be empty when local logging is enabled".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from("output.csv")
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_batch_size() -> usize {
    1000
}

fn default_parallelism() -> usize {
    4
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn minimal() -> AnonymizerConfig {
        toml::from_str(
            r#"
[input]
data_file = "data.csv"

[regex_patterns]
name = '(?P<fname>\w+) (?P<lname>\w+)'

[field_mapping]
full_name = "name"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = minimal();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.input.output_file, PathBuf::from("output.csv"));
        assert_eq!(config.input.delimiter, ",");
        assert_eq!(config.anonymization.pool_size, 10_000);
        assert_eq!(config.processing.batch_size, 1000);
        assert_eq!(config.processing.parallelism, 4);
        assert_eq!(config.processing.on_error, ErrorPolicy::Skip);
        assert!(!config.logging.local_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_field_mapping_keeps_document_order() {
        let config: AnonymizerConfig = toml::from_str(
            r#"
[input]
data_file = "data.csv"

[regex_patterns]
p = '(?P<digits>\d+)'

[field_mapping]
zeta = "p"
alpha = "p"
mid = "p"
"#,
        )
        .unwrap();

        assert_eq!(
            config.field_mapping.fields().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_undefined_pattern_rejected() {
        let mut config = minimal();
        config.field_mapping = [("email", "missing")].into_iter().collect();
        let err = config.validate().unwrap_err();
        assert!(err.contains("undefined pattern 'missing'"));
    }

    #[test]
    fn test_empty_field_mapping_rejected() {
        let mut config = minimal();
        config.field_mapping = FieldMapping::default();
        assert!(config.validate().is_err());
    }

    #[test_case("digits" ; "digits")]
    #[test_case("chars" ; "chars")]
    fn test_reserved_replacement_category_rejected(category: &str) {
        let mut config = minimal();
        config
            .replacement_values
            .insert(category.to_string(), ReplacementValue::List(vec!["x".into()]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_processing_bounds() {
        let mut config = minimal();
        config.processing.parallelism = 0;
        assert!(config.validate().is_err());

        config.processing.parallelism = 4;
        config.processing.batch_size = 100_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_input_and_output_rejected() {
        let mut config = minimal();
        config.input.output_file = config.input.data_file.clone();
        assert!(config.validate().is_err());
    }

    #[test_case("names.csv" ; "relative csv")]
    #[test_case("lists/names.TXT" ; "nested txt upper case")]
    #[test_case(r"C:\lists\names.csv" ; "windows path")]
    fn test_path_values_become_file_sources(text: &str) {
        let source = ReplacementValue::Text(text.to_string()).to_source().unwrap();
        assert!(matches!(source, ReplacementSource::File(_)));
    }

    #[test_case("[Rex, Fido, Spot]" ; "bracketed")]
    #[test_case("Rex,Fido,Spot" ; "bare")]
    #[test_case("['Rex', 'Fido', 'Spot']" ; "quoted")]
    fn test_inline_text_values(text: &str) {
        let source = ReplacementValue::Text(text.to_string()).to_source().unwrap();
        assert_eq!(
            source,
            ReplacementSource::Inline(vec!["Rex".into(), "Fido".into(), "Spot".into()])
        );
    }

    #[test]
    fn test_replacement_values_accept_arrays_and_strings() {
        let config: AnonymizerConfig = toml::from_str(
            r#"
[input]
data_file = "data.csv"

[replacement_values]
pet = ["Rex", "Fido"]
fnames = "names.csv"
"#,
        )
        .unwrap();

        let sources = config.replacement_sources().unwrap();
        assert_eq!(sources[0].0, "fnames");
        assert!(matches!(sources[0].1, ReplacementSource::File(_)));
        assert_eq!(
            sources[1].1,
            ReplacementSource::Inline(vec!["Rex".into(), "Fido".into()])
        );
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());
        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = ApplicationConfig {
            log_level: "verbose".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
