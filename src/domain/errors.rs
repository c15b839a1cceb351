//! Domain error types
//!
//! This module defines the error hierarchy for the anonymizer. The three
//! families surfaced by the core are configuration errors, replacement pool
//! errors and per-record errors; the remaining variants belong to the outer
//! I/O and configuration layers.

use std::fmt;
use thiserror::Error;

/// Main anonymizer error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors (invalid patterns, unknown settings,
    /// unmapped columns)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Replacement pool errors
    #[error("Replacement pool error: {0}")]
    Pool(#[from] PoolError),

    /// A single record could not be anonymized
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Replacement pool errors
///
/// Every variant names the category the pool was meant to back and the
/// source it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The external source does not exist
    #[error("replacement source for '{category}' not found: {source_id}")]
    SourceNotFound {
        /// Category name
        category: String,
        /// Source identifier (usually a file path)
        source_id: String,
    },

    /// The external source exists but could not be read or parsed
    #[error("replacement source for '{category}' could not be read ({source_id}): {reason}")]
    Unreadable {
        /// Category name
        category: String,
        /// Source identifier (usually a file path)
        source_id: String,
        /// Underlying failure
        reason: String,
    },

    /// The source yielded no values
    #[error("replacement source for '{category}' is empty: {source_id}")]
    Empty {
        /// Category name
        category: String,
        /// Source identifier
        source_id: String,
    },
}

impl PoolError {
    /// Category the failing pool belongs to
    pub fn category(&self) -> &str {
        match self {
            Self::SourceNotFound { category, .. }
            | Self::Unreadable { category, .. }
            | Self::Empty { category, .. } => category,
        }
    }
}

/// Why a record could not be anonymized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// No resolver exists for the named group
    UnresolvableGroup,
    /// The group's pool exists but holds no values
    EmptyPool,
    /// The record has no column for a configured field
    MissingField,
    /// The pattern could not be evaluated against the value
    MatchFailed,
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnresolvableGroup => "no resolver for group",
            Self::EmptyPool => "replacement pool is empty",
            Self::MissingField => "field missing from record",
            Self::MatchFailed => "pattern evaluation failed",
        };
        f.write_str(text)
    }
}

/// Failure while anonymizing one record
///
/// Scoped to the record: the caller decides whether to skip it or stop the
/// batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Failure category
    pub kind: RecordErrorKind,
    /// Position of the record in its input, when known
    pub record_index: Option<u64>,
    /// Field being processed
    pub field: String,
    /// Raw pattern configured for the field
    pub pattern: String,
    /// Named group being resolved
    pub group: Option<String>,
}

impl RecordError {
    /// Creates a new record error
    pub fn new(
        kind: RecordErrorKind,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            record_index: None,
            field: field.into(),
            pattern: pattern.into(),
            group: None,
        }
    }

    /// Sets the group name
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the record index
    pub fn with_record_index(mut self, index: u64) -> Self {
        self.record_index = Some(index);
        self
    }

    /// Whether this error stems from configuration rather than data
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, RecordErrorKind::UnresolvableGroup)
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (record: ", self.kind)?;
        match self.record_index {
            Some(index) => write!(f, "{index}")?,
            None => f.write_str("?")?,
        }
        write!(
            f,
            ", field: '{}', group: '{}', pattern: '{}')",
            self.field,
            self.group.as_deref().unwrap_or("-"),
            self.pattern
        )
    }
}

impl std::error::Error for RecordError {}

// Conversion from std::io::Error
impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnonymizerError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizerError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for AnonymizerError {
    fn from(err: csv::Error) -> Self {
        AnonymizerError::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymizer_error_display() {
        let err = AnonymizerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_pool_error_conversion() {
        let pool_err = PoolError::Empty {
            category: "city".to_string(),
            source_id: "cities.csv".to_string(),
        };
        let err: AnonymizerError = pool_err.into();
        assert!(matches!(err, AnonymizerError::Pool(_)));
        assert!(err.to_string().contains("city"));
        assert!(err.to_string().contains("cities.csv"));
    }

    #[test]
    fn test_pool_error_category() {
        let err = PoolError::SourceNotFound {
            category: "fname".to_string(),
            source_id: "/missing/names.csv".to_string(),
        };
        assert_eq!(err.category(), "fname");
    }

    #[test]
    fn test_record_error_builder() {
        let err = RecordError::new(RecordErrorKind::UnresolvableGroup, "notes", "(?P<pet>\\w+)")
            .with_group("pet")
            .with_record_index(7);

        assert_eq!(err.record_index, Some(7));
        assert_eq!(err.group.as_deref(), Some("pet"));
        assert!(err.is_configuration());

        let message = err.to_string();
        assert!(message.contains("record: 7"));
        assert!(message.contains("field: 'notes'"));
        assert!(message.contains("group: 'pet'"));
    }

    #[test]
    fn test_record_error_without_index() {
        let err = RecordError::new(RecordErrorKind::MissingField, "email", "(?P<email>.+)");
        assert!(err.to_string().contains("record: ?"));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AnonymizerError = io_err.into();
        assert!(matches!(err, AnonymizerError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AnonymizerError = toml_err.into();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_anonymizer_error_implements_std_error() {
        let err = AnonymizerError::Other("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
