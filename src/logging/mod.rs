//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output
//! - JSON-formatted log files with rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//!
//! Captured field values and their replacements are sensitive and are never
//! logged; log lines carry field and group names only.
//!
//! # Example
//!
//! ```no_run
//! use data_anonymizer::logging::init_logging;
//! use data_anonymizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an anonymization run
///
/// # Example
///
/// ```no_run
/// use data_anonymizer::log_run_start;
///
/// log_run_start!("data.csv", "output.csv", 3);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($input:expr, $output:expr, $fields:expr) => {
        tracing::info!(
            input = %$input,
            output = %$output,
            fields = $fields,
            "Starting anonymization run"
        );
    };
}

/// Log the completion of an anonymization run
///
/// # Example
///
/// ```no_run
/// use data_anonymizer::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!(1000, 2, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($anonymized:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            anonymized = $anonymized,
            failed = $failed,
            duration_ms = $duration.as_millis(),
            "Anonymization run completed"
        );
    };
}

/// Log a record that could not be anonymized
///
/// # Example
///
/// ```no_run
/// use data_anonymizer::log_record_failure;
/// use data_anonymizer::domain::{RecordError, RecordErrorKind};
///
/// let error = RecordError::new(RecordErrorKind::EmptyPool, "name", r"(?P<fname>\w+)")
///     .with_group("fname");
/// log_record_failure!(&error);
/// ```
#[macro_export]
macro_rules! log_record_failure {
    ($error:expr) => {
        tracing::warn!(
            record = ?$error.record_index,
            field = %$error.field,
            group = $error.group.as_deref().unwrap_or("-"),
            kind = %$error.kind,
            "Record could not be anonymized"
        );
    };
}

/// Log batch progress
///
/// # Example
///
/// ```no_run
/// use data_anonymizer::log_batch_progress;
///
/// log_batch_progress!(3, 2500);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($batch:expr, $records_so_far:expr) => {
        tracing::debug!(
            batch = $batch,
            records = $records_so_far,
            "Processed batch"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{RecordError, RecordErrorKind};
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        let error = RecordError::new(RecordErrorKind::UnresolvableGroup, "notes", r"(?P<pet>\w+)")
            .with_group("pet")
            .with_record_index(4);

        log_run_start!("in.csv", "out.csv", 2);
        log_record_failure!(&error);
        log_batch_progress!(1, 10);
        log_run_complete!(9, 1, Duration::from_millis(12));
    }
}
