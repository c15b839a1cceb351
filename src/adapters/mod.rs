//! File format integrations.
//!
//! - [`csv`] - delimited text input/output and replacement value files
//!
//! Adapters isolate the file formats from the anonymization core, which only
//! ever sees [`Record`](crate::domain::Record)s.

pub mod csv;

pub use self::csv::{CsvSink, CsvSource};
