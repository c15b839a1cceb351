//! Run orchestration and batch processing
//!
//! This module provides the run logic around the anonymization engine:
//! - Parallel batch processing of records
//! - Run coordination (read, anonymize, write)
//! - Summary and reporting

pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::{BatchConfig, BatchProcessor, BatchResult, ErrorPolicy};
pub use coordinator::RunCoordinator;
pub use summary::{RunError, RunSummary};
