//! Domain models and types for the anonymizer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Records** ([`Record`]), the ordered field/value rows the engine rewrites
//! - **Error types** ([`AnonymizerError`], [`PoolError`], [`RecordError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AnonymizerError>`]:
//!
//! ```rust,no_run
//! use data_anonymizer::domain::Result;
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = data_anonymizer::config::load_config("anonymizer.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{AnonymizerError, PoolError, RecordError, RecordErrorKind};
pub use record::Record;
pub use result::Result;
