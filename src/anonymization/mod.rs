//! Row anonymization core
//!
//! Replaces sensitive substrings inside record fields with synthetic values.
//! Each configured field carries a regular expression whose named capture
//! groups mark the parts to replace; the group name selects how the
//! replacement is produced.
//!
//! # Architecture
//!
//! - **Pattern Registry** ([`patterns`]): compiles and validates the
//!   field -> pattern mapping
//! - **Replacement Pool Provider** ([`pools`]): builds the category -> values
//!   pools once per run, synthetic or user-supplied
//! - **Capability Resolvers** ([`resolver`]): turn a captured substring into
//!   its replacement, with per-record caching where required
//! - **Row Anonymizer** ([`engine`]): applies all of the above to one record
//!
//! Everything except the per-record row cache is built once and shared
//! read-only, so records can be processed in parallel.

pub mod config;
pub mod engine;
pub mod models;
pub mod patterns;
pub mod pools;
pub mod resolver;

// Re-export main types
pub use config::AnonymizationConfig;
pub use engine::{AnonymizationEngine, RowAnonymizer, RowState};
pub use models::{AnonymizedRecord, Substitution};
pub use patterns::{FieldPattern, PatternRegistry};
pub use pools::{PoolProvider, ReplacementPools, ReplacementSource};
pub use resolver::{Resolver, ResolverSet, RowCache};
