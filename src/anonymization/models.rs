//! Anonymization result models

use crate::domain::Record;
use serde::{Deserialize, Serialize};

/// One substring replacement applied to a record
///
/// Holds names only; neither the captured text nor its replacement is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Field the substitution happened in
    pub field: String,
    /// Named group that matched
    pub group: String,
    /// Resolver kind that produced the replacement
    pub resolver: String,
}

/// Result of anonymizing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizedRecord {
    /// Position of the record in its input, when known
    pub index: Option<u64>,
    /// Record with substituted values
    pub record: Record,
    /// Substitutions applied, in processing order
    pub substitutions: Vec<Substitution>,
}

impl AnonymizedRecord {
    /// Whether any substitution took place
    pub fn has_substitutions(&self) -> bool {
        !self.substitutions.is_empty()
    }

    /// Number of substitutions
    pub fn total_substitutions(&self) -> usize {
        self.substitutions.len()
    }

    /// Distinct fields that were changed
    pub fn touched_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for substitution in &self.substitutions {
            if !fields.contains(&substitution.field.as_str()) {
                fields.push(&substitution.field);
            }
        }
        fields
    }
}
