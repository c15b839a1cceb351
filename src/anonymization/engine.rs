//! Row anonymization engine
//!
//! This module provides the [`AnonymizationEngine`], which holds the
//! immutable per-run state (compiled patterns and resolvers), and the
//! [`RowAnonymizer`], which transforms one record using a row cache that
//! lives exactly as long as that record's processing.
//!
//! # Examples
//!
//! ```
//! use data_anonymizer::anonymization::{
//!     AnonymizationConfig, AnonymizationEngine, PatternRegistry, ReplacementPools,
//! };
//! use data_anonymizer::domain::Record;
//! use rand::SeedableRng;
//!
//! # fn example() -> anyhow::Result<()> {
//! let patterns = PatternRegistry::new([(
//!     "contact",
//!     r"(?P<fname>\w+) (?P<lname>\w+) <(?P<email>[^>]+)>",
//! )])?;
//! let pools = ReplacementPools::from_values([
//!     ("fname", vec!["Ann"]),
//!     ("lname", vec!["Lee"]),
//!     ("email", vec!["ann.lee@example.org"]),
//! ]);
//! let engine = AnonymizationEngine::new(patterns, &pools, AnonymizationConfig::default())?;
//!
//! let record = Record::new().with_field("contact", "Jane Doe <jane@example.com>");
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let result = engine.anonymize_record(record, &mut rng)?;
//!
//! assert_eq!(result.record.get("contact"), Some("Ann Lee <ann.lee@example.org>"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::anonymization::{
    config::AnonymizationConfig,
    models::{AnonymizedRecord, Substitution},
    patterns::{FieldPattern, PatternRegistry},
    pools::ReplacementPools,
    resolver::{ResolveError, ResolverSet, RowCache},
};
use crate::domain::{AnonymizerError, Record, RecordError, RecordErrorKind, Result};
use rand::Rng;

/// Main anonymization engine
///
/// Built once per run and shared read-only (usually behind an `Arc`) by every
/// worker. Holds no mutable state; all per-record state lives in a
/// [`RowAnonymizer`].
#[derive(Debug, Clone)]
pub struct AnonymizationEngine {
    patterns: PatternRegistry,
    resolvers: ResolverSet,
    config: AnonymizationConfig,
}

impl AnonymizationEngine {
    /// Create a new engine from compiled patterns and the run's pools
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(
        patterns: PatternRegistry,
        pools: &ReplacementPools,
        config: AnonymizationConfig,
    ) -> Result<Self> {
        config.validate().map_err(AnonymizerError::Configuration)?;

        let resolvers = ResolverSet::new(pools);

        let engine = Self {
            patterns,
            resolvers,
            config,
        };

        for (field, group) in engine.unresolved_groups() {
            tracing::warn!(
                field = %field,
                group = %group,
                "Named group has no resolver; records matching it will fail"
            );
        }

        Ok(engine)
    }

    /// Anonymize one record with the given random source
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] naming the field, pattern and group when a
    /// group cannot be resolved. The record is consumed either way, so a
    /// failed record can never leak into the output by accident.
    pub fn anonymize_record<R: Rng + ?Sized>(
        &self,
        record: Record,
        rng: &mut R,
    ) -> std::result::Result<AnonymizedRecord, RecordError> {
        RowAnonymizer::new(self).anonymize(record, rng)
    }

    /// Anonymize the record at position `index` of its input
    ///
    /// The random source comes from [`AnonymizationConfig::record_rng`], and
    /// the index is attached to the result or the error.
    pub fn anonymize_record_at(
        &self,
        index: u64,
        record: Record,
    ) -> std::result::Result<AnonymizedRecord, RecordError> {
        let mut rng = self.config.record_rng(index);
        match self.anonymize_record(record, &mut rng) {
            Ok(mut anonymized) => {
                anonymized.index = Some(index);
                Ok(anonymized)
            }
            Err(e) => Err(e.with_record_index(index)),
        }
    }

    /// `(field, group)` pairs whose group has no resolver
    ///
    /// Such groups only fail once a record actually matches them; callers can
    /// use this to warn before processing starts.
    pub fn unresolved_groups(&self) -> Vec<(&str, &str)> {
        self.patterns
            .iter()
            .flat_map(|pattern| {
                pattern
                    .group_names()
                    .iter()
                    .filter(|group| !self.resolvers.contains(group))
                    .map(move |group| (pattern.field(), group.as_str()))
            })
            .collect()
    }

    /// Compiled field patterns
    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Resolver table
    pub fn resolvers(&self) -> &ResolverSet {
        &self.resolvers
    }

    /// Run options
    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }
}

/// Progress of a [`RowAnonymizer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Nothing processed yet
    Idle,
    /// Working on the field at this position of the registry
    Processing {
        /// Index into the pattern registry
        field_index: usize,
    },
    /// Every field processed
    Done,
}

/// Transforms a single record
///
/// Owns the [`RowCache`] for that record; consuming the anonymizer in
/// [`anonymize`](Self::anonymize) drops the cache with it.
#[derive(Debug)]
pub struct RowAnonymizer<'a> {
    engine: &'a AnonymizationEngine,
    cache: RowCache,
    state: RowState,
}

impl<'a> RowAnonymizer<'a> {
    /// Create an anonymizer for one record
    pub fn new(engine: &'a AnonymizationEngine) -> Self {
        Self {
            engine,
            cache: RowCache::new(),
            state: RowState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> RowState {
        self.state
    }

    /// Apply every field pattern to `record`
    pub fn anonymize<R: Rng + ?Sized>(
        mut self,
        mut record: Record,
        rng: &mut R,
    ) -> std::result::Result<AnonymizedRecord, RecordError> {
        let engine = self.engine;
        let mut substitutions = Vec::new();

        for (field_index, pattern) in engine.patterns.iter().enumerate() {
            self.state = RowState::Processing { field_index };

            let value = record.get_mut(pattern.field()).ok_or_else(|| {
                RecordError::new(RecordErrorKind::MissingField, pattern.field(), pattern.raw())
            })?;

            self.anonymize_field(pattern, value, &mut substitutions, rng)?;
        }

        self.state = RowState::Done;
        tracing::trace!(
            substitutions = substitutions.len(),
            cached_groups = self.cache.len(),
            "Record anonymized"
        );

        Ok(AnonymizedRecord {
            index: None,
            record,
            substitutions,
        })
    }

    /// Substitute every captured group of one field
    ///
    /// A non-empty capture replaces its first occurrence in the current
    /// value. An empty capture (only with `replace_empty`) is inserted at the
    /// offset where its group matched, shifted by earlier substitutions. A
    /// group that did not take part in the match has no offset; its value is
    /// appended to the end of the field.
    fn anonymize_field<R: Rng + ?Sized>(
        &mut self,
        pattern: &FieldPattern,
        value: &mut String,
        substitutions: &mut Vec<Substitution>,
        rng: &mut R,
    ) -> std::result::Result<(), RecordError> {
        // Captures are taken once, against the value as it was before any
        // group of this field was substituted.
        let captured: Vec<(&str, String, Option<usize>)> = {
            let caps = match pattern.regex().captures(value.as_str()) {
                Ok(Some(caps)) => caps,
                Ok(None) => return Ok(()),
                Err(e) => {
                    tracing::debug!(
                        field = %pattern.field(),
                        error = %e,
                        "Pattern evaluation failed"
                    );
                    return Err(RecordError::new(
                        RecordErrorKind::MatchFailed,
                        pattern.field(),
                        pattern.raw(),
                    ));
                }
            };
            pattern
                .group_names()
                .iter()
                .map(|group| match caps.name(group) {
                    Some(m) => (group.as_str(), m.as_str().to_string(), Some(m.start())),
                    None => (group.as_str(), String::new(), None),
                })
                .collect()
        };

        let mut offsets: Vec<Option<usize>> = captured.iter().map(|(_, _, start)| *start).collect();

        for (position, (group, text, _)) in captured.into_iter().enumerate() {
            if text.is_empty() && !self.engine.config.replace_empty {
                continue;
            }

            let resolver = self.engine.resolvers.get(group).ok_or_else(|| {
                RecordError::new(RecordErrorKind::UnresolvableGroup, pattern.field(), pattern.raw())
                    .with_group(group)
            })?;

            let replacement = resolver
                .resolve(group, &text, &mut self.cache, rng)
                .map_err(|e| match e {
                    ResolveError::EmptyPool(_) => {
                        RecordError::new(RecordErrorKind::EmptyPool, pattern.field(), pattern.raw())
                            .with_group(group)
                    }
                })?;

            let at = if text.is_empty() {
                offsets[position].unwrap_or(value.len())
            } else {
                match value.find(text.as_str()) {
                    Some(at) => at,
                    None => {
                        tracing::trace!(
                            field = %pattern.field(),
                            group = %group,
                            "Captured text no longer present after earlier substitution"
                        );
                        continue;
                    }
                }
            };

            value.replace_range(at..at + text.len(), &replacement);
            shift_offsets(&mut offsets[position + 1..], at, text.len(), replacement.len());
            substitutions.push(Substitution {
                field: pattern.field().to_string(),
                group: group.to_string(),
                resolver: resolver.label().to_string(),
            });
        }

        Ok(())
    }
}

/// Moves pending insertion offsets across an edit that replaced `removed`
/// bytes at `at` with `inserted` bytes
///
/// Offsets inside the replaced span land at its end.
fn shift_offsets(offsets: &mut [Option<usize>], at: usize, removed: usize, inserted: usize) {
    for offset in offsets.iter_mut().flatten() {
        if *offset >= at + removed {
            *offset = *offset - removed + inserted;
        } else if *offset > at {
            *offset = at + inserted;
        }
    }
}
