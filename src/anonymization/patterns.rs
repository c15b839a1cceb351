//! Field pattern registry
//!
//! Validates and compiles the field -> pattern mapping. Every pattern must
//! declare at least one named capture group; the group names are the
//! vocabulary shared with the resolvers.

use crate::domain::{AnonymizerError, Result};
use fancy_regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Compiled pattern bound to one field
#[derive(Debug, Clone)]
pub struct FieldPattern {
    field: String,
    raw: String,
    regex: Regex,
    groups: Vec<String>,
}

impl FieldPattern {
    /// Compile a pattern for a field
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern does not compile or has
    /// no named capture group.
    pub fn compile(field: impl Into<String>, raw: impl Into<String>) -> Result<Self> {
        let field = field.into();
        let raw = raw.into();

        let regex = Regex::new(&raw).map_err(|e| {
            AnonymizerError::Configuration(format!(
                "Invalid regular expression for field '{field}': {raw}: {e}"
            ))
        })?;

        let groups: Vec<String> = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        if groups.is_empty() {
            return Err(AnonymizerError::Configuration(format!(
                "The regular expression {raw} is invalid, it does not contain a named group"
            )));
        }

        Ok(Self {
            field,
            raw,
            regex,
            groups,
        })
    }

    /// Field (column) name this pattern applies to
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Pattern as written in the configuration
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Compiled expression
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Named groups in declaration order
    pub fn group_names(&self) -> &[String] {
        &self.groups
    }
}

/// Read-only set of compiled field patterns
///
/// Iteration follows the order the mapping was supplied in, which is the
/// order fields are processed within a record.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    entries: Vec<FieldPattern>,
}

impl PatternRegistry {
    /// Build a registry from field -> raw pattern pairs
    ///
    /// A field listed twice keeps its position and takes the later pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use data_anonymizer::anonymization::PatternRegistry;
    ///
    /// let registry = PatternRegistry::new([
    ///     ("name", r"(?P<fname>\w+) (?P<lname>\w+)"),
    ///     ("phone", r"(?P<phone>\d{11})"),
    /// ])?;
    /// assert_eq!(registry.len(), 2);
    /// # Ok::<(), data_anonymizer::domain::AnonymizerError>(())
    /// ```
    pub fn new<I, F, P>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (F, P)>,
        F: Into<String>,
        P: Into<String>,
    {
        let mut entries: Vec<FieldPattern> = Vec::new();

        for (field, raw) in mapping {
            let compiled = FieldPattern::compile(field, raw)?;
            match entries.iter_mut().find(|e| e.field == compiled.field) {
                Some(existing) => *existing = compiled,
                None => entries.push(compiled),
            }
        }

        tracing::debug!(fields = entries.len(), "Compiled field patterns");
        Ok(Self { entries })
    }

    /// Build a registry from a field -> pattern-name mapping and a table of
    /// named patterns
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a field refers to a pattern name that
    /// is not defined, or if any referenced pattern is invalid.
    pub fn from_named(
        field_mapping: &[(String, String)],
        patterns: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut resolved = Vec::with_capacity(field_mapping.len());
        for (field, pattern_name) in field_mapping {
            let raw = patterns.get(pattern_name).ok_or_else(|| {
                AnonymizerError::Configuration(format!(
                    "Field '{field}' refers to undefined pattern '{pattern_name}'"
                ))
            })?;
            resolved.push((field.clone(), raw.clone()));
        }
        Self::new(resolved)
    }

    /// Pattern configured for a field
    pub fn get(&self, field: &str) -> Option<&FieldPattern> {
        self.entries.iter().find(|e| e.field == field)
    }

    /// All field patterns in processing order
    pub fn iter(&self) -> impl Iterator<Item = &FieldPattern> {
        self.entries.iter()
    }

    /// Configured field names in processing order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.field.as_str())
    }

    /// Every distinct group name used by any pattern
    pub fn group_names(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.groups.iter().map(String::as_str))
            .collect()
    }

    /// Number of configured fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_compile_collects_groups_in_order() {
        let pattern = FieldPattern::compile(
            "contact",
            r"(?P<fname>\w+) (?P<lname>\w+) <(?P<email>[^>]+)>",
        )
        .unwrap();

        assert_eq!(pattern.field(), "contact");
        assert_eq!(pattern.group_names(), &["fname", "lname", "email"]);
    }

    #[test_case(r"\d+" ; "no groups")]
    #[test_case(r"(\d+)-(\d+)" ; "only unnamed groups")]
    fn test_pattern_without_named_group_is_rejected(raw: &str) {
        let err = FieldPattern::compile("field", raw).unwrap_err();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains(raw));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = FieldPattern::compile("field", r"(?P<fname>\w+").unwrap_err();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
    }

    #[test]
    fn test_lookaround_patterns_are_supported() {
        let pattern = FieldPattern::compile("note", r"(?<=Dr\. )(?P<lname>[A-Z]\w+)").unwrap();
        let caps = pattern.regex().captures("Seen by Dr. Smith").unwrap().unwrap();
        assert_eq!(caps.name("lname").unwrap().as_str(), "Smith");
    }

    #[test]
    fn test_registry_preserves_order_and_replaces_duplicates() {
        let registry = PatternRegistry::new([
            ("b", r"(?P<digits>\d+)"),
            ("a", r"(?P<chars>\w+)"),
            ("b", r"(?P<phone>\d{11})"),
        ])
        .unwrap();

        assert_eq!(registry.fields().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(registry.get("b").unwrap().group_names(), &["phone"]);
    }

    #[test]
    fn test_from_named_resolves_pattern_names() {
        let mut patterns = HashMap::new();
        patterns.insert("full_name".to_string(), r"(?P<fname>\w+) (?P<lname>\w+)".to_string());

        let mapping = vec![
            ("name".to_string(), "full_name".to_string()),
            ("manager".to_string(), "full_name".to_string()),
        ];
        let registry = PatternRegistry::from_named(&mapping, &patterns).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.group_names().into_iter().collect::<Vec<_>>(),
            vec!["fname", "lname"]
        );
    }

    #[test]
    fn test_from_named_rejects_undefined_pattern() {
        let mapping = vec![("name".to_string(), "missing".to_string())];
        let err = PatternRegistry::from_named(&mapping, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("undefined pattern 'missing'"));
    }
}
