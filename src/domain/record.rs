//! Tabular record model
//!
//! A [`Record`] is one row of input: an ordered mapping of field name to
//! string value. Column order is kept so a record can be written back in the
//! shape it was read.

use serde::{Deserialize, Serialize};

/// One row of tabular data
///
/// # Examples
///
/// ```
/// use data_anonymizer::domain::Record;
///
/// let record = Record::new()
///     .with_field("name", "Jane Doe")
///     .with_field("city", "Wellington");
///
/// assert_eq!(record.get("name"), Some("Jane Doe"));
/// assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["name", "city"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builds a record by zipping a header row with a value row
    ///
    /// Columns stay positional: a repeated header yields two fields, and
    /// lookups by name see the first. Extra values beyond the header are
    /// dropped; missing values leave the field out.
    pub fn from_row(headers: &[String], values: impl IntoIterator<Item = String>) -> Self {
        Self {
            fields: headers.iter().cloned().zip(values).collect(),
        }
    }

    /// Appends a field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing the value in place if it already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns a mutable handle on the value of a field
    pub fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether the record has a field with this name
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Field names in column order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Field values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// Consumes the record and returns the values in column order
    pub fn into_values(self) -> Vec<String> {
        self.fields.into_iter().map(|(_, v)| v).collect()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new().with_field("a", "1").with_field("b", "2");
        record.insert("a", "10");

        assert_eq!(record.get("a"), Some("10"));
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_from_row() {
        let headers = vec!["name".to_string(), "phone".to_string()];
        let record = Record::from_row(&headers, vec!["Jane".to_string(), "021555".to_string()]);

        assert_eq!(record.get("name"), Some("Jane"));
        assert_eq!(record.get("phone"), Some("021555"));
        assert_eq!(record.into_values(), vec!["Jane", "021555"]);
    }

    #[test]
    fn test_from_row_keeps_repeated_headers() {
        let headers = vec!["name".to_string(), "note".to_string(), "note".to_string()];
        let values = vec!["Jane".to_string(), "a".to_string(), "b".to_string()];
        let record = Record::from_row(&headers, values);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("note"), Some("a"));
        assert_eq!(record.into_values(), vec!["Jane", "a", "b"]);
    }

    #[test]
    fn test_get_mut_and_contains() {
        let mut record: Record = [("email", "a@b.c")].into_iter().collect();
        assert!(record.contains("email"));
        assert!(!record.contains("name"));

        if let Some(value) = record.get_mut("email") {
            value.push_str(".nz");
        }
        assert_eq!(record.get("email"), Some("a@b.c.nz"));
    }

    #[test]
    fn test_empty_record() {
        let record = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.get("anything"), None);
    }
}
