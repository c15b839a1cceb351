//! Replacement pool provider
//!
//! Builds, once per run, the category -> candidate values mapping the
//! pool-backed resolvers draw from. Built-in categories are generated from a
//! seeded source so the same seed and size always yield the same pools;
//! user-supplied pools replace generated ones wholesale.

use crate::adapters::csv::read_first_row;
use crate::anonymization::resolver::{CHARS_GROUP, DIGITS_GROUP};
use crate::domain::{AnonymizerError, PoolError, Result};
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// First name category
pub const FIRST_NAME: &str = "fname";
/// Last name category
pub const LAST_NAME: &str = "lname";
/// Email address category
pub const EMAIL: &str = "email";
/// House (building) number category
pub const HOUSE_NUMBER: &str = "house_number";
/// Street address category
pub const STREET_NAME: &str = "street_name";
/// City category
pub const CITY: &str = "city";

/// Categories generated synthetically for every run
pub const BUILTIN_CATEGORIES: [&str; 6] =
    [FIRST_NAME, LAST_NAME, EMAIL, HOUSE_NUMBER, STREET_NAME, CITY];

/// Maps legacy plural pool names onto the group name they back
pub fn canonical_category(name: &str) -> &str {
    match name {
        "fnames" => FIRST_NAME,
        "lnames" => LAST_NAME,
        "emails" => EMAIL,
        "house_nums" => HOUSE_NUMBER,
        "streets" => STREET_NAME,
        "cities" => CITY,
        other => other,
    }
}

/// Where a user-supplied pool comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    /// Values listed directly in the configuration
    Inline(Vec<String>),
    /// Delimited file whose first row holds the values
    File(PathBuf),
}

impl ReplacementSource {
    /// Human-readable identifier used in errors and logs
    pub fn describe(&self) -> String {
        match self {
            Self::Inline(_) => "inline list".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Materialize the values for a category
    ///
    /// # Errors
    ///
    /// Returns a [`PoolError`] naming the category and source if the file is
    /// missing or unreadable, or if no values remain.
    pub fn load(&self, category: &str) -> std::result::Result<Vec<String>, PoolError> {
        let values = match self {
            Self::Inline(values) => values
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect(),
            Self::File(path) => {
                if !path.is_file() {
                    return Err(PoolError::SourceNotFound {
                        category: category.to_string(),
                        source_id: self.describe(),
                    });
                }
                read_first_row(path).map_err(|e| PoolError::Unreadable {
                    category: category.to_string(),
                    source_id: self.describe(),
                    reason: e.to_string(),
                })?
            }
        };

        if values.is_empty() {
            return Err(PoolError::Empty {
                category: category.to_string(),
                source_id: self.describe(),
            });
        }

        Ok(values)
    }
}

/// Final category -> pool mapping for a run
///
/// Immutable once built; pools are reference-counted so resolvers can share
/// them across threads without copying.
#[derive(Debug, Clone, Default)]
pub struct ReplacementPools {
    pools: HashMap<String, Arc<[String]>>,
}

impl ReplacementPools {
    /// Build pools directly from category -> values pairs
    ///
    /// Mostly useful in tests and for embedding the engine; production runs
    /// go through [`PoolProvider`].
    pub fn from_values<I, C, V>(pools: I) -> Self
    where
        I: IntoIterator<Item = (C, Vec<V>)>,
        C: Into<String>,
        V: Into<String>,
    {
        let pools = pools
            .into_iter()
            .map(|(category, values)| {
                let values: Vec<String> = values.into_iter().map(Into::into).collect();
                (category.into(), Arc::from(values))
            })
            .collect();
        Self { pools }
    }

    /// Pool for a category
    pub fn get(&self, category: &str) -> Option<&Arc<[String]>> {
        self.pools.get(category)
    }

    /// Whether a pool exists for a category
    pub fn contains(&self, category: &str) -> bool {
        self.pools.contains_key(category)
    }

    /// Category names, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over every category and its pool
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<[String]>)> {
        self.pools.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether there are no pools at all
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// Builds the replacement pools for a run
///
/// # Examples
///
/// ```
/// use data_anonymizer::anonymization::pools::{PoolProvider, ReplacementSource};
///
/// let pools = PoolProvider::new(25, 0)
///     .with_source("city", ReplacementSource::Inline(vec!["Springfield".into()]))
///     .build()?;
///
/// assert_eq!(pools.get("fname").unwrap().len(), 25);
/// assert_eq!(pools.get("city").unwrap().to_vec(), vec!["Springfield"]);
/// # Ok::<(), data_anonymizer::domain::AnonymizerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PoolProvider {
    pool_size: usize,
    seed: u64,
    sources: Vec<(String, ReplacementSource)>,
}

impl PoolProvider {
    /// Create a provider generating `pool_size` values per built-in category
    pub fn new(pool_size: usize, seed: u64) -> Self {
        Self {
            pool_size,
            seed,
            sources: Vec::new(),
        }
    }

    /// Register a user-supplied pool
    ///
    /// Legacy plural names (`fnames`, `cities`, ...) are mapped to the group
    /// they back. A later source for the same category wins.
    pub fn with_source(mut self, category: impl AsRef<str>, source: ReplacementSource) -> Self {
        let category = canonical_category(category.as_ref()).to_string();
        self.sources.retain(|(c, _)| *c != category);
        self.sources.push((category, source));
        self
    }

    /// Generate the built-in pools and apply user overrides
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a user pool is named after a
    /// reserved transform group, and a pool error when a user source cannot
    /// be loaded.
    pub fn build(&self) -> Result<ReplacementPools> {
        let mut pools = generate_synthetic_pools(self.pool_size, self.seed);

        for (category, source) in &self.sources {
            if category == DIGITS_GROUP || category == CHARS_GROUP {
                return Err(AnonymizerError::Configuration(format!(
                    "'{category}' is a reserved group name and cannot have replacement values"
                )));
            }

            let values = source.load(category)?;
            tracing::info!(
                category = %category,
                source = %source.describe(),
                count = values.len(),
                "Loaded custom replacement values"
            );
            pools.insert(category.clone(), Arc::from(values));
        }

        Ok(ReplacementPools { pools })
    }
}

/// Generate `pool_size` synthetic values for each built-in category
///
/// Values are drawn from a single generator seeded with `seed`, so identical
/// inputs always produce identical pools.
pub fn generate_synthetic_pools(pool_size: usize, seed: u64) -> HashMap<String, Arc<[String]>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut first_names = Vec::with_capacity(pool_size);
    let mut last_names = Vec::with_capacity(pool_size);
    let mut emails = Vec::with_capacity(pool_size);
    let mut house_numbers = Vec::with_capacity(pool_size);
    let mut streets = Vec::with_capacity(pool_size);
    let mut cities = Vec::with_capacity(pool_size);

    for _ in 0..pool_size {
        first_names.push(FirstName().fake_with_rng::<String, _>(&mut rng));
        last_names.push(LastName().fake_with_rng::<String, _>(&mut rng));
        emails.push(SafeEmail().fake_with_rng::<String, _>(&mut rng));
        house_numbers.push(BuildingNumber().fake_with_rng::<String, _>(&mut rng));

        let number: String = BuildingNumber().fake_with_rng(&mut rng);
        let street: String = StreetName().fake_with_rng(&mut rng);
        streets.push(format!("{number} {street}"));

        cities.push(CityName().fake_with_rng::<String, _>(&mut rng));
    }

    tracing::debug!(pool_size, seed, "Generated synthetic replacement pools");

    [
        (FIRST_NAME, first_names),
        (LAST_NAME, last_names),
        (EMAIL, emails),
        (HOUSE_NUMBER, house_numbers),
        (STREET_NAME, streets),
        (CITY, cities),
    ]
    .into_iter()
    .map(|(category, values)| (category.to_string(), Arc::from(values)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_synthetic_pools_are_reproducible() {
        let first = generate_synthetic_pools(20, 7);
        let second = generate_synthetic_pools(20, 7);

        for category in BUILTIN_CATEGORIES {
            assert_eq!(first[category], second[category], "category {category}");
            assert_eq!(first[category].len(), 20);
        }
    }

    #[test]
    fn test_different_seeds_give_different_pools() {
        let first = generate_synthetic_pools(50, 1);
        let second = generate_synthetic_pools(50, 2);
        assert_ne!(first[FIRST_NAME], second[FIRST_NAME]);
    }

    #[test]
    fn test_street_name_pool_holds_addresses() {
        let pools = generate_synthetic_pools(10, 0);
        for street in pools[STREET_NAME].iter() {
            let (number, rest) = street.split_once(' ').unwrap();
            assert!(number.chars().all(|c| c.is_ascii_digit()), "{street}");
            assert!(!rest.is_empty());
        }
    }

    #[test]
    fn test_user_pool_replaces_generated_pool() {
        let pools = PoolProvider::new(10, 0)
            .with_source("fname", ReplacementSource::Inline(vec!["Ann".into(), "Bea".into()]))
            .build()
            .unwrap();

        assert_eq!(pools.get("fname").unwrap().to_vec(), vec!["Ann", "Bea"]);
        assert_eq!(pools.get("lname").unwrap().len(), 10);
    }

    #[test]
    fn test_legacy_category_names_are_mapped() {
        let pools = PoolProvider::new(5, 0)
            .with_source("cities", ReplacementSource::Inline(vec!["Gotham".into()]))
            .build()
            .unwrap();

        assert_eq!(pools.get("city").unwrap().to_vec(), vec!["Gotham"]);
        assert!(!pools.contains("cities"));
    }

    #[test]
    fn test_custom_category_is_accepted() {
        let pools = PoolProvider::new(5, 0)
            .with_source("pet", ReplacementSource::Inline(vec!["Rex".into()]))
            .build()
            .unwrap();
        assert!(pools.contains("pet"));
        assert_eq!(pools.len(), BUILTIN_CATEGORIES.len() + 1);
    }

    #[test]
    fn test_reserved_category_is_rejected() {
        let err = PoolProvider::new(5, 0)
            .with_source("digits", ReplacementSource::Inline(vec!["1".into()]))
            .build()
            .unwrap_err();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
    }

    #[test]
    fn test_empty_inline_source_is_an_error() {
        let err = PoolProvider::new(5, 0)
            .with_source("pet", ReplacementSource::Inline(vec![" ".into()]))
            .build()
            .unwrap_err();
        match err {
            AnonymizerError::Pool(PoolError::Empty { category, source_id }) => {
                assert_eq!(category, "pet");
                assert_eq!(source_id, "inline list");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_source_is_an_error() {
        let err = ReplacementSource::File(PathBuf::from("/nonexistent/pets.csv"))
            .load("pet")
            .unwrap_err();
        assert!(matches!(err, PoolError::SourceNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/pets.csv"));
    }

    #[test]
    fn test_file_source_reads_first_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Rex,Fido, Spot").unwrap();
        writeln!(file, "ignored,row,here").unwrap();
        file.flush().unwrap();

        let values = ReplacementSource::File(file.path().to_path_buf())
            .load("pet")
            .unwrap();
        assert_eq!(values, vec!["Rex", "Fido", "Spot"]);
    }
}
