//! Capability resolvers
//!
//! A resolver turns a captured substring into its replacement. Resolvers are
//! picked purely by the name of the capture group that matched:
//!
//! - `digits` / `chars` derive the replacement from the shape of the capture
//!   and are never cached
//! - `post_code` / `phone` generate a fixed-format value once per record
//! - every other name is backed by a replacement pool and resolves to one
//!   value per record
//!
//! Cached values live in a [`RowCache`] that is created for one record and
//! dropped with it.

use crate::anonymization::pools::ReplacementPools;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Group name for digit randomization
pub const DIGITS_GROUP: &str = "digits";
/// Group name for case-preserving letter randomization
pub const CHARS_GROUP: &str = "chars";
/// Group name for generated post codes
pub const POST_CODE_GROUP: &str = "post_code";
/// Group name for generated phone numbers
pub const PHONE_GROUP: &str = "phone";

/// Country and mobile prefix of generated phone numbers
pub const PHONE_PREFIX: &str = "642";

/// Errors raised while resolving a group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The pool backing the group has no values
    #[error("replacement pool for '{0}' is empty")]
    EmptyPool(String),
}

/// Shape-preserving transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Every character becomes a random decimal digit
    Digits,
    /// Letters become random letters of the same case, everything else is kept
    ///
    /// Replacements are always ASCII: a cased non-ASCII letter such as `é`
    /// or `Ö` becomes a random `a-z` or `A-Z` letter. Letters without case
    /// (CJK ideographs, for instance) count as "everything else" and pass
    /// through unchanged.
    Chars,
}

impl Transform {
    /// Apply the transform to a captured substring
    pub fn apply<R: Rng + ?Sized>(&self, captured: &str, rng: &mut R) -> String {
        match self {
            Self::Digits => captured
                .chars()
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect(),
            Self::Chars => captured
                .chars()
                .map(|c| {
                    if c.is_lowercase() {
                        char::from(rng.gen_range(b'a'..=b'z'))
                    } else if c.is_uppercase() {
                        char::from(rng.gen_range(b'A'..=b'Z'))
                    } else {
                        c
                    }
                })
                .collect(),
        }
    }
}

/// Fixed-format value generators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Four-digit post code in 1000..=9999
    PostCode,
    /// [`PHONE_PREFIX`] followed by eight digits
    Phone,
}

impl Generator {
    /// Produce a fresh value
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            Self::PostCode => rng.gen_range(1000..=9999u32).to_string(),
            Self::Phone => format!("{PHONE_PREFIX}{}", rng.gen_range(10_000_000..=99_999_999u32)),
        }
    }
}

/// Strategy bound to a group name
#[derive(Debug, Clone)]
pub enum Resolver {
    /// Derived from the captured text; never cached
    Transform(Transform),
    /// Generated once per record
    Generated(Generator),
    /// Drawn once per record from a replacement pool
    PoolBacked(Arc<[String]>),
}

impl Resolver {
    /// Whether resolved values are reused within a record
    pub fn is_cached(&self) -> bool {
        !matches!(self, Self::Transform(_))
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transform(Transform::Digits) => "digits",
            Self::Transform(Transform::Chars) => "chars",
            Self::Generated(Generator::PostCode) => "post_code",
            Self::Generated(Generator::Phone) => "phone",
            Self::PoolBacked(_) => "pool",
        }
    }

    /// Resolve a replacement for `captured`
    ///
    /// Cached resolvers consult `cache` under `group` first and store the
    /// value they produce; the captured text does not influence the result.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::EmptyPool`] when a pool-backed group has no
    /// values to draw from.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        group: &str,
        captured: &str,
        cache: &mut RowCache,
        rng: &mut R,
    ) -> Result<String, ResolveError> {
        match self {
            Self::Transform(transform) => Ok(transform.apply(captured, rng)),
            Self::Generated(generator) => {
                cache.get_or_try_insert_with(group, || Ok(generator.generate(rng)))
            }
            Self::PoolBacked(pool) => cache.get_or_try_insert_with(group, || {
                pool.choose(rng)
                    .cloned()
                    .ok_or_else(|| ResolveError::EmptyPool(group.to_string()))
            }),
        }
    }
}

/// Per-record memo of resolved values, keyed by group name
///
/// Must not outlive the record it was created for.
#[derive(Debug, Default)]
pub struct RowCache {
    values: HashMap<String, String>,
}

impl RowCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for a group
    pub fn get(&self, group: &str) -> Option<&str> {
        self.values.get(group).map(String::as_str)
    }

    /// Return the cached value for `group`, computing and storing it first if
    /// absent
    pub fn get_or_try_insert_with<F, E>(&mut self, group: &str, f: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        if let Some(value) = self.values.get(group) {
            return Ok(value.clone());
        }
        let value = f()?;
        self.values.insert(group.to_string(), value.clone());
        Ok(value)
    }

    /// Number of cached groups
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable group name -> resolver table shared by all records of a run
#[derive(Debug, Clone)]
pub struct ResolverSet {
    resolvers: HashMap<String, Resolver>,
}

impl ResolverSet {
    /// Build the table from the run's pools
    ///
    /// Every pool becomes a pool-backed resolver. A pool named `post_code` or
    /// `phone` takes precedence over the generator of that name.
    pub fn new(pools: &ReplacementPools) -> Self {
        let mut resolvers = HashMap::new();
        resolvers.insert(DIGITS_GROUP.to_string(), Resolver::Transform(Transform::Digits));
        resolvers.insert(CHARS_GROUP.to_string(), Resolver::Transform(Transform::Chars));
        resolvers.insert(POST_CODE_GROUP.to_string(), Resolver::Generated(Generator::PostCode));
        resolvers.insert(PHONE_GROUP.to_string(), Resolver::Generated(Generator::Phone));

        for (category, pool) in pools.iter() {
            if category == DIGITS_GROUP || category == CHARS_GROUP {
                continue;
            }
            resolvers.insert(category.to_string(), Resolver::PoolBacked(Arc::clone(pool)));
        }

        Self { resolvers }
    }

    /// Resolver for a group name
    pub fn get(&self, group: &str) -> Option<&Resolver> {
        self.resolvers.get(group)
    }

    /// Whether a group name has a resolver
    pub fn contains(&self, group: &str) -> bool {
        self.resolvers.contains_key(group)
    }

    /// Known group names, sorted
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test_case("0211234567" ; "plain digits")]
    #[test_case("12-34 56" ; "digits with separators")]
    #[test_case("" ; "empty")]
    fn test_digits_preserves_length(captured: &str) {
        let out = Transform::Digits.apply(captured, &mut rng());
        assert_eq!(out.chars().count(), captured.chars().count());
        assert!(out.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_chars_maps_cased_letters_to_ascii() {
        let out = Transform::Chars.apply("éÖ名", &mut rng());
        let chars: Vec<char> = out.chars().collect();

        assert_eq!(chars.len(), 3);
        assert!(chars[0].is_ascii_lowercase());
        assert!(chars[1].is_ascii_uppercase());
        assert_eq!(chars[2], '名');
    }

    #[test]
    fn test_chars_preserves_case_and_punctuation() {
        let captured = "McDonald-Smith 3rd.";
        let out = Transform::Chars.apply(captured, &mut rng());

        assert_eq!(out.chars().count(), captured.chars().count());
        for (original, replaced) in captured.chars().zip(out.chars()) {
            if original.is_lowercase() {
                assert!(replaced.is_ascii_lowercase(), "{original} -> {replaced}");
            } else if original.is_uppercase() {
                assert!(replaced.is_ascii_uppercase(), "{original} -> {replaced}");
            } else {
                assert_eq!(original, replaced);
            }
        }
    }

    #[test]
    fn test_post_code_format() {
        let mut rng = rng();
        for _ in 0..100 {
            let code = Generator::PostCode.generate(&mut rng);
            let value: u32 = code.parse().unwrap();
            assert_eq!(code.len(), 4);
            assert!((1000..=9999).contains(&value));
        }
    }

    #[test]
    fn test_phone_format() {
        let mut rng = rng();
        for _ in 0..100 {
            let phone = Generator::Phone.generate(&mut rng);
            assert_eq!(phone.len(), 11);
            assert!(phone.starts_with(PHONE_PREFIX));
            assert!(phone.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_pool_backed_is_cached_per_row() {
        let pool: Arc<[String]> = Arc::from(
            (0..100).map(|i| format!("name{i}")).collect::<Vec<_>>(),
        );
        let resolver = Resolver::PoolBacked(pool);
        let mut cache = RowCache::new();
        let mut rng = rng();

        let first = resolver.resolve("fname", "John", &mut cache, &mut rng).unwrap();
        let second = resolver.resolve("fname", "Jane", &mut cache, &mut rng).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.get("fname"), Some(first.as_str()));
    }

    #[test]
    fn test_transform_is_never_cached() {
        let resolver = Resolver::Transform(Transform::Digits);
        let mut cache = RowCache::new();
        let mut rng = rng();

        let outputs: Vec<String> = (0..20)
            .map(|_| resolver.resolve("digits", "123456789", &mut cache, &mut rng).unwrap())
            .collect();

        assert!(cache.is_empty());
        assert!(outputs.iter().any(|o| o != &outputs[0]));
    }

    #[test]
    fn test_generated_is_cached_per_row() {
        let resolver = Resolver::Generated(Generator::Phone);
        let mut cache = RowCache::new();
        let mut rng = rng();

        let first = resolver.resolve("phone", "02111111111", &mut cache, &mut rng).unwrap();
        let second = resolver.resolve("phone", "02122222222", &mut cache, &mut rng).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_pool_fails() {
        let resolver = Resolver::PoolBacked(Arc::from(Vec::<String>::new()));
        let err = resolver
            .resolve("pet", "Rex", &mut RowCache::new(), &mut rng())
            .unwrap_err();
        assert_eq!(err, ResolveError::EmptyPool("pet".to_string()));
    }

    #[test]
    fn test_resolver_set_dispatch() {
        let pools = ReplacementPools::from_values([
            ("fname", vec!["Ann"]),
            ("phone", vec!["000"]),
            ("digits", vec!["ignored"]),
        ]);
        let set = ResolverSet::new(&pools);

        assert!(matches!(set.get("digits"), Some(Resolver::Transform(Transform::Digits))));
        assert!(matches!(set.get("chars"), Some(Resolver::Transform(Transform::Chars))));
        assert!(matches!(set.get("post_code"), Some(Resolver::Generated(Generator::PostCode))));
        assert!(matches!(set.get("phone"), Some(Resolver::PoolBacked(_))));
        assert!(matches!(set.get("fname"), Some(Resolver::PoolBacked(_))));
        assert!(set.get("unknown").is_none());
        assert!(set.contains("fname"));
    }
}
