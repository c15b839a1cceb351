//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::AnonymizerConfig;
use crate::anonymization::{PatternRegistry, PoolProvider, ReplacementPools};
use crate::domain::errors::AnonymizerError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ANONYMIZER";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into AnonymizerConfig
/// 4. Applies environment variable overrides (ANONYMIZER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file cannot be read or parsed, a
/// referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use data_anonymizer::config::loader::load_config;
///
/// let config = load_config("anonymizer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<AnonymizerConfig> {
    let config = parse_config_file(path)?;

    config.validate().map_err(|e| {
        AnonymizerError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Reads, substitutes and parses a configuration file and applies
/// environment overrides, without validating
///
/// Callers that patch the configuration further (command-line overrides)
/// validate afterwards themselves.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<AnonymizerConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(AnonymizerError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        AnonymizerError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: AnonymizerConfig = toml::from_str(&contents)
        .map_err(|e| AnonymizerError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    tracing::debug!(
        path = %path.display(),
        fields = config.field_mapping.len(),
        patterns = config.regex_patterns.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Compile the configured field patterns
pub fn build_patterns(config: &AnonymizerConfig) -> Result<PatternRegistry> {
    PatternRegistry::from_named(config.field_mapping.entries(), &config.regex_patterns)
}

/// Build the run's replacement pools
pub fn build_pools(config: &AnonymizerConfig) -> Result<ReplacementPools> {
    let mut provider = PoolProvider::new(config.anonymization.pool_size, config.anonymization.seed);
    for (category, source) in config
        .replacement_sources()
        .map_err(AnonymizerError::Configuration)?
    {
        provider = provider.with_source(category, source);
    }
    provider.build()
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| AnonymizerError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(AnonymizerError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_var(section: &str, key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{section}_{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(section: &str, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env_var(section, key) {
        Some(val) => val.trim().parse().map(Some).map_err(|e: T::Err| {
            AnonymizerError::Configuration(format!(
                "Invalid value for {ENV_PREFIX}_{section}_{key} '{val}': {e}"
            ))
        }),
        None => Ok(None),
    }
}

/// Applies environment variable overrides using the ANONYMIZER_* prefix
///
/// Environment variables follow the pattern: ANONYMIZER_<SECTION>_<KEY>
/// For example: ANONYMIZER_INPUT_DATA_FILE, ANONYMIZER_ANONYMIZATION_SEED
fn apply_env_overrides(config: &mut AnonymizerConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_var("APPLICATION", "LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Input overrides
    if let Some(val) = env_var("INPUT", "DATA_FILE") {
        config.input.data_file = val.into();
    }
    if let Some(val) = env_var("INPUT", "OUTPUT_FILE") {
        config.input.output_file = val.into();
    }
    if let Some(val) = env_var("INPUT", "DELIMITER") {
        config.input.delimiter = val;
    }

    // Anonymization overrides
    if let Some(size) = parse_env("ANONYMIZATION", "POOL_SIZE")? {
        config.anonymization.pool_size = size;
    }
    if let Some(seed) = parse_env("ANONYMIZATION", "SEED")? {
        config.anonymization.seed = seed;
    }
    if let Some(replace) = parse_env("ANONYMIZATION", "REPLACE_EMPTY")? {
        config.anonymization.replace_empty = replace;
    }
    if let Some(seed) = parse_env("ANONYMIZATION", "RECORD_SEED")? {
        config.anonymization.record_seed = Some(seed);
    }
    if let Some(val) = env_var("ANONYMIZATION", "COLUMN_SUFFIX") {
        config.anonymization.column_suffix = Some(val);
    }

    // Processing overrides
    if let Some(size) = parse_env("PROCESSING", "BATCH_SIZE")? {
        config.processing.batch_size = size;
    }
    if let Some(parallelism) = parse_env("PROCESSING", "PARALLELISM")? {
        config.processing.parallelism = parallelism;
    }
    if let Some(policy) = parse_env("PROCESSING", "ON_ERROR")? {
        config.processing.on_error = policy;
    }

    // Logging overrides
    if let Some(enabled) = parse_env("LOGGING", "LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Some(val) = env_var("LOGGING", "LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

/// Serializes tests that read or write `ANONYMIZER_*` variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
