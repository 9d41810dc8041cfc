//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PufConfig;
use crate::config::secret_string;
use crate::domain::errors::PufError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PufConfig
/// 4. Applies environment variable overrides (PUFGEN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PufError::Configuration`] if the file cannot be read or parsed,
/// a referenced variable is unset, or validation fails. An out of range `k`
/// is reported as [`PufError::InvalidParameter`].
///
/// # Examples
///
/// ```no_run
/// use pufgen::config::loader::load_config;
///
/// let config = load_config("pufgen.toml")?;
/// println!("k = {}", config.anonymization.k);
/// # Ok::<(), pufgen::domain::PufError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PufConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PufError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PufError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses and validates configuration text
pub fn parse_config(contents: &str) -> Result<PufConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PufConfig = toml::from_str(&contents)
        .map_err(|e| PufError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.anonymization.validate()?;
    config
        .validate()
        .map_err(|e| PufError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PufError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let substituted = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        lines.push(substituted.into_owned());
    }

    if !missing_vars.is_empty() {
        return Err(PufError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using PUFGEN_* prefix
///
/// Environment variables follow the pattern: PUFGEN_<SECTION>_<KEY>
/// For example: PUFGEN_ANONYMIZATION_K, PUFGEN_OUTPUT_DIRECTORY
///
/// # Errors
///
/// Returns [`PufError::InvalidParameter`] if `PUFGEN_ANONYMIZATION_K` is not a
/// number, and [`PufError::Configuration`] for an unparsable parallelism.
fn apply_env_overrides(config: &mut PufConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PUFGEN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("PUFGEN_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Anonymization overrides
    if let Ok(val) = std::env::var("PUFGEN_ANONYMIZATION_K") {
        config.anonymization.k = val.trim().parse().map_err(|_| {
            PufError::InvalidParameter(format!(
                "PUFGEN_ANONYMIZATION_K must be a whole number, got '{val}'"
            ))
        })?;
    }

    // Processing overrides
    if let Ok(val) = std::env::var("PUFGEN_PROCESSING_MAX_PARALLEL_TABLES") {
        let n = val.trim().parse().map_err(|_| {
            PufError::Configuration(format!(
                "PUFGEN_PROCESSING_MAX_PARALLEL_TABLES must be a whole number, got '{val}'"
            ))
        })?;
        config.processing.max_parallel_tables = Some(n);
    }

    // Output overrides
    if let Ok(val) = std::env::var("PUFGEN_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }

    // Source overrides (only for sections that are present)
    if let Some(ref mut pg) = config.source.postgresql {
        if let Ok(val) = std::env::var("PUFGEN_SOURCE_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
    }
    if let Some(ref mut csv) = config.source.csv {
        if let Ok(val) = std::env::var("PUFGEN_SOURCE_CSV_DIRECTORY") {
            csv.directory = val;
        }
    }

    // Target overrides
    if let Some(ref mut target) = config.target {
        if let Ok(val) = std::env::var("PUFGEN_TARGET_POSTGRESQL_CONNECTION_STRING") {
            target.postgresql.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("PUFGEN_TARGET_TABLE_SUFFIX") {
            target.table_suffix = val;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PUFGEN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("PUFGEN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
kind = "csv"

[source.csv]
directory = "data"

[[tables]]
name = "persons"

[[tables.columns]]
name = "birth_year"
type = "year"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PUFGEN_TEST_SUBST_VAR", "test_value");
        let input = "password = \"${PUFGEN_TEST_SUBST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"");
        std::env::remove_var("PUFGEN_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PUFGEN_TEST_MISSING_VAR");
        let input = "password = \"${PUFGEN_TEST_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(matches!(result, Err(PufError::Configuration(_))));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("PUFGEN_TEST_COMMENTED_VAR");
        let input = "# dsn = \"${PUFGEN_TEST_COMMENTED_VAR}\"\nk = 3";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(PufError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.anonymization.k, 5);
        assert_eq!(config.output.directory, "output_csv");
        assert_eq!(config.tables[0].columns[0].semantic_type.as_deref(), Some("year"));
        assert!(config.target.is_none());
    }

    #[test]
    fn test_small_k_is_invalid_parameter() {
        let contents = format!("[anonymization]\nk = 1\n{MINIMAL}");
        assert!(matches!(
            parse_config(&contents),
            Err(PufError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_missing_source_section() {
        let contents = MINIMAL.replace("[source.csv]\ndirectory = \"data\"\n", "");
        assert!(matches!(
            parse_config(&contents),
            Err(PufError::Configuration(_))
        ));
    }
}
