//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Bound, SampleConfig};
use crate::domain::errors::SampleError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SampleConfig
/// 4. Applies environment variable overrides (ES_SAMPLE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, substitution or parsing fails,
/// or the configuration does not validate.
///
/// # Examples
///
/// ```no_run
/// use es_sample::config::loader::load_config;
///
/// let config = load_config("es-sample.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SampleConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SampleError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SampleError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;

    config.validate().map_err(|e| {
        SampleError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads the configuration file if it exists, otherwise starts from defaults
///
/// Environment overrides are applied either way. A missing file is only
/// tolerated when `required` is false (i.e. the default path was not
/// overridden by the user).
pub fn load_config_or_default(path: impl AsRef<Path>, required: bool) -> Result<SampleConfig> {
    let path = path.as_ref();
    if path.exists() || required {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "No configuration file, using defaults");
    let mut config = SampleConfig::default();
    apply_env_overrides(&mut config)?;
    config.store.normalize_host();
    Ok(config)
}

/// Parses TOML contents, substituting `${VAR}` references and applying overrides
pub fn parse_config(contents: &str) -> Result<SampleConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SampleConfig = toml::from_str(&contents)
        .map_err(|e| SampleError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;
    config.store.normalize_host();

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
        .map_err(|e| SampleError::Configuration(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SampleError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the ES_SAMPLE_* prefix
///
/// Variables follow the pattern ES_SAMPLE_<SECTION>_<KEY>, for example
/// ES_SAMPLE_STORE_HOST or ES_SAMPLE_EXPORT_PARALLELISM.
fn apply_env_overrides(config: &mut SampleConfig) -> Result<()> {
    if let Ok(val) = std::env::var("ES_SAMPLE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("ES_SAMPLE_STORE_HOST") {
        config.store.host = val;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_STORE_SCROLL") {
        config.store.scroll = val;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_STORE_TIMEOUT_SECONDS") {
        config.store.timeout_seconds = parse_env("ES_SAMPLE_STORE_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_STORE_TLS_VERIFY") {
        config.store.tls_verify = val.parse().unwrap_or(true);
    }

    if let Ok(val) = std::env::var("ES_SAMPLE_QUERY_SIZE") {
        config.query.size = parse_env("ES_SAMPLE_QUERY_SIZE", &val)?;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_QUERY_LIMIT") {
        config.query.limit = parse_env::<Bound>("ES_SAMPLE_QUERY_LIMIT", &val)?;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_QUERY_COUNT") {
        config.query.count = parse_env::<Bound>("ES_SAMPLE_QUERY_COUNT", &val)?;
    }

    if let Ok(val) = std::env::var("ES_SAMPLE_EXPORT_OUTPUT") {
        config.export.output = Some(val);
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_EXPORT_PARALLELISM") {
        config.export.parallelism = parse_env("ES_SAMPLE_EXPORT_PARALLELISM", &val)?;
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_EXPORT_QUEUE_SIZE") {
        config.export.queue_size = Some(parse_env("ES_SAMPLE_EXPORT_QUEUE_SIZE", &val)?);
    }

    if let Ok(val) = std::env::var("ES_SAMPLE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ES_SAMPLE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_env<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        SampleError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

// Serializes tests that touch or read process-wide environment variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ES_SAMPLE_TEST_HOST", "http://search:9200");
        let input = "host = \"${ES_SAMPLE_TEST_HOST}\"\n# ${NOT_SET_IN_COMMENT}\n";
        let output = substitute_env_vars(input).unwrap();
        assert!(output.contains("http://search:9200"));
        assert!(output.contains("${NOT_SET_IN_COMMENT}"));
        std::env::remove_var("ES_SAMPLE_TEST_HOST");
    }

    #[test]
    fn test_substitute_missing_var() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let err = substitute_env_vars("host = \"${ES_SAMPLE_DEFINITELY_UNSET}\"").unwrap_err();
        assert!(err.to_string().contains("ES_SAMPLE_DEFINITELY_UNSET"));
    }

    #[test]
    fn test_parse_config_normalizes_host() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = parse_config("[store]\nhost = \"http://search:9200//\"\n").unwrap();
        assert_eq!(config.store.host, "http://search:9200/");
    }

    #[test]
    fn test_env_override_wins_over_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ES_SAMPLE_QUERY_SIZE", "250");
        let config = parse_config("[query]\nsize = 10\n").unwrap();
        std::env::remove_var("ES_SAMPLE_QUERY_SIZE");
        assert_eq!(config.query.size, 250);
    }

    #[test]
    fn test_env_override_invalid_number() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("ES_SAMPLE_EXPORT_PARALLELISM", "many");
        let result = parse_config("");
        std::env::remove_var("ES_SAMPLE_EXPORT_PARALLELISM");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, SampleError::Configuration(_)));
    }

    #[test]
    fn test_load_config_or_default_missing_optional_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_config_or_default("/definitely/not/here.toml", false).unwrap();
        assert_eq!(config.query.size, 1000);
        assert!(load_config_or_default("/definitely/not/here.toml", true).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[query]\nsize = 2\ncount = \"-\"\nexisting = [[\"a.*\"]]\n\n[export]\nparallelism = 0\n"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.query.size, 2);
        assert_eq!(config.query.count, Bound::Unbounded);
        assert_eq!(config.query.existing, vec![vec!["a.*".to_string()]]);
        assert_eq!(config.export.parallelism, 0);
    }

    #[test]
    fn test_load_config_validation_failure() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\nsize = 0\n").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("query.size"));
    }
}
