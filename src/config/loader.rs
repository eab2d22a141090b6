//! Configuration loader with TOML parsing and environment variable overrides
//!
//! This module loads the optional `drain.toml` file:
//! 1. Reads the TOML file (a missing file yields defaults)
//! 2. Performs environment variable substitution (`${VAR}` syntax)
//! 3. Parses the TOML into [`DrainConfig`]
//! 4. Applies environment variable overrides (`DRAIN_*` prefix)
//! 5. Validates the configuration

use super::schema::DrainConfig;
use crate::domain::errors::DrainError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file.
///
/// A missing file is not an error: the tool is fully usable from CLI flags
/// alone, so defaults are returned and the absence logged at debug level.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<DrainConfig> {
    let path = path.as_ref();

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
        let config = DrainConfig::default();
        apply_env_overrides_checked(config)
    } else {
        let contents = fs::read_to_string(path).map_err(|e| {
            DrainError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let contents = substitute_env_vars(&contents)?;

        let config: DrainConfig = toml::from_str(&contents)
            .map_err(|e| DrainError::Configuration(format!("Failed to parse TOML: {}", e)))?;

        apply_env_overrides_checked(config)
    }
}

fn apply_env_overrides_checked(mut config: DrainConfig) -> Result<DrainConfig> {
    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        DrainError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line so placeholders in comments are left alone.
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
        return Err(DrainError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `DRAIN_*` prefix.
///
/// Variables follow the pattern `DRAIN_<SECTION>_<KEY>`, for example
/// `DRAIN_RETRY_MAX_RETRIES` or `DRAIN_EXPORT_PAGE_SIZE`.
fn apply_env_overrides(config: &mut DrainConfig) {
    // Retry overrides
    if let Ok(val) = std::env::var("DRAIN_RETRY_MAX_RETRIES") {
        if let Ok(parsed) = val.parse() {
            config.retry.max_retries = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_RETRY_BASE_DELAY_MS") {
        if let Ok(parsed) = val.parse() {
            config.retry.base_delay_ms = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_RETRY_MAX_DELAY_MS") {
        if let Ok(parsed) = val.parse() {
            config.retry.max_delay_ms = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_RETRY_JITTER") {
        if let Ok(parsed) = val.parse() {
            config.retry.jitter = parsed;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("DRAIN_EXPORT_PAGE_SIZE") {
        if let Ok(parsed) = val.parse() {
            config.export.page_size = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_EXPORT_REQUEST_PACING_MS") {
        if let Ok(parsed) = val.parse() {
            config.export.request_pacing_ms = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_EXPORT_CHECKPOINT_PAGE_INTERVAL") {
        if let Ok(parsed) = val.parse() {
            config.export.checkpoint_page_interval = parsed;
        }
    }
    if let Ok(val) = std::env::var("DRAIN_EXPORT_CHECKPOINT_RECORD_INTERVAL") {
        if let Ok(parsed) = val.parse() {
            config.export.checkpoint_record_interval = parsed;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("DRAIN_LOGGING_FILE_ENABLED") {
        config.logging.file_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("DRAIN_LOGGING_DIRECTORY") {
        config.logging.directory = val;
    }
}
