//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the optional
//! `drain.toml` file. Every field has a default, so a missing file is valid.

use serde::{Deserialize, Serialize};

/// Root drain configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Retry/backoff tuning for throttled directory calls
    pub retry: RetrySettings,

    /// Export loop tuning
    pub export: ExportSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl DrainConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.retry.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Retry configuration for throttled directory calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub base_delay_ms: u64,

    /// Upper bound on the computed delay, in milliseconds
    pub max_delay_ms: u64,

    /// Uniform jitter fraction applied to each computed delay
    pub jitter: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 8,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter: 0.25,
        }
    }
}

impl RetrySettings {
    fn validate(&self) -> Result<(), String> {
        if self.base_delay_ms == 0 {
            return Err("retry.base_delay_ms must be greater than zero".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("retry.max_delay_ms must be at least retry.base_delay_ms".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err("retry.jitter must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }
}

/// Export loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Records requested per page (the directory API caps this at 60)
    pub page_size: i32,

    /// Fixed pause between successful directory calls, in milliseconds
    pub request_pacing_ms: u64,

    /// Checkpoint after this many pages since the last checkpoint
    pub checkpoint_page_interval: u64,

    /// Checkpoint after this many records since the last checkpoint
    pub checkpoint_record_interval: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            page_size: 60,
            request_pacing_ms: 200,
            checkpoint_page_interval: 10,
            checkpoint_record_interval: 500,
        }
    }
}

impl ExportSettings {
    fn validate(&self) -> Result<(), String> {
        if !(1..=60).contains(&self.page_size) {
            return Err("export.page_size must be between 1 and 60".to_string());
        }
        if self.checkpoint_page_interval == 0 {
            return Err("export.checkpoint_page_interval must be greater than zero".to_string());
        }
        if self.checkpoint_record_interval == 0 {
            return Err("export.checkpoint_record_interval must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a JSON log file in addition to console output
    pub file_enabled: bool,

    /// Directory for rotated log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            directory: "logs".to_string(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file_enabled && self.directory.trim().is_empty() {
            return Err("logging.directory must be set when logging.file_enabled is true".to_string());
        }
        Ok(())
    }
}
