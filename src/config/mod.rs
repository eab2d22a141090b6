//! Configuration management
//!
//! Optional TOML configuration with environment variable substitution and
//! `DRAIN_*` overrides. CLI flags take precedence over everything here.

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{DrainConfig, ExportSettings, LoggingConfig, RetrySettings};
