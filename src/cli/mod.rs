//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for drain using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Drain - Cognito User Pool export toolkit
#[derive(Parser, Debug)]
#[command(name = "drain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "drain.toml", env = "DRAIN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DRAIN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export user records from a Cognito User Pool to CSV
    Export(commands::export::ExportArgs),

    /// Remove duplicate rows from an exported CSV
    Dedup(commands::dedup::DedupArgs),
}
