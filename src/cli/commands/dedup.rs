//! Dedup command implementation
//!
//! This module implements the `dedup` command for removing duplicate rows
//! from an exported CSV file.

use crate::core::dedup::{deduplicate, DedupOptions, KeepMode};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the dedup command
#[derive(Args, Debug)]
pub struct DedupArgs {
    /// Input CSV file to deduplicate
    pub input: PathBuf,

    /// Output CSV file (defaults to `{input}_deduplicated.csv`)
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,

    /// Columns forming the duplicate key
    #[arg(short = 'k', long = "keys", num_args = 1.., default_values_t = vec![String::from("sub")])]
    pub keys: Vec<String>,

    /// Keep the last occurrence of each key instead of the first
    #[arg(long)]
    pub keep_last: bool,

    /// Report duplicate counts without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl DedupArgs {
    /// Execute the dedup command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input.display(), "Starting dedup command");

        let options = DedupOptions {
            input: self.input.clone(),
            output: self.output_file.clone(),
            key_columns: self.keys.clone(),
            keep: if self.keep_last {
                KeepMode::Last
            } else {
                KeepMode::First
            },
            dry_run: self.dry_run,
        };

        let report = match deduplicate(&options) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Deduplication failed");
                eprintln!("Deduplication failed: {e}");
                return Ok(1);
            }
        };

        report.log_summary();
        println!("📊 Deduplication Summary:");
        println!("  Total rows: {}", report.total_rows);
        println!("  Unique keys: {}", report.unique_keys);
        println!("  Duplicated keys: {}", report.duplicate_keys);
        println!("  Duplicate rows: {}", report.duplicate_rows());
        match &report.output {
            Some(path) => println!("  Output: {}", path.display()),
            None => println!("  Dry run - no changes made"),
        }

        println!();
        println!("✅ Deduplication completed!");
        Ok(0)
    }
}
