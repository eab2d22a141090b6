// Drain - Cognito User Pool export toolkit
// Licensed under the MIT License

//! # Drain
//!
//! Drain exports user records from AWS Cognito User Pools to CSV and cleans
//! up the results.
//!
//! - **Export**: paginated retrieval with exponential-backoff retry on
//!   throttling, fixed pacing between calls, and a checkpoint sidecar that
//!   makes interrupted runs resumable without duplicating or losing rows.
//! - **Dedup**: key-tuple based CSV deduplication (keep-first or keep-last)
//!   with a dry-run mode that only reports counts.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export driver, retry, checkpoint state, dedup)
//! - [`adapters`] - External integrations (Cognito Identity Provider, S3)
//! - [`domain`] - Records, identifiers and the error taxonomy
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drain::adapters::cognito::{CognitoDirectory, ListingScope};
//! use drain::core::export::{AttributeSelection, ExportOptions, Exporter};
//! use drain::core::retry::RetryPolicy;
//! use drain::domain::UserPoolId;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool_id = UserPoolId::new("us-east-1_Ab129faBb")?;
//!     let directory = Arc::new(
//!         CognitoDirectory::connect(pool_id, "us-east-1", None, ListingScope::All).await,
//!     );
//!
//!     let exporter = Exporter::new(
//!         directory,
//!         AttributeSelection::DiscoverAll,
//!         RetryPolicy::default(),
//!         ExportOptions::new("CognitoUsers.csv"),
//!     );
//!
//!     let summary = exporter.run().await?;
//!     println!("Exported {} records", summary.records_exported);
//!     Ok(())
//! }
//! ```
//!
//! ## Resumable exports
//!
//! Every N pages (or M records) the exporter flushes the CSV file and then
//! persists a `{output}.checkpoint` sidecar with the pagination token and
//! counters. A run started with `--resume` picks the token back up, reopens
//! the output in append mode, and continues without duplicating the header
//! or any rows. The sidecar is deleted on successful completion.
//!
//! ## Error handling
//!
//! Drain uses [`domain::DrainError`] throughout. Throttling rejections from
//! the directory are the only retryable errors; everything else fails the
//! run immediately:
//!
//! ```rust
//! use drain::domain::DirectoryError;
//!
//! let err = DirectoryError::Throttled {
//!     code: "TooManyRequestsException".to_string(),
//!     message: "Rate exceeded".to_string(),
//! };
//! assert!(err.is_throttling());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
