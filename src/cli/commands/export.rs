//! Export command implementation
//!
//! This module implements the `export` command for exporting user records
//! from a Cognito User Pool to a CSV file.

use crate::adapters::cognito::{CognitoDirectory, ListingScope};
use crate::adapters::s3::S3Uploader;
use crate::config::DrainConfig;
use crate::core::export::{
    AttributeSelection, ExportOptions, Exporter, DIRECTORY_PAGE_LIMIT,
};
use crate::core::retry::RetryPolicy;
use crate::domain::UserPoolId;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// The user pool ID, e.g. us-east-1_Ab129faBb
    #[arg(long)]
    pub user_pool_id: String,

    /// AWS region hosting the pool
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// AWS profile to use
    #[arg(long)]
    pub profile: Option<String>,

    /// Attributes to export
    #[arg(
        short = 'a',
        long = "attributes",
        num_args = 1..,
        conflicts_with = "export_all",
        required_unless_present = "export_all"
    )]
    pub attributes: Vec<String>,

    /// Export every attribute discovered by sampling the pool
    #[arg(long)]
    pub export_all: bool,

    /// CSV output file
    #[arg(short = 'f', long, default_value = "CognitoUsers.csv")]
    pub file_name: PathBuf,

    /// Records per page (the directory API caps this at 60)
    #[arg(long, default_value_t = 60)]
    pub page_size: i32,

    /// Maximum number of records to export (0 for all)
    #[arg(long, default_value_t = 0)]
    pub max_records: u64,

    /// Server-side filter expression for the listing call
    #[arg(long, conflicts_with = "group_name")]
    pub filter_expression: Option<String>,

    /// Export only members of this group
    #[arg(long)]
    pub group_name: Option<String>,

    /// Pagination token to start from (for manually resumed exports)
    #[arg(long)]
    pub starting_token: Option<String>,

    /// Resume from the checkpoint saved by a previous interrupted run
    #[arg(long)]
    pub resume: bool,

    /// Override retry.max_retries from the configuration
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Override retry.base_delay_ms from the configuration
    #[arg(long)]
    pub base_delay_ms: Option<u64>,

    /// Upload the finished CSV to this S3 bucket
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// S3 object key (defaults to the output file name)
    #[arg(long, requires = "s3_bucket")]
    pub s3_key: Option<String>,

    /// Gzip-compress the CSV before uploading
    #[arg(long, requires = "s3_bucket")]
    pub compress: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config: &DrainConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        // Apply CLI overrides to the retry settings
        let mut config = config.clone();
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(base_delay_ms) = self.base_delay_ms {
            config.retry.base_delay_ms = base_delay_ms;
        }
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let pool_id = match UserPoolId::new(&self.user_pool_id) {
            Ok(pool_id) => pool_id,
            Err(e) => {
                tracing::error!(error = %e, "Invalid user pool id");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let scope = match (&self.filter_expression, &self.group_name) {
            (Some(expression), None) => ListingScope::Filtered(expression.clone()),
            (None, Some(group)) => ListingScope::Group(group.clone()),
            _ => ListingScope::All,
        };

        let selection = if self.export_all {
            AttributeSelection::DiscoverAll
        } else {
            AttributeSelection::Explicit(self.attributes.clone())
        };

        let mut options = ExportOptions::new(self.file_name.clone());
        options.page_size = self.page_size.clamp(1, DIRECTORY_PAGE_LIMIT);
        options.max_records = self.max_records;
        options.request_pacing = Duration::from_millis(config.export.request_pacing_ms);
        options.checkpoint_page_interval = config.export.checkpoint_page_interval;
        options.checkpoint_record_interval = config.export.checkpoint_record_interval;
        options.resume = self.resume;
        options.starting_token = self.starting_token.clone();

        let policy = RetryPolicy::from_settings(&config.retry);

        tracing::info!(pool_id = %pool_id, region = %self.region, "Connecting to Cognito");
        let directory = Arc::new(
            CognitoDirectory::connect(pool_id, &self.region, self.profile.as_deref(), scope).await,
        );

        let exporter = Exporter::new(directory, selection, policy, options);

        println!("🚀 Starting export...");
        let summary = match exporter.run().await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                eprintln!("Run the same command with --resume to continue from the last checkpoint.");
                return Ok(1);
            }
        };

        summary.log_summary();
        println!();
        println!("📊 Export Summary:");
        println!("  Records: {}", summary.records_exported);
        println!("  Pages: {}", summary.pages_processed);
        println!("  Attributes: {}", summary.attribute_count);
        println!("  Output: {}", summary.output.display());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        if summary.records_exported > 0 {
            println!("  Rate: {:.1} records/s", summary.records_per_second());
        }

        if let Some(bucket) = &self.s3_bucket {
            let uploader = S3Uploader::connect(&self.region, self.profile.as_deref()).await;
            match uploader
                .upload_file(&self.file_name, bucket, self.s3_key.as_deref(), self.compress)
                .await
            {
                Ok(key) => println!("  Uploaded: s3://{bucket}/{key}"),
                Err(e) => {
                    tracing::error!(error = %e, "S3 upload failed");
                    eprintln!("S3 upload failed: {e}");
                    return Ok(1);
                }
            }
        }

        println!();
        println!("✅ Export completed successfully!");
        Ok(0)
    }
}
