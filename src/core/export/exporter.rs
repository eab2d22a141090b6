//! Paginated export driver
//!
//! Walks the directory listing page by page, projecting each record onto the
//! attribute set and appending it to the CSV output. Throttling errors are
//! retried with exponential backoff; a fixed pacing delay sits between
//! successful calls. Progress is checkpointed every N pages or M records,
//! whichever comes first, and only after the corresponding rows have been
//! flushed, so a resumed run never loses rows the checkpoint claims are
//! done.

use crate::adapters::directory::UserDirectory;
use crate::core::export::attributes::{discover_attributes, AttributeSelection};
use crate::core::export::summary::ExportSummary;
use crate::core::export::writer::OutputWriter;
use crate::core::retry::RetryPolicy;
use crate::core::state::{Checkpoint, CheckpointStore};
use crate::domain::{DrainError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest page size the directory listing API accepts.
pub const DIRECTORY_PAGE_LIMIT: i32 = 60;

/// Tuning knobs for the export loop.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// CSV output path; the checkpoint sidecar lives next to it
    pub output_file: PathBuf,

    /// Records requested per page, capped at [`DIRECTORY_PAGE_LIMIT`]
    pub page_size: i32,

    /// Stop after this many records; 0 exports everything
    pub max_records: u64,

    /// Fixed pause between successful directory calls
    pub request_pacing: Duration,

    /// Checkpoint after this many pages since the last checkpoint
    pub checkpoint_page_interval: u64,

    /// Checkpoint after this many records since the last checkpoint
    pub checkpoint_record_interval: u64,

    /// Resume from the checkpoint sidecar if present
    pub resume: bool,

    /// Explicit pagination token; wins over the checkpoint token
    pub starting_token: Option<String>,
}

impl ExportOptions {
    /// Defaults matching the directory API limits and a conservative
    /// checkpoint cadence.
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        Self {
            output_file: output_file.into(),
            page_size: DIRECTORY_PAGE_LIMIT,
            max_records: 0,
            request_pacing: Duration::from_millis(200),
            checkpoint_page_interval: 10,
            checkpoint_record_interval: 500,
            resume: false,
            starting_token: None,
        }
    }
}

/// Drives a paginated export of one user pool to a CSV file.
pub struct Exporter {
    directory: Arc<dyn UserDirectory>,
    selection: AttributeSelection,
    policy: RetryPolicy,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        selection: AttributeSelection,
        policy: RetryPolicy,
        options: ExportOptions,
    ) -> Self {
        Self {
            directory,
            selection,
            policy,
            options,
        }
    }

    /// Runs the export to completion.
    ///
    /// On a fatal directory error the current progress is checkpointed
    /// before the error propagates, so the run can be resumed. On success
    /// the checkpoint sidecar is removed to prevent accidental stale
    /// resumes.
    pub async fn run(&self) -> Result<ExportSummary> {
        let started = Instant::now();
        let store = CheckpointStore::for_output(&self.options.output_file);

        // Surface a bad pool id or missing permissions before touching the
        // output file.
        let pool = self
            .policy
            .run(|| self.directory.describe_pool())
            .await
            .map_err(DrainError::from)?;
        tracing::info!(
            pool_id = %pool.id,
            pool_name = pool.name.as_deref().unwrap_or("-"),
            estimated_users = ?pool.estimated_users,
            "Connected to user pool"
        );

        let checkpoint = if self.options.resume {
            store.load()?
        } else {
            None
        };
        if self.options.resume && checkpoint.is_none() {
            tracing::warn!("No checkpoint found, starting export from the beginning");
        }
        let resumed = checkpoint.is_some();

        let mut token: Option<String>;
        let mut records_exported: u64;
        let mut pages_processed: u64;
        let attributes: Vec<String>;

        match checkpoint {
            Some(cp) => {
                tracing::info!(
                    records = cp.records_exported,
                    pages = cp.pages_processed,
                    saved_at = %cp.saved_at,
                    "Resuming export from checkpoint"
                );
                token = cp.pagination_token;
                records_exported = cp.records_exported;
                pages_processed = cp.pages_processed;
                attributes = cp.attributes;
            }
            None => {
                token = None;
                records_exported = 0;
                pages_processed = 0;
                attributes = match &self.selection {
                    AttributeSelection::Explicit(attrs) => attrs.clone(),
                    AttributeSelection::DiscoverAll => {
                        discover_attributes(self.directory.as_ref(), &self.policy).await?
                    }
                };
            }
        }

        if let Some(explicit) = &self.options.starting_token {
            token = Some(explicit.clone());
        }

        if attributes.is_empty() {
            return Err(DrainError::Export(
                "attribute set is empty, nothing to export".to_string(),
            ));
        }
        tracing::info!(
            count = attributes.len(),
            first = ?&attributes[..attributes.len().min(5)],
            "Exporting attributes"
        );

        let mut writer = if resumed {
            OutputWriter::append(&self.options.output_file)?
        } else {
            OutputWriter::create(&self.options.output_file, &attributes)?
        };

        let page_size = self.options.page_size.clamp(1, DIRECTORY_PAGE_LIMIT);
        let mut last_checkpoint_records = records_exported;
        let mut last_checkpoint_pages = pages_processed;

        loop {
            let request_token = token.clone();
            let page = match self
                .policy
                .run(|| self.directory.list_users(request_token.clone(), page_size))
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    // Leave a resume point behind before surfacing the failure.
                    writer.flush()?;
                    if token.is_some() {
                        let cp = Checkpoint::new(
                            token.clone(),
                            records_exported,
                            pages_processed,
                            attributes.clone(),
                        );
                        if let Err(save_err) = store.save(&cp) {
                            tracing::error!(
                                error = %save_err,
                                "Failed to save checkpoint after fetch error"
                            );
                        }
                    }
                    return Err(err.into());
                }
            };

            if page.users.is_empty() && page.next_token.is_some() {
                tracing::warn!("Directory returned an empty page with a continuation token");
            }

            for user in &page.users {
                writer.write_row(&user.project(&attributes))?;
                records_exported += 1;

                if self.options.max_records > 0 && records_exported >= self.options.max_records {
                    tracing::info!(
                        max_records = self.options.max_records,
                        "Record limit reached"
                    );
                    writer.flush()?;
                    store.remove()?;
                    return Ok(self.summary(
                        records_exported,
                        pages_processed + 1,
                        attributes.len(),
                        resumed,
                        started,
                    ));
                }
            }

            pages_processed += 1;
            tracing::info!(
                page = pages_processed,
                records = records_exported,
                "Processed page"
            );

            token = page.next_token;
            if token.is_none() {
                break;
            }

            let checkpoint_due = pages_processed - last_checkpoint_pages
                >= self.options.checkpoint_page_interval
                || records_exported - last_checkpoint_records
                    >= self.options.checkpoint_record_interval;
            if checkpoint_due {
                writer.flush()?;
                let cp = Checkpoint::new(
                    token.clone(),
                    records_exported,
                    pages_processed,
                    attributes.clone(),
                );
                store.save(&cp)?;
                last_checkpoint_records = records_exported;
                last_checkpoint_pages = pages_processed;
            }

            if !self.options.request_pacing.is_zero() {
                tokio::time::sleep(self.options.request_pacing).await;
            }
        }

        writer.flush()?;
        // A stale sidecar would silently resume a finished export.
        store.remove()?;
        tracing::info!("End of user pool reached");

        Ok(self.summary(
            records_exported,
            pages_processed,
            attributes.len(),
            resumed,
            started,
        ))
    }

    fn summary(
        &self,
        records_exported: u64,
        pages_processed: u64,
        attribute_count: usize,
        resumed: bool,
        started: Instant,
    ) -> ExportSummary {
        ExportSummary {
            records_exported,
            pages_processed,
            attribute_count,
            resumed,
            duration: started.elapsed(),
            output: self.options.output_file.clone(),
        }
    }
}
