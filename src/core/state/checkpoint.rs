//! Export checkpoint persistence
//!
//! The checkpoint sidecar records the pagination token and cumulative
//! counters so an interrupted export can resume without re-reading earlier
//! pages. It is written atomically (temp file + rename) and only after the
//! rows it accounts for have been flushed to the output file.

use crate::domain::{DrainError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the output path to derive the sidecar path.
pub const CHECKPOINT_SUFFIX: &str = "checkpoint";

/// Resume state for a paginated export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Token of the next page to fetch
    pub pagination_token: Option<String>,

    /// Records written to the output file so far
    pub records_exported: u64,

    /// Pages fully processed so far
    pub pages_processed: u64,

    /// Attribute columns of the output file. A resumed run reuses these so
    /// the header written before the interruption stays authoritative.
    pub attributes: Vec<String>,

    /// When this checkpoint was persisted
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current time.
    pub fn new(
        pagination_token: Option<String>,
        records_exported: u64,
        pages_processed: u64,
        attributes: Vec<String>,
    ) -> Self {
        Self {
            pagination_token,
            records_exported,
            pages_processed,
            attributes,
            saved_at: Utc::now(),
        }
    }
}

/// Loads and stores checkpoints in a sidecar file next to the export output.
///
/// Only one process is expected to own a sidecar at a time; there is no file
/// locking. Pointing concurrent exporters at the same output path is
/// documented misuse.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Sidecar store for an output file: `{output}.checkpoint`.
    pub fn for_output(output: &Path) -> Self {
        let mut sidecar = output.as_os_str().to_owned();
        sidecar.push(".");
        sidecar.push(CHECKPOINT_SUFFIX);
        Self {
            path: PathBuf::from(sidecar),
        }
    }

    /// Path of the sidecar file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint if the sidecar exists.
    pub fn load(&self) -> Result<Option<Checkpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            DrainError::Checkpoint(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let checkpoint = serde_json::from_str(&contents).map_err(|e| {
            DrainError::Checkpoint(format!("failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(checkpoint))
    }

    /// Persists the checkpoint atomically via a temp file rename.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        let tmp = self.path.with_extension(format!("{CHECKPOINT_SUFFIX}.tmp"));
        fs::write(&tmp, json).map_err(|e| {
            DrainError::Checkpoint(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            DrainError::Checkpoint(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        tracing::info!(
            path = %self.path.display(),
            records = checkpoint.records_exported,
            pages = checkpoint.pages_processed,
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Removes the sidecar. A missing file is not an error, so a completed
    /// run can always clear its resume state.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Checkpoint removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DrainError::Checkpoint(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
