//! CSV deduplication engine
//!
//! Streams the input in file order, tracking the key tuples already seen.
//! Keep-first emits a row the first time its key appears; keep-last buffers
//! the input, retains the final occurrence of each key and emits in
//! first-seen key order. A row that cannot form a key is a hard error.

use crate::domain::DedupError;
use csv::StringRecord;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Which occurrence of a duplicated key survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepMode {
    /// Keep the first row seen per key (streaming)
    #[default]
    First,

    /// Keep the last row seen per key (buffers the input)
    Last,
}

/// Deduplication run parameters.
#[derive(Debug, Clone)]
pub struct DedupOptions {
    /// Input CSV path
    pub input: PathBuf,

    /// Output CSV path; derived from the input when absent
    pub output: Option<PathBuf>,

    /// Columns forming the duplicate key, in order
    pub key_columns: Vec<String>,

    /// Which occurrence to keep
    pub keep: KeepMode,

    /// Report counts without writing anything
    pub dry_run: bool,
}

impl DedupOptions {
    /// Options with the conventional defaults: key on `sub`, keep-first.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            key_columns: vec!["sub".to_string()],
            keep: KeepMode::First,
            dry_run: false,
        }
    }

    /// Explicit output path, or `{stem}_deduplicated{.ext}` next to the
    /// input. The input is never overwritten silently.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => derived_output_path(&self.input),
        }
    }
}

/// `users.csv` becomes `users_deduplicated.csv`.
pub fn derived_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_deduplicated.{ext}"),
        None => format!("{stem}_deduplicated"),
    };
    input.with_file_name(name)
}

/// Counters reported by a deduplication run.
#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    /// Data rows read from the input (header excluded)
    pub total_rows: u64,

    /// Distinct key tuples seen
    pub unique_keys: u64,

    /// Key tuples that occurred more than once
    pub duplicate_keys: u64,

    /// Rows written to the output (0 in dry-run mode)
    pub rows_written: u64,

    /// Output path, `None` in dry-run mode
    pub output: Option<PathBuf>,
}

impl DedupReport {
    /// Rows a real run drops (or dropped): everything beyond the first
    /// occurrence of each key.
    pub fn duplicate_rows(&self) -> u64 {
        self.total_rows.saturating_sub(self.unique_keys)
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total_rows = self.total_rows,
            unique_keys = self.unique_keys,
            duplicate_keys = self.duplicate_keys,
            rows_removed = self.duplicate_rows(),
            dry_run = self.output.is_none(),
            "Deduplication completed"
        );
    }
}

type KeyTuple = Vec<String>;

/// Deduplicates `options.input` according to `options`.
pub fn deduplicate(options: &DedupOptions) -> Result<DedupReport, DedupError> {
    if !options.input.exists() {
        return Err(DedupError::InputNotFound(
            options.input.display().to_string(),
        ));
    }

    let mut reader = csv::Reader::from_path(&options.input)
        .map_err(|e| DedupError::Io(format!("failed to open {}: {e}", options.input.display())))?;
    let headers = reader
        .headers()
        .map_err(|e| DedupError::Io(e.to_string()))?
        .clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(DedupError::EmptyInput);
    }

    let key_indices = resolve_key_indices(&headers, &options.key_columns)?;

    if options.dry_run {
        return count_duplicates(&mut reader, &key_indices);
    }

    let output = options.output_path();
    if output == options.input {
        return Err(DedupError::OutputCollidesWithInput(
            output.display().to_string(),
        ));
    }

    match options.keep {
        KeepMode::First => keep_first(&mut reader, &headers, &key_indices, &output),
        KeepMode::Last => keep_last(&mut reader, &headers, &key_indices, &output),
    }
}

/// Maps configured key column names to header indices, failing fast when any
/// are missing.
fn resolve_key_indices(
    headers: &StringRecord,
    key_columns: &[String],
) -> Result<Vec<usize>, DedupError> {
    let available: Vec<String> = headers.iter().map(str::to_string).collect();
    let mut indices = Vec::with_capacity(key_columns.len());
    let mut missing = Vec::new();

    for column in key_columns {
        match available.iter().position(|header| header == column) {
            Some(index) => indices.push(index),
            None => missing.push(column.clone()),
        }
    }

    if !missing.is_empty() {
        return Err(DedupError::MissingKeyColumns { missing, available });
    }
    Ok(indices)
}

fn read_row(
    result: std::result::Result<StringRecord, csv::Error>,
    row: u64,
) -> Result<StringRecord, DedupError> {
    result.map_err(|e| DedupError::MalformedRow {
        row,
        message: e.to_string(),
    })
}

fn key_for(record: &StringRecord, indices: &[usize], row: u64) -> Result<KeyTuple, DedupError> {
    indices
        .iter()
        .map(|&index| {
            record
                .get(index)
                .map(str::to_string)
                .ok_or_else(|| DedupError::MalformedRow {
                    row,
                    message: format!(
                        "row has {} fields, key column index {index} is out of range",
                        record.len()
                    ),
                })
        })
        .collect()
}

fn count_duplicates(
    reader: &mut csv::Reader<std::fs::File>,
    key_indices: &[usize],
) -> Result<DedupReport, DedupError> {
    let mut seen: HashSet<KeyTuple> = HashSet::new();
    let mut duplicated: HashSet<KeyTuple> = HashSet::new();
    let mut total_rows = 0u64;

    for result in reader.records() {
        total_rows += 1;
        let record = read_row(result, total_rows)?;
        let key = key_for(&record, key_indices, total_rows)?;
        if !seen.insert(key.clone()) {
            duplicated.insert(key);
        }
    }

    Ok(DedupReport {
        total_rows,
        unique_keys: seen.len() as u64,
        duplicate_keys: duplicated.len() as u64,
        rows_written: 0,
        output: None,
    })
}

fn keep_first(
    reader: &mut csv::Reader<std::fs::File>,
    headers: &StringRecord,
    key_indices: &[usize],
    output: &Path,
) -> Result<DedupReport, DedupError> {
    let mut writer = csv::Writer::from_path(output)
        .map_err(|e| DedupError::Io(format!("failed to create {}: {e}", output.display())))?;
    writer
        .write_record(headers)
        .map_err(|e| DedupError::Io(e.to_string()))?;

    let mut seen: HashSet<KeyTuple> = HashSet::new();
    let mut duplicated: HashSet<KeyTuple> = HashSet::new();
    let mut total_rows = 0u64;
    let mut rows_written = 0u64;

    for result in reader.records() {
        total_rows += 1;
        let record = read_row(result, total_rows)?;
        let key = key_for(&record, key_indices, total_rows)?;
        if seen.insert(key.clone()) {
            writer
                .write_record(&record)
                .map_err(|e| DedupError::Io(e.to_string()))?;
            rows_written += 1;
        } else {
            duplicated.insert(key);
        }
    }

    writer.flush().map_err(|e| DedupError::Io(e.to_string()))?;

    Ok(DedupReport {
        total_rows,
        unique_keys: seen.len() as u64,
        duplicate_keys: duplicated.len() as u64,
        rows_written,
        output: Some(output.to_path_buf()),
    })
}

fn keep_last(
    reader: &mut csv::Reader<std::fs::File>,
    headers: &StringRecord,
    key_indices: &[usize],
    output: &Path,
) -> Result<DedupReport, DedupError> {
    // First-seen order of each key, with the surviving (last) row per key.
    let mut order: Vec<KeyTuple> = Vec::new();
    let mut survivors: HashMap<KeyTuple, StringRecord> = HashMap::new();
    let mut duplicated: HashSet<KeyTuple> = HashSet::new();
    let mut total_rows = 0u64;

    for result in reader.records() {
        total_rows += 1;
        let record = read_row(result, total_rows)?;
        let key = key_for(&record, key_indices, total_rows)?;
        match survivors.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                entry.insert(record);
                duplicated.insert(key);
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                order.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_path(output)
        .map_err(|e| DedupError::Io(format!("failed to create {}: {e}", output.display())))?;
    writer
        .write_record(headers)
        .map_err(|e| DedupError::Io(e.to_string()))?;

    let mut rows_written = 0u64;
    for key in &order {
        if let Some(record) = survivors.get(key) {
            writer
                .write_record(record)
                .map_err(|e| DedupError::Io(e.to_string()))?;
            rows_written += 1;
        }
    }

    writer.flush().map_err(|e| DedupError::Io(e.to_string()))?;

    Ok(DedupReport {
        total_rows,
        unique_keys: order.len() as u64,
        duplicate_keys: duplicated.len() as u64,
        rows_written,
        output: Some(output.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_output_path_keeps_extension() {
        assert_eq!(
            derived_output_path(Path::new("exports/users.csv")),
            Path::new("exports/users_deduplicated.csv")
        );
    }

    #[test]
    fn test_derived_output_path_without_extension() {
        assert_eq!(
            derived_output_path(Path::new("users")),
            Path::new("users_deduplicated")
        );
    }

    #[test]
    fn test_resolve_key_indices_in_key_order() {
        let headers = StringRecord::from(vec!["sub", "email", "name"]);
        let keys = vec!["email".to_string(), "sub".to_string()];
        assert_eq!(resolve_key_indices(&headers, &keys).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_resolve_key_indices_reports_all_missing_columns() {
        let headers = StringRecord::from(vec!["sub", "email"]);
        let keys = vec!["sub".to_string(), "phone".to_string(), "name".to_string()];
        match resolve_key_indices(&headers, &keys) {
            Err(DedupError::MissingKeyColumns { missing, available }) => {
                assert_eq!(missing, vec!["phone".to_string(), "name".to_string()]);
                assert_eq!(available, vec!["sub".to_string(), "email".to_string()]);
            }
            other => panic!("expected MissingKeyColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_key_for_extracts_tuple_in_order() {
        let record = StringRecord::from(vec!["1", "a@x.com", "Alice"]);
        let key = key_for(&record, &[2, 0], 1).unwrap();
        assert_eq!(key, vec!["Alice".to_string(), "1".to_string()]);
    }
}
