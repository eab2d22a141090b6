//! CSV output writer
//!
//! Every field is quoted so attribute values survive as opaque strings
//! (leading zeros, embedded delimiters, and so on). Append mode skips the
//! header so it appears exactly once per file across resumed runs.

use crate::domain::{DrainError, Result};
use csv::{QuoteStyle, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Buffered CSV writer for export rows.
pub struct OutputWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: u64,
}

impl OutputWriter {
    /// Creates (truncating) the output file and writes the header row.
    pub fn create(path: &Path, header: &[String]) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            DrainError::Io(format!("failed to create {}: {e}", path.display()))
        })?;
        let mut writer = Self::build_writer(file, path);
        writer
            .writer
            .write_record(header)
            .map_err(|e| DrainError::Io(e.to_string()))?;
        Ok(writer)
    }

    /// Opens an existing output file in append mode, without a header.
    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().append(true).open(path).map_err(|e| {
            DrainError::Io(format!(
                "failed to open {} for append: {e}",
                path.display()
            ))
        })?;
        Ok(Self::build_writer(file, path))
    }

    fn build_writer(file: File, path: &Path) -> Self {
        let writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        Self {
            writer,
            path: path.to_path_buf(),
            rows_written: 0,
        }
    }

    /// Appends one projected record.
    pub fn write_row(&mut self, fields: &[String]) -> Result<()> {
        self.writer
            .write_record(fields)
            .map_err(|e| DrainError::Io(e.to_string()))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flushes buffered rows to disk. Called before every checkpoint write
    /// so a checkpoint never claims rows that are not durable.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            DrainError::Io(format!("failed to flush {}: {e}", self.path.display()))
        })
    }

    /// Rows written through this writer (excludes the header)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["sub".to_string(), "email".to_string()]
    }

    #[test]
    fn test_create_writes_quoted_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = OutputWriter::create(&path, &header()).unwrap();
        writer.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\"sub\",\"email\"\n");
    }

    #[test]
    fn test_rows_are_counted_and_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = OutputWriter::create(&path, &header()).unwrap();
        writer
            .write_row(&["1".to_string(), "a@x.com".to_string()])
            .unwrap();
        writer
            .write_row(&["2".to_string(), String::new()])
            .unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.rows_written(), 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "\"sub\",\"email\"\n\"1\",\"a@x.com\"\n\"2\",\"\"\n"
        );
    }

    #[test]
    fn test_append_does_not_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut writer = OutputWriter::create(&path, &header()).unwrap();
        writer
            .write_row(&["1".to_string(), "a@x.com".to_string()])
            .unwrap();
        writer.flush().unwrap();
        drop(writer);

        let mut appender = OutputWriter::append(&path).unwrap();
        appender
            .write_row(&["2".to_string(), "b@x.com".to_string()])
            .unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header_lines = contents
            .lines()
            .filter(|line| line.starts_with("\"sub\""))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        assert!(OutputWriter::append(&path).is_err());
    }
}
