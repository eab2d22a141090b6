//! CSV deduplication
//!
//! Key-tuple based duplicate removal for exported CSV files.

pub mod engine;

pub use engine::{deduplicate, DedupOptions, DedupReport, KeepMode};
