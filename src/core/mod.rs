//! Core business logic
//!
//! The export driver and its retry policy, checkpoint state for resumable
//! runs, and the CSV deduplication engine.

pub mod dedup;
pub mod export;
pub mod retry;
pub mod state;
