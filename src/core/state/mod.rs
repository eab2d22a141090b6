//! Export state management
//!
//! Checkpoint persistence for resumable exports.

pub mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointStore};
