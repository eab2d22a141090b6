//! Core domain types
//!
//! This module contains the domain model for drain: user records and pages,
//! validated identifiers, the error taxonomy and the crate-wide `Result`
//! alias.

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

pub use errors::{DedupError, DirectoryError, DrainError};
pub use ids::UserPoolId;
pub use record::{PoolInfo, UserPage, UserRecord};
pub use result::Result;
