//! External integrations
//!
//! Adapters for the Cognito Identity Provider directory and S3 uploads.
//! Everything behind these modules speaks the domain types; SDK error types
//! never cross the boundary.

pub mod cognito;
pub mod directory;
pub mod s3;
