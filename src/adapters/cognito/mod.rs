//! Cognito Identity Provider adapter

pub mod client;

pub use client::{CognitoDirectory, ListingScope};
