//! Domain identifier types with validation
//!
//! Newtype wrappers for directory identifiers. A malformed pool id is a
//! fatal error and is rejected before any API call is made.

use crate::domain::errors::DrainError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User pool identifier newtype wrapper
///
/// Cognito pool ids have the shape `{region}_{suffix}`, e.g.
/// `us-east-1_Ab129faBb`.
///
/// # Examples
///
/// ```
/// use drain::domain::UserPoolId;
/// use std::str::FromStr;
///
/// let pool_id = UserPoolId::from_str("us-east-1_Ab129faBb").unwrap();
/// assert_eq!(pool_id.as_str(), "us-east-1_Ab129faBb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserPoolId(String);

impl UserPoolId {
    /// Creates a new UserPoolId from a string
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id does not have the
    /// `{region}_{suffix}` shape.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DrainError::Validation(
                "User pool id cannot be empty".to_string(),
            ));
        }

        let Some((region, suffix)) = id.split_once('_') else {
            return Err(DrainError::Validation(format!(
                "Invalid user pool id '{id}'. Expected format: {{region}}_{{suffix}}"
            )));
        };

        let region_ok =
            !region.is_empty() && region.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        let suffix_ok = !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_alphanumeric());

        if !region_ok || !suffix_ok {
            return Err(DrainError::Validation(format!(
                "Invalid user pool id '{id}'. Expected format: {{region}}_{{suffix}}"
            )));
        }

        Ok(Self(id))
    }

    /// Returns the pool id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The region prefix of the pool id
    pub fn region(&self) -> &str {
        self.0.split_once('_').map(|(region, _)| region).unwrap_or("")
    }
}

impl fmt::Display for UserPoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserPoolId {
    type Err = DrainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for UserPoolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("us-east-1_Ab129faBb"; "standard id")]
    #[test_case("eu-west-2_XXXXXXXXX"; "other region")]
    #[test_case("ap-southeast-1_1a2b3c"; "numeric suffix")]
    fn test_valid_pool_ids(id: &str) {
        let pool_id = UserPoolId::new(id).unwrap();
        assert_eq!(pool_id.as_str(), id);
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace")]
    #[test_case("useast1AbCdEf"; "no separator")]
    #[test_case("_AbCdEf"; "empty region")]
    #[test_case("us-east-1_"; "empty suffix")]
    #[test_case("us-east-1_Ab12 9faBb"; "space in suffix")]
    fn test_invalid_pool_ids(id: &str) {
        assert!(UserPoolId::new(id).is_err());
    }

    #[test]
    fn test_region_prefix() {
        let pool_id = UserPoolId::new("us-east-1_Ab129faBb").unwrap();
        assert_eq!(pool_id.region(), "us-east-1");
    }

    #[test]
    fn test_display_and_from_str() {
        let pool_id: UserPoolId = "us-east-1_Ab129faBb".parse().unwrap();
        assert_eq!(pool_id.to_string(), "us-east-1_Ab129faBb");
    }
}
