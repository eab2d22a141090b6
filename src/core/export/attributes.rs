//! Attribute selection and discovery
//!
//! When the caller asks for every attribute, the exporter samples a small
//! page of users and unions the attribute names it observes with a fixed
//! default list. Later pages may carry attributes absent from the sample;
//! that is a known limitation of sampling, not an error.

use crate::adapters::directory::UserDirectory;
use crate::core::retry::RetryPolicy;
use crate::domain::Result;
use std::collections::BTreeSet;

/// Attributes commonly present in a user pool.
///
/// Seeds discovery and serves as the fallback when sampling yields no users,
/// so the output header is never empty.
pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "sub",
    "Username",
    "email",
    "email_verified",
    "phone_number",
    "phone_number_verified",
    "name",
    "given_name",
    "family_name",
    "middle_name",
    "nickname",
    "preferred_username",
    "profile",
    "picture",
    "website",
    "gender",
    "birthdate",
    "zoneinfo",
    "locale",
    "address",
    "updated_at",
    "Enabled",
    "UserStatus",
    "UserCreateDate",
    "UserLastModifiedDate",
];

/// Number of records sampled when discovering attributes.
pub const DISCOVERY_SAMPLE_SIZE: i32 = 5;

/// How the caller selects the attribute set to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeSelection {
    /// Export exactly these attributes, in the given order
    Explicit(Vec<String>),

    /// Sample the pool and export every attribute observed
    DiscoverAll,
}

/// The fallback attribute list, sorted for a stable header order.
pub fn default_attributes() -> Vec<String> {
    let mut attributes: Vec<String> = DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
    attributes.sort_unstable();
    attributes
}

/// Discovers the attribute set by sampling one page of users.
///
/// Best-effort: a failed or empty sample falls back to
/// [`DEFAULT_ATTRIBUTES`]. The result is sorted and never empty.
pub async fn discover_attributes(
    directory: &dyn UserDirectory,
    policy: &RetryPolicy,
) -> Result<Vec<String>> {
    let page = match policy
        .run(|| directory.list_users(None, DISCOVERY_SAMPLE_SIZE))
        .await
    {
        Ok(page) => page,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "Attribute discovery failed, falling back to the default attribute list"
            );
            return Ok(default_attributes());
        }
    };

    if page.users.is_empty() {
        tracing::info!("No users found while sampling, using the default attribute list");
        return Ok(default_attributes());
    }

    let mut names: BTreeSet<String> = DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
    for user in &page.users {
        for name in user.attribute_names() {
            names.insert(name.to_string());
        }
    }

    let attributes: Vec<String> = names.into_iter().collect();
    tracing::info!(
        count = attributes.len(),
        sampled = page.users.len(),
        "Discovered attribute set"
    );
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DirectoryError, PoolInfo, UserPage, UserRecord};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubDirectory {
        page: Option<UserPage>,
    }

    #[async_trait]
    impl UserDirectory for StubDirectory {
        async fn list_users(
            &self,
            _pagination_token: Option<String>,
            _page_size: i32,
        ) -> std::result::Result<UserPage, DirectoryError> {
            match &self.page {
                Some(page) => Ok(page.clone()),
                None => Err(DirectoryError::AccessDenied("stubbed failure".to_string())),
            }
        }

        async fn describe_pool(&self) -> std::result::Result<PoolInfo, DirectoryError> {
            Ok(PoolInfo {
                id: "us-east-1_Stub".to_string(),
                name: None,
                estimated_users: None,
            })
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: 0.0,
        }
    }

    #[test]
    fn test_default_attributes_are_sorted_and_non_empty() {
        let attributes = default_attributes();
        assert!(!attributes.is_empty());
        let mut sorted = attributes.clone();
        sorted.sort_unstable();
        assert_eq!(attributes, sorted);
        assert!(attributes.contains(&"sub".to_string()));
    }

    #[tokio::test]
    async fn test_empty_sample_falls_back_to_defaults() {
        let directory = StubDirectory {
            page: Some(UserPage::default()),
        };
        let attributes = discover_attributes(&directory, &fast_policy())
            .await
            .unwrap();
        assert_eq!(attributes, default_attributes());
    }

    #[tokio::test]
    async fn test_sampling_error_falls_back_to_defaults() {
        let directory = StubDirectory { page: None };
        let attributes = discover_attributes(&directory, &fast_policy())
            .await
            .unwrap();
        assert_eq!(attributes, default_attributes());
    }

    #[tokio::test]
    async fn test_discovery_unions_sampled_attributes() {
        let user = UserRecord::new()
            .with_attribute("sub", "abc")
            .with_attribute("custom:tenant_id", "tenant-7");
        let directory = StubDirectory {
            page: Some(UserPage {
                users: vec![user],
                next_token: None,
            }),
        };

        let attributes = discover_attributes(&directory, &fast_policy())
            .await
            .unwrap();

        assert!(attributes.contains(&"custom:tenant_id".to_string()));
        assert!(attributes.contains(&"sub".to_string()));
        assert!(attributes.contains(&"email".to_string()));
        let mut sorted = attributes.clone();
        sorted.sort_unstable();
        assert_eq!(attributes, sorted);
    }
}
