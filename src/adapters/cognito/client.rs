//! Cognito Identity Provider backend
//!
//! Maps the `ListUsers`, `ListUsersInGroup` and `DescribeUserPool` calls
//! onto the [`UserDirectory`] trait and translates SDK errors into the
//! domain taxonomy. SDK-level automatic retries are disabled; throttling is
//! handled by the exporter's own backoff policy so the retry schedule stays
//! observable and configurable in one place.

use crate::adapters::directory::UserDirectory;
use crate::domain::{DirectoryError, PoolInfo, UserPage, UserPoolId, UserRecord};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::types::UserType;
use aws_sdk_cognitoidentityprovider::Client;
use chrono::{DateTime, Utc};

/// Error codes the directory service uses for rate limiting.
const THROTTLING_CODES: &[&str] = &[
    "ThrottlingException",
    "TooManyRequestsException",
    "Throttling",
    "LimitExceededException",
];

/// How the users of a pool are enumerated.
#[derive(Debug, Clone, Default)]
pub enum ListingScope {
    /// Every user in the pool
    #[default]
    All,

    /// Users matching a server-side filter expression
    Filtered(String),

    /// Members of a named group
    Group(String),
}

/// [`UserDirectory`] implementation backed by the Cognito Identity Provider
/// API. Credentials, region and profile resolve through the standard AWS
/// configuration chain.
pub struct CognitoDirectory {
    client: Client,
    pool_id: UserPoolId,
    scope: ListingScope,
}

impl CognitoDirectory {
    /// Connects using the default AWS credential chain.
    pub async fn connect(
        pool_id: UserPoolId,
        region: &str,
        profile: Option<&str>,
        scope: ListingScope,
    ) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
            pool_id,
            scope,
        }
    }

    /// The pool this directory reads from
    pub fn pool_id(&self) -> &UserPoolId {
        &self.pool_id
    }

    /// Flattens one SDK user into a domain record. Root-level fields share
    /// the attribute namespace with the entries of the attributes list.
    fn record_from_user(user: &UserType) -> UserRecord {
        let mut record = UserRecord::new();

        if let Some(username) = user.username() {
            record.set("Username", username);
        }
        record.set("Enabled", if user.enabled() { "true" } else { "false" });
        if let Some(status) = user.user_status() {
            record.set("UserStatus", status.as_str());
        }
        if let Some(created) = user.user_create_date() {
            record.set("UserCreateDate", format_timestamp(created));
        }
        if let Some(modified) = user.user_last_modified_date() {
            record.set("UserLastModifiedDate", format_timestamp(modified));
        }

        for attribute in user.attributes() {
            record.set(attribute.name(), attribute.value().unwrap_or_default());
        }

        record
    }
}

#[async_trait]
impl UserDirectory for CognitoDirectory {
    async fn list_users(
        &self,
        pagination_token: Option<String>,
        page_size: i32,
    ) -> Result<UserPage, DirectoryError> {
        match &self.scope {
            ListingScope::Group(group) => {
                let output = self
                    .client
                    .list_users_in_group()
                    .user_pool_id(self.pool_id.as_str())
                    .group_name(group)
                    .limit(page_size)
                    .set_next_token(pagination_token)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(&e))?;

                Ok(UserPage {
                    users: output.users().iter().map(Self::record_from_user).collect(),
                    next_token: output.next_token().map(str::to_string),
                })
            }
            scope => {
                let filter = match scope {
                    ListingScope::Filtered(expression) => Some(expression.clone()),
                    _ => None,
                };
                let output = self
                    .client
                    .list_users()
                    .user_pool_id(self.pool_id.as_str())
                    .limit(page_size)
                    .set_pagination_token(pagination_token)
                    .set_filter(filter)
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(&e))?;

                Ok(UserPage {
                    users: output.users().iter().map(Self::record_from_user).collect(),
                    next_token: output.pagination_token().map(str::to_string),
                })
            }
        }
    }

    async fn describe_pool(&self) -> Result<PoolInfo, DirectoryError> {
        let output = self
            .client
            .describe_user_pool()
            .user_pool_id(self.pool_id.as_str())
            .send()
            .await
            .map_err(|e| map_sdk_error(&e))?;

        let pool = output.user_pool();
        Ok(PoolInfo {
            id: self.pool_id.as_str().to_string(),
            name: pool.and_then(|p| p.name()).map(str::to_string),
            estimated_users: pool.map(|p| p.estimated_number_of_users()),
        })
    }
}

/// Translates an SDK error into the domain taxonomy. Errors without service
/// metadata (DNS failures, timeouts) never carried a throttling code, so
/// they classify as connection failures.
fn map_sdk_error<E, R>(err: &SdkError<E, R>) -> DirectoryError
where
    E: ProvideErrorMetadata,
    SdkError<E, R>: std::fmt::Display,
{
    match err.as_service_error() {
        Some(service) => {
            let code = service.code().unwrap_or("Unknown").to_string();
            let message = service
                .message()
                .unwrap_or("no message from service")
                .to_string();
            classify_service_error(&code, message)
        }
        None => DirectoryError::ConnectionFailed(err.to_string()),
    }
}

fn classify_service_error(code: &str, message: String) -> DirectoryError {
    if THROTTLING_CODES.contains(&code) {
        return DirectoryError::Throttled {
            code: code.to_string(),
            message,
        };
    }
    match code {
        "ResourceNotFoundException" => DirectoryError::PoolNotFound(message),
        "NotAuthorizedException" | "AccessDeniedException" => DirectoryError::AccessDenied(message),
        _ => DirectoryError::Api {
            code: code.to_string(),
            message,
        },
    }
}

fn format_timestamp(ts: &aws_sdk_cognitoidentityprovider::primitives::DateTime) -> String {
    DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.secs().to_string())
}
