//! User directory abstraction
//!
//! The exporter drives pagination through this trait so the listing backend
//! stays swappable (and fakeable in tests). Implementations translate their
//! transport errors into [`DirectoryError`], keeping throttling
//! distinguishable from fatal failures.

use crate::domain::{DirectoryError, PoolInfo, UserPage};
use async_trait::async_trait;

/// A paginated view of the users in a directory pool.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetches one page of users.
    ///
    /// A `pagination_token` of `None` starts at the beginning; a `None`
    /// token in the returned page means the listing is exhausted. Pages are
    /// lazy, finite and non-restartable: a token is only valid for the next
    /// call after the one that produced it.
    async fn list_users(
        &self,
        pagination_token: Option<String>,
        page_size: i32,
    ) -> Result<UserPage, DirectoryError>;

    /// Fetches metadata for the pool being exported.
    async fn describe_pool(&self) -> Result<PoolInfo, DirectoryError>;
}
