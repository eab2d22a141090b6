//! Shared test fixtures: a scripted in-memory user directory.

#![allow(dead_code)]

use async_trait::async_trait;
use drain::adapters::directory::UserDirectory;
use drain::core::export::ExportOptions;
use drain::core::retry::RetryPolicy;
use drain::domain::{DirectoryError, PoolInfo, UserPage, UserRecord};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// In-memory [`UserDirectory`] with scripted pages and error injection.
///
/// Pages are keyed by the pagination token that requests them: `None` maps
/// to the first page, `token-1` to the second, and so on.
pub struct FakeDirectory {
    pages: HashMap<Option<String>, UserPage>,
    total_users: i32,
    /// Tokens that fail with a throttling error this many times before
    /// succeeding.
    throttles: Mutex<HashMap<Option<String>, u32>>,
    /// Tokens that always fail with a fatal error.
    broken: HashSet<Option<String>>,
}

impl FakeDirectory {
    /// Builds a directory serving `page_sizes.len()` pages with the given
    /// number of users each. User `i` of page `p` has a stable `sub`,
    /// `email` and `Username`.
    pub fn with_pages(page_sizes: &[usize]) -> Self {
        let mut pages = HashMap::new();
        let mut total_users = 0i32;

        for (page_index, &size) in page_sizes.iter().enumerate() {
            let users: Vec<UserRecord> = (0..size).map(|i| sample_user(page_index, i)).collect();
            total_users += size as i32;

            let request_token = token_for_page(page_index);
            let next_token = if page_index + 1 < page_sizes.len() {
                token_for_page(page_index + 1)
            } else {
                None
            };
            pages.insert(request_token, UserPage { users, next_token });
        }

        Self {
            pages,
            total_users,
            throttles: Mutex::new(HashMap::new()),
            broken: HashSet::new(),
        }
    }

    /// Makes the page requested by `token` throttle `times` times before
    /// succeeding.
    pub fn throttle(self, token: Option<&str>, times: u32) -> Self {
        self.throttles
            .lock()
            .unwrap()
            .insert(token.map(str::to_string), times);
        self
    }

    /// Makes the page requested by `token` fail fatally on every call.
    pub fn break_at(mut self, token: Option<&str>) -> Self {
        self.broken.insert(token.map(str::to_string));
        self
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn list_users(
        &self,
        pagination_token: Option<String>,
        _page_size: i32,
    ) -> Result<UserPage, DirectoryError> {
        if self.broken.contains(&pagination_token) {
            return Err(DirectoryError::Api {
                code: "InternalErrorException".to_string(),
                message: "injected failure".to_string(),
            });
        }

        {
            let mut throttles = self.throttles.lock().unwrap();
            if let Some(remaining) = throttles.get_mut(&pagination_token) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DirectoryError::Throttled {
                        code: "TooManyRequestsException".to_string(),
                        message: "injected throttle".to_string(),
                    });
                }
            }
        }

        self.pages
            .get(&pagination_token)
            .cloned()
            .ok_or_else(|| DirectoryError::Api {
                code: "InvalidParameterException".to_string(),
                message: format!("unknown pagination token {pagination_token:?}"),
            })
    }

    async fn describe_pool(&self) -> Result<PoolInfo, DirectoryError> {
        Ok(PoolInfo {
            id: "us-east-1_TestPool".to_string(),
            name: Some("test-pool".to_string()),
            estimated_users: Some(self.total_users),
        })
    }
}

/// Token requesting page `index` (`None` for the first page).
pub fn token_for_page(index: usize) -> Option<String> {
    if index == 0 {
        None
    } else {
        Some(format!("token-{index}"))
    }
}

/// A deterministic user record for page `page`, position `index`.
pub fn sample_user(page: usize, index: usize) -> UserRecord {
    UserRecord::new()
        .with_attribute("sub", format!("sub-{page}-{index}"))
        .with_attribute("email", format!("user-{page}-{index}@example.com"))
        .with_attribute("Username", format!("user-{page}-{index}"))
}

/// A retry policy with delays short enough for tests.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(8),
        jitter: 0.0,
    }
}

/// Export options with no pacing and a tight checkpoint cadence.
pub fn fast_options(output: &Path) -> ExportOptions {
    let mut options = ExportOptions::new(output);
    options.request_pacing = Duration::ZERO;
    options.checkpoint_page_interval = 1;
    options.checkpoint_record_interval = 10_000;
    options
}
