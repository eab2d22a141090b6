//! User record model
//!
//! A user record is a flat attribute-name to value mapping produced from one
//! directory entry. Records are immutable once read from the API; the
//! exporter only projects them onto the configured attribute set.

use std::collections::BTreeMap;

/// One user entry from the directory, flattened to string attributes.
///
/// Root-level fields reported by the listing call (`Username`, `Enabled`,
/// `UserStatus`, `UserCreateDate`, `UserLastModifiedDate`) live in the same
/// namespace as the user attributes (`sub`, `email`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    attributes: BTreeMap<String, String>,
}

impl UserRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insertion, mainly for adapters and tests
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an attribute value, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Looks up an attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterates over the attribute names present on this record
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Projects the record onto an attribute list, in list order.
    ///
    /// Attributes missing from the record render as the empty string, so
    /// every projected row has exactly `attributes.len()` fields.
    pub fn project(&self, attributes: &[String]) -> Vec<String> {
        attributes
            .iter()
            .map(|name| self.attributes.get(name).cloned().unwrap_or_default())
            .collect()
    }

    /// Number of attributes present on this record
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// True if the record carries no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// One page of users from the directory listing.
#[derive(Debug, Clone, Default)]
pub struct UserPage {
    /// Users in this page, in listing order
    pub users: Vec<UserRecord>,

    /// Token for the next page, or `None` when the listing is exhausted
    pub next_token: Option<String>,
}

/// Pool metadata from the describe call.
#[derive(Debug, Clone)]
pub struct PoolInfo {
    /// The pool id
    pub id: String,

    /// Human-readable pool name, if the service reports one
    pub name: Option<String>,

    /// Approximate number of users in the pool
    pub estimated_users: Option<i32>,
}
