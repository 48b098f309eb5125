//! User types for the social graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate identifier for a user in a loaded graph.
///
/// Ids are dense, assigned in insertion order starting at zero, and are only
/// meaningful for the graph that issued them. They are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(u32);

impl UserId {
    /// Create a UserId from its raw value.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Position of this user in the store's dense tables.
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UserId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// A user record as exposed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Surrogate id.
    pub id: UserId,
    /// Trimmed, case-sensitive name.
    pub name: String,
}

impl User {
    /// Create a new user record.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Normalize a raw user name: surrounding whitespace is not part of identity.
pub fn normalize_name(raw: &str) -> &str {
    raw.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_ordering() {
        assert!(UserId::new(1) < UserId::new(2));
        assert_eq!(UserId::from(7).as_u32(), 7);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Ada \t"), "Ada");
        assert_eq!(normalize_name("ada"), "ada");
        assert_eq!(normalize_name("   "), "");
    }
}
