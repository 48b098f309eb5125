//! Friendship (undirected edge) type.

use serde::{Deserialize, Serialize};
use super::user::UserId;

/// A logical undirected friendship.
///
/// Always stored in canonical form with `low < high`, so the two directions
/// of one friendship compare equal. Implements `Ord` as `(low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Friendship {
    /// Endpoint with the lower surrogate id.
    pub low: UserId,
    /// Endpoint with the higher surrogate id.
    pub high: UserId,
}

impl Friendship {
    /// Create a canonical friendship between two distinct users.
    ///
    /// Returns `None` for a self-pair.
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Whether `id` is one of the endpoints.
    pub fn involves(&self, id: UserId) -> bool {
        self.low == id || self.high == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other(&self, id: UserId) -> Option<UserId> {
        if self.low == id {
            Some(self.high)
        } else if self.high == id {
            Some(self.low)
        } else {
            None
        }
    }
}
