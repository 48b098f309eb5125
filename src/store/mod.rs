//! Graph storage.
//!
//! [`SocialGraph`] is the canonical in-memory store; [`SharedGraph`] hands out
//! immutable snapshots of it to concurrent readers. [`EdgeSource`] is the seam
//! for collaborators that durably keep the edge list between restarts.

pub mod memory;
pub mod shared;

#[cfg(feature = "postgres")]
pub mod postgres;

use std::collections::HashSet;
use async_trait::async_trait;

use crate::types::{Friendship, UserId};

/// Read-only view of a social graph.
///
/// Every query algorithm is written against this trait. Lookups of unknown
/// ids are not errors: they behave like users without friends.
pub trait GraphStore: Send + Sync {
    /// Resolve a name (trimmed, case-sensitive) to its id.
    fn lookup(&self, name: &str) -> Option<UserId>;

    /// Resolve an id back to its name.
    fn name(&self, id: UserId) -> Option<&str>;

    /// Direct friends of a user. Empty for unknown ids.
    fn neighbors(&self, id: UserId) -> &HashSet<UserId>;

    /// Number of direct friends.
    fn degree(&self, id: UserId) -> usize {
        self.neighbors(id).len()
    }

    /// All user ids, in id order.
    fn user_ids(&self) -> Vec<UserId>;

    /// All friendships, each once, ordered by `(low, high)`.
    fn friendships(&self) -> Vec<Friendship>;

    /// Number of users.
    fn user_count(&self) -> usize;

    /// Number of distinct undirected friendships.
    fn edge_count(&self) -> usize;
}

/// Error type for edge list persistence backends.
#[derive(Debug, thiserror::Error)]
pub enum EdgeSourceError {
    /// The backend could not be reached or rejected the operation.
    #[error("Edge source backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A collaborator that durably stores the edge list and supplies it back.
///
/// The kernel itself never persists anything; the service uses an edge
/// source to hydrate the graph at startup and to save successful loads.
#[async_trait]
pub trait EdgeSource: Send + Sync {
    /// Fetch the stored edge list as `[source, target]` name pairs.
    async fn fetch_edges(&self) -> Result<Vec<[String; 2]>, EdgeSourceError>;

    /// Replace the stored edge list with `edges`, all or nothing.
    async fn replace_edges(&self, edges: &[[String; 2]]) -> Result<(), EdgeSourceError>;

    /// Remove every stored user and friendship.
    async fn clear(&self) -> Result<(), EdgeSourceError>;
}

pub use memory::{SocialGraph, InMemoryEdgeSource};
pub use shared::SharedGraph;

#[cfg(feature = "postgres")]
pub use postgres::PostgresEdgeSource;
