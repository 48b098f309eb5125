//! # social-graph-kernel
//!
//! In-memory analytics over an undirected social graph.
//!
//! The kernel answers four questions about a loaded friendship network:
//!
//! > Who should this user befriend next, who do two users have in common,
//! > who is the best connected, and what does the whole network look like?
//!
//! ## Core Contract
//!
//! 1. Load an edge list of `(user, user)` name pairs into a [`SocialGraph`],
//!    replacing the previous graph all-or-nothing
//! 2. Answer read-only queries with deterministic ordering and tie-breaking
//! 3. Return explicit, serializable result records
//!
//! ## Architecture
//!
//! ```text
//! rows → ingest → SocialGraph → query → Recommendation / Influencer / GraphExport / GraphStatistics
//!                      ↑
//!                SharedGraph (copy-and-swap snapshots)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same edge set in any row order → identical graph fingerprint
//! - Ranked results break ties by name
//! - Export edges are canonical (lower id, higher id)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod ingest;
pub mod query;
pub mod canonical;
pub mod demo;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{
    UserId, User, Friendship,
    Recommendation, Influencer, GraphNode, GraphEdge, GraphExport, GraphStatistics,
};
pub use store::{GraphStore, SocialGraph, SharedGraph, EdgeSource, EdgeSourceError, InMemoryEdgeSource};
#[cfg(feature = "postgres")]
pub use store::PostgresEdgeSource;
pub use ingest::{IngestLimits, LoadError, LoadReport, Resource};
pub use query::{
    recommend, mutual_friends, top_influencers, export_graph, statistics,
    list_users, normalize_limit, DEFAULT_LIMIT,
};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use demo::{DemoConfig, generate_network, demo_rows, write_demo_csv, DEFAULT_DEMO_SEED};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceConfig, ServiceState};

/// Schema version of the result records.
/// Increment on breaking changes to any serialized type.
pub const SOCIAL_GRAPH_SCHEMA_VERSION: &str = "1.0.0";
