//! Result records returned by the query engine.
//!
//! Every query returns one of these explicit shapes rather than a generic
//! map, so the presentation layer gets a stable, serializable contract.

use serde::{Deserialize, Serialize};

/// A friend-of-friend recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended user.
    pub name: String,
    /// Number of friends shared with the requesting user.
    pub mutual_friends: usize,
}

/// A user ranked by number of friends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Influencer {
    /// User name.
    pub name: String,
    /// Degree (number of friends).
    pub connections: usize,
}

/// A node of the exported graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// User name.
    pub name: String,
    /// Degree (number of friends).
    pub degree: usize,
}

/// An undirected edge of the exported graph, emitted once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Endpoint with the lower surrogate id.
    pub source: String,
    /// Endpoint with the higher surrogate id.
    pub target: String,
}

/// Whole-graph export for visualization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Nodes in name order.
    pub nodes: Vec<GraphNode>,
    /// Edges in canonical `(low id, high id)` order.
    pub edges: Vec<GraphEdge>,
}

/// Aggregate graph statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Number of users.
    pub total_users: usize,
    /// Number of distinct undirected friendships.
    pub total_edges: usize,
    /// `2 * total_edges / total_users`, rounded to two decimals.
    pub average_degree: f64,
}
