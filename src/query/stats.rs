//! Aggregate graph statistics.

use crate::store::GraphStore;
use crate::types::GraphStatistics;

/// Count users and friendships and compute the average degree.
///
/// The edge count is the logical count maintained at ingestion time, so no
/// halving of directed records is involved.
pub fn statistics<G: GraphStore + ?Sized>(graph: &G) -> GraphStatistics {
    let total_users = graph.user_count();
    let total_edges = graph.edge_count();

    let average_degree = if total_users > 0 {
        round2((2 * total_edges) as f64 / total_users as f64)
    } else {
        0.0
    };

    GraphStatistics {
        total_users,
        total_edges,
        average_degree,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
