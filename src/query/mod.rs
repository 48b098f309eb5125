//! Read-only analytics over a [`GraphStore`](crate::store::GraphStore).
//!
//! Every query is a pure function of the graph it is given: unknown users
//! produce empty results rather than errors, and all orderings are total so
//! that the same graph always yields the same output.
//!
//! ## Ranking rules
//!
//! - Recommendations: mutual friend count desc, then name asc
//! - Influencers: degree desc, then name asc
//! - Mutual friends and user listings: name asc
//! - Export edges: `(low id, high id)`

pub mod recommend;
pub mod mutual;
pub mod influence;
pub mod export;
pub mod stats;

pub use recommend::recommend;
pub use mutual::mutual_friends;
pub use influence::top_influencers;
pub use export::export_graph;
pub use stats::statistics;

use crate::store::GraphStore;

/// Default number of results for ranked queries.
pub const DEFAULT_LIMIT: usize = 10;

/// Normalize a caller-supplied limit.
///
/// Missing means `default`; zero or negative means no results.
pub fn normalize_limit(raw: Option<i64>, default: usize) -> usize {
    match raw {
        None => default,
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    }
}

/// All user names, sorted.
pub fn list_users<G: GraphStore + ?Sized>(graph: &G) -> Vec<String> {
    let mut names: Vec<String> = graph
        .user_ids()
        .into_iter()
        .filter_map(|id| graph.name(id).map(str::to_string))
        .collect();
    names.sort_unstable();
    names
}
