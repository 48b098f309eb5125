//! Mutual friends between two users.

use crate::store::GraphStore;

/// Names of the users who are friends with both `a` and `b`, sorted.
///
/// Empty if either name is unknown.
pub fn mutual_friends<G: GraphStore + ?Sized>(graph: &G, a: &str, b: &str) -> Vec<String> {
    let (Some(id_a), Some(id_b)) = (graph.lookup(a), graph.lookup(b)) else {
        return Vec::new();
    };

    let (friends_a, friends_b) = (graph.neighbors(id_a), graph.neighbors(id_b));
    // Probe the larger set from the smaller one
    let (small, large) = if friends_a.len() <= friends_b.len() {
        (friends_a, friends_b)
    } else {
        (friends_b, friends_a)
    };

    let mut names: Vec<String> = small
        .iter()
        .filter(|id| large.contains(id))
        .filter_map(|id| graph.name(*id).map(str::to_string))
        .collect();
    names.sort_unstable();
    names
}
