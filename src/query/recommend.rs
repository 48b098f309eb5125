//! Friend-of-friend recommendations.

use std::collections::HashMap;

use crate::store::GraphStore;
use crate::types::{Recommendation, UserId};

/// Recommend new friends for `user` by number of mutual friends.
///
/// Candidates are friends of the user's friends, excluding the user and
/// anyone already a direct friend. Each candidate is scored by how many of
/// the user's friends it is connected to. Results are ordered by score
/// descending, ties by name ascending, and truncated to `limit`.
///
/// Runs in O(sum of the friends' degrees) with no per-candidate lookups
/// beyond the final name resolution.
pub fn recommend<G: GraphStore + ?Sized>(graph: &G, user: &str, limit: usize) -> Vec<Recommendation> {
    if limit == 0 {
        return Vec::new();
    }

    let Some(user_id) = graph.lookup(user) else {
        return Vec::new();
    };

    let friends = graph.neighbors(user_id);
    if friends.is_empty() {
        return Vec::new();
    }

    let mut mutual_counts: HashMap<UserId, usize> = HashMap::new();
    for friend in friends {
        for candidate in graph.neighbors(*friend) {
            if *candidate == user_id || friends.contains(candidate) {
                continue;
            }
            *mutual_counts.entry(*candidate).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = mutual_counts
        .into_iter()
        .filter_map(|(id, count)| graph.name(id).map(|name| (name, count)))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(name, mutual_friends)| Recommendation {
            name: name.to_string(),
            mutual_friends,
        })
        .collect()
}
