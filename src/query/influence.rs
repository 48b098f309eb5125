//! Influencer ranking by degree.

use crate::store::GraphStore;
use crate::types::Influencer;

/// The `limit` most connected users.
///
/// Ordered by degree descending, ties by name ascending.
pub fn top_influencers<G: GraphStore + ?Sized>(graph: &G, limit: usize) -> Vec<Influencer> {
    if limit == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&str, usize)> = graph
        .user_ids()
        .into_iter()
        .filter_map(|id| graph.name(id).map(|name| (name, graph.degree(id))))
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(name, connections)| Influencer {
            name: name.to_string(),
            connections,
        })
        .collect()
}
