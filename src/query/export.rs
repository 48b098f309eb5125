//! Whole-graph export for visualization.

use crate::store::GraphStore;
use crate::types::{GraphEdge, GraphExport, GraphNode};

/// Export every user with its degree and every friendship exactly once.
///
/// Nodes are in name order. Each edge is emitted as (lower id, higher id),
/// in that id order, so a reversed duplicate can never appear.
pub fn export_graph<G: GraphStore + ?Sized>(graph: &G) -> GraphExport {
    let mut nodes: Vec<GraphNode> = graph
        .user_ids()
        .into_iter()
        .filter_map(|id| {
            graph.name(id).map(|name| GraphNode {
                name: name.to_string(),
                degree: graph.degree(id),
            })
        })
        .collect();
    nodes.sort_by(|a, b| a.name.cmp(&b.name));

    let edges = graph
        .friendships()
        .into_iter()
        .filter_map(|f| {
            let source = graph.name(f.low)?;
            let target = graph.name(f.high)?;
            Some(GraphEdge {
                source: source.to_string(),
                target: target.to_string(),
            })
        })
        .collect();

    GraphExport { nodes, edges }
}
