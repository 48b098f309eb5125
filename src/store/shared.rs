//! Copy-and-swap handle for a concurrently read graph.
//!
//! Readers take an `Arc` snapshot and query it without holding any lock.
//! A reload builds the replacement graph with no lock held and then swaps
//! the pointer under a short write lock, so no reader can observe a graph
//! that is partially cleared or partially repopulated.
//!
//! The fingerprint of the current graph is swapped together with it, so
//! reading it never rehashes the edge set.

use std::sync::Arc;
use parking_lot::RwLock;

use crate::ingest::{self, IngestLimits, LoadError, LoadReport};
use super::SocialGraph;

#[derive(Debug)]
struct Slot {
    graph: Arc<SocialGraph>,
    fingerprint: String,
}

impl Slot {
    fn new(graph: SocialGraph, fingerprint: String) -> Self {
        Self {
            graph: Arc::new(graph),
            fingerprint,
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        let graph = SocialGraph::new();
        let fingerprint = graph.fingerprint();
        Self::new(graph, fingerprint)
    }
}

/// Shared, reloadable social graph.
///
/// Clones share the same slot: a reload through one clone is seen by all.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    current: Arc<RwLock<Slot>>,
}

impl SharedGraph {
    /// Create a handle holding an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle holding `graph`.
    pub fn from_graph(graph: SocialGraph) -> Self {
        let fingerprint = graph.fingerprint();
        Self {
            current: Arc::new(RwLock::new(Slot::new(graph, fingerprint))),
        }
    }

    /// The current graph. Stays valid and unchanged across later reloads.
    pub fn snapshot(&self) -> Arc<SocialGraph> {
        Arc::clone(&self.current.read().graph)
    }

    /// Fingerprint of the current graph.
    pub fn fingerprint(&self) -> String {
        self.current.read().fingerprint.clone()
    }

    /// The current graph together with its fingerprint, read atomically.
    pub fn snapshot_with_fingerprint(&self) -> (Arc<SocialGraph>, String) {
        let slot = self.current.read();
        (Arc::clone(&slot.graph), slot.fingerprint.clone())
    }

    /// Swap in a fully built graph, returning the one it replaced.
    ///
    /// Fingerprints `graph` first; use [`commit`](Self::commit) when a
    /// [`LoadReport`] already carries the fingerprint.
    pub fn replace(&self, graph: SocialGraph) -> Arc<SocialGraph> {
        let fingerprint = graph.fingerprint();
        self.swap(Slot::new(graph, fingerprint))
    }

    /// Swap in a graph produced by a load, reusing the report's fingerprint.
    pub fn commit(&self, graph: SocialGraph, report: &LoadReport) -> Arc<SocialGraph> {
        self.swap(Slot::new(graph, report.fingerprint.clone()))
    }

    fn swap(&self, next: Slot) -> Arc<SocialGraph> {
        std::mem::replace(&mut *self.current.write(), next).graph
    }

    /// Rebuild the graph from `rows`.
    ///
    /// On error the current graph is left in place.
    pub fn reload<I, R, S>(&self, rows: I, limits: &IngestLimits) -> Result<LoadReport, LoadError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let (graph, report) = ingest::build(rows, limits)?;
        self.commit(graph, &report);
        Ok(report)
    }

    /// Replace the graph with an empty one.
    pub fn clear(&self) {
        self.swap(Slot::default());
    }
}
