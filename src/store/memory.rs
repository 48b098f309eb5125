//! In-memory social graph store.

use std::collections::{HashMap, HashSet};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::canonical::canonical_hash_hex;
use crate::types::{normalize_name, Friendship, User, UserId};
use super::{EdgeSource, EdgeSourceError, GraphStore};

/// In-memory undirected social graph.
///
/// Users are kept in dense tables indexed by [`UserId`]; each user owns a
/// hash set of neighbor ids, so a friendship is stored as two directed
/// records but counted once in `edge_count`.
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    /// Name -> id.
    ids: HashMap<String, UserId>,
    /// Id -> name.
    names: Vec<String>,
    /// Id -> neighbor ids.
    adjacency: Vec<HashSet<UserId>>,
    /// Logical (undirected) edge count.
    edge_count: usize,
    /// Returned for ids outside the graph.
    empty: HashSet<UserId>,
}

impl SocialGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all users and friendships.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.names.clear();
        self.adjacency.clear();
        self.edge_count = 0;
    }

    /// Resolve or create a user by name.
    ///
    /// The name is trimmed; matching is case-sensitive. An existing user keeps
    /// its id. Returns `None` for a blank name.
    pub fn add_user(&mut self, name: &str) -> Option<UserId> {
        let name = normalize_name(name);
        if name.is_empty() {
            return None;
        }
        if let Some(id) = self.ids.get(name) {
            return Some(*id);
        }

        let id = UserId::new(self.names.len() as u32);
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        self.adjacency.push(HashSet::new());
        Some(id)
    }

    /// Add an undirected friendship between two names.
    ///
    /// A self-pair or blank name is ignored. Returns `true` only when a new
    /// logical edge was created; repeating a pair in either order is a no-op.
    pub fn add_friendship(&mut self, a: &str, b: &str) -> bool {
        let (a, b) = (normalize_name(a), normalize_name(b));
        if a.is_empty() || b.is_empty() || a == b {
            return false;
        }
        let (Some(id_a), Some(id_b)) = (self.add_user(a), self.add_user(b)) else {
            return false;
        };

        let inserted = self.adjacency[id_a.index()].insert(id_b);
        if inserted {
            self.adjacency[id_b.index()].insert(id_a);
            self.edge_count += 1;
        }
        inserted
    }

    /// All users, sorted by name.
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.names
            .iter()
            .enumerate()
            .map(|(i, name)| User::new(UserId::new(i as u32), name.clone()))
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        users
    }

    /// Whether the graph has no users.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The edge list as `[low name, high name]` pairs in canonical order.
    ///
    /// Loading this list into a fresh graph reproduces the same user set and
    /// edge set.
    pub fn edge_list(&self) -> Vec<[String; 2]> {
        self.friendships()
            .into_iter()
            .map(|f| [self.names[f.low.index()].clone(), self.names[f.high.index()].clone()])
            .collect()
    }

    /// Deterministic fingerprint of the user set and edge set.
    ///
    /// Independent of insertion order and of the surrogate ids handed out.
    pub fn fingerprint(&self) -> String {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();

        let mut pairs: Vec<(&str, &str)> = self.friendships()
            .into_iter()
            .map(|f| {
                let a = self.names[f.low.index()].as_str();
                let b = self.names[f.high.index()].as_str();
                if a < b { (a, b) } else { (b, a) }
            })
            .collect();
        pairs.sort_unstable();

        canonical_hash_hex(&(names, pairs))
    }
}

impl GraphStore for SocialGraph {
    fn lookup(&self, name: &str) -> Option<UserId> {
        self.ids.get(normalize_name(name)).copied()
    }

    fn name(&self, id: UserId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    fn neighbors(&self, id: UserId) -> &HashSet<UserId> {
        self.adjacency.get(id.index()).unwrap_or(&self.empty)
    }

    fn user_ids(&self) -> Vec<UserId> {
        (0..self.names.len() as u32).map(UserId::new).collect()
    }

    fn friendships(&self) -> Vec<Friendship> {
        let mut edges: Vec<Friendship> = Vec::with_capacity(self.edge_count);
        for (i, neighbors) in self.adjacency.iter().enumerate() {
            let id = UserId::new(i as u32);
            // Emit from the lower endpoint only
            edges.extend(
                neighbors
                    .iter()
                    .filter(|other| **other > id)
                    .filter_map(|other| Friendship::new(id, *other)),
            );
        }
        edges.sort_unstable();
        edges
    }

    fn user_count(&self) -> usize {
        self.names.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// In-memory edge source for testing.
#[derive(Debug, Default)]
pub struct InMemoryEdgeSource {
    edges: Mutex<Vec<[String; 2]>>,
}

impl InMemoryEdgeSource {
    /// Create an empty edge source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an edge source pre-populated with `edges`.
    pub fn with_edges(edges: Vec<[String; 2]>) -> Self {
        Self {
            edges: Mutex::new(edges),
        }
    }

    /// Number of stored edges.
    pub fn len(&self) -> usize {
        self.edges.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.edges.lock().is_empty()
    }
}

#[async_trait]
impl EdgeSource for InMemoryEdgeSource {
    async fn fetch_edges(&self) -> Result<Vec<[String; 2]>, EdgeSourceError> {
        Ok(self.edges.lock().clone())
    }

    async fn replace_edges(&self, edges: &[[String; 2]]) -> Result<(), EdgeSourceError> {
        *self.edges.lock() = edges.to_vec();
        Ok(())
    }

    async fn clear(&self) -> Result<(), EdgeSourceError> {
        self.edges.lock().clear();
        Ok(())
    }
}
