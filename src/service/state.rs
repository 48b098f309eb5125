//! Service state management.
//!
//! Contains the service configuration and the shared graph handle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::ingest::IngestLimits;
use crate::query::DEFAULT_LIMIT;
use crate::store::{EdgeSource, SharedGraph};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bind host (default: 0.0.0.0).
    pub host: String,
    /// Bind port (default: 5000).
    pub port: u16,
    /// Result count for ranked queries when the caller gives none.
    pub default_limit: usize,
    /// Capacity limits applied to every load.
    pub limits: IngestLimits,
    /// CSV file loaded by the demo endpoint, when present on disk.
    pub seed_csv: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// - `HOST`, `PORT`
    /// - `DEFAULT_LIMIT` (default: 10)
    /// - `MAX_USERS`, `MAX_EDGES`
    /// - `SEED_CSV` (default: `data/social_network_demo.csv`)
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5000),
            default_limit: std::env::var("DEFAULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_LIMIT),
            limits: IngestLimits::from_env(),
            seed_csv: Some(
                std::env::var("SEED_CSV")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data/social_network_demo.csv")),
            ),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            default_limit: DEFAULT_LIMIT,
            limits: IngestLimits::default(),
            seed_csv: None,
        }
    }
}

/// Shared service state.
///
/// Cheap to clone: every field is a shared handle.
#[derive(Clone)]
pub struct ServiceState {
    /// The graph served to every request.
    pub graph: SharedGraph,
    /// Service configuration.
    pub config: Arc<ServiceConfig>,
    /// Optional durable copy of the edge list.
    edge_source: Option<Arc<dyn EdgeSource>>,
    /// Set once a graph has been loaded or hydrated.
    loaded: Arc<AtomicBool>,
    /// Serializes persist-then-swap sequences.
    reload_lock: Arc<Mutex<()>>,
}

impl ServiceState {
    /// Create service state with an empty graph.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            graph: SharedGraph::new(),
            config: Arc::new(config),
            edge_source: None,
            loaded: Arc::new(AtomicBool::new(false)),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Attach an edge source used to persist loads and clears.
    pub fn with_edge_source(mut self, source: Arc<dyn EdgeSource>) -> Self {
        self.edge_source = Some(source);
        self
    }

    /// The attached edge source, if any.
    pub fn edge_source(&self) -> Option<&Arc<dyn EdgeSource>> {
        self.edge_source.as_ref()
    }

    /// Whether a graph has been loaded since startup.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Exclusive access for changing the graph.
    ///
    /// Held across writing the edge source and swapping the in-memory graph,
    /// so the served graph and the persisted edge list change together.
    pub async fn reload_guard(&self) -> MutexGuard<'_, ()> {
        self.reload_lock.lock().await
    }

    /// Record that a graph has been loaded.
    pub fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }
}
