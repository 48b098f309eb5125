//! Edge list ingestion.
//!
//! Turns raw two-field rows into a [`SocialGraph`]. A load never mutates the
//! graph it replaces: the new graph is built off to the side and swapped in
//! only once complete, so a failed load leaves the previous graph intact.
//!
//! ## Row handling
//!
//! - Rows with fewer than two fields are skipped; extra fields are ignored.
//! - Both fields are trimmed; a row with a blank field is skipped.
//! - Self-pairs are skipped.
//! - Duplicate pairs (in either order) collapse into one friendship.

pub mod csv;

use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::store::{GraphStore, SocialGraph};

/// Default maximum number of users in one load.
pub const DEFAULT_MAX_USERS: usize = 50_000;

/// Default maximum number of friendships in one load.
pub const DEFAULT_MAX_EDGES: usize = 500_000;

/// Capacity limits for a single load.
///
/// The graph must fit in memory; a load that outgrows these limits is
/// aborted rather than partially applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestLimits {
    /// Maximum number of distinct users.
    pub max_users: usize,
    /// Maximum number of distinct friendships.
    pub max_edges: usize,
}

impl IngestLimits {
    /// Load limits from `MAX_USERS` / `MAX_EDGES`, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            max_users: std::env::var("MAX_USERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_USERS),
            max_edges: std::env::var("MAX_EDGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_EDGES),
        }
    }
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_users: DEFAULT_MAX_USERS,
            max_edges: DEFAULT_MAX_EDGES,
        }
    }
}

/// Which capacity limit a load ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Distinct users.
    Users,
    /// Distinct friendships.
    Edges,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => write!(f, "users"),
            Self::Edges => write!(f, "edges"),
        }
    }
}

/// Error type for ingestion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The edge list does not fit within the configured limits.
    ///
    /// Carries the progress made before the load was abandoned.
    #[error(
        "Load aborted: {resource} limit of {limit} exceeded after {rows_processed} rows \
         ({users} users, {edges} edges built)"
    )]
    CapacityExceeded {
        /// The limit that was exceeded.
        resource: Resource,
        /// The configured limit.
        limit: usize,
        /// Rows consumed before the failure, including the failing row.
        rows_processed: usize,
        /// Users built before the failure.
        users: usize,
        /// Friendships built before the failure.
        edges: usize,
    },
    /// CSV input could not be read.
    #[error("Unreadable CSV input: {0}")]
    Csv(#[from] ::csv::Error),
    /// JSON input could not be parsed.
    #[error("Unreadable JSON input: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON input was well-formed but not an array of rows.
    #[error("Invalid edge list payload: {0}")]
    InvalidPayload(String),
}

/// Summary of a completed load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Distinct users in the new graph.
    pub users: usize,
    /// Distinct friendships in the new graph.
    pub edges: usize,
    /// Rows offered to the loader.
    pub rows_read: usize,
    /// Rows skipped as malformed, blank or self-pairs.
    pub rows_skipped: usize,
    /// Fingerprint of the new graph.
    pub fingerprint: String,
    /// When the load completed.
    pub loaded_at: DateTime<Utc>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully loaded {} users and {} connections",
            self.users, self.edges
        )
    }
}

/// Build a new graph from rows.
///
/// Each row is any slice of string-like fields; only the first two are used.
pub fn build<I, R, S>(rows: I, limits: &IngestLimits) -> Result<(SocialGraph, LoadReport), LoadError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut graph = SocialGraph::new();
    let mut rows_read = 0usize;
    let mut short_rows = 0usize;
    let mut blank_rows = 0usize;
    let mut self_pairs = 0usize;

    for row in rows {
        rows_read += 1;
        let fields = row.as_ref();

        if fields.len() < 2 {
            short_rows += 1;
            continue;
        }

        let a = fields[0].as_ref().trim();
        let b = fields[1].as_ref().trim();
        if a.is_empty() || b.is_empty() {
            blank_rows += 1;
            continue;
        }
        if a == b {
            self_pairs += 1;
            continue;
        }

        graph.add_friendship(a, b);

        let exceeded = if graph.user_count() > limits.max_users {
            Some((Resource::Users, limits.max_users))
        } else if graph.edge_count() > limits.max_edges {
            Some((Resource::Edges, limits.max_edges))
        } else {
            None
        };

        if let Some((resource, limit)) = exceeded {
            warn!(
                resource = %resource,
                limit = limit,
                rows_processed = rows_read,
                users = graph.user_count(),
                edges = graph.edge_count(),
                "Edge list exceeds capacity, keeping previous graph"
            );
            return Err(LoadError::CapacityExceeded {
                resource,
                limit,
                rows_processed: rows_read,
                users: graph.user_count(),
                edges: graph.edge_count(),
            });
        }
    }

    let rows_skipped = short_rows + blank_rows + self_pairs;
    if rows_skipped > 0 {
        debug!(
            short_rows = short_rows,
            blank_rows = blank_rows,
            self_pairs = self_pairs,
            "Skipped malformed edge rows"
        );
    }

    let report = LoadReport {
        users: graph.user_count(),
        edges: graph.edge_count(),
        rows_read,
        rows_skipped,
        fingerprint: graph.fingerprint(),
        loaded_at: Utc::now(),
    };

    info!(
        users = report.users,
        edges = report.edges,
        rows_read = report.rows_read,
        rows_skipped = report.rows_skipped,
        fingerprint = %report.fingerprint,
        "Edge list loaded"
    );

    Ok((graph, report))
}

/// Replace the contents of `graph` with the edge list in `rows`.
///
/// All or nothing: on error `graph` is left exactly as it was.
pub fn load<I, R, S>(graph: &mut SocialGraph, rows: I, limits: &IngestLimits) -> Result<LoadReport, LoadError>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let (built, report) = build(rows, limits)?;
    *graph = built;
    Ok(report)
}

/// Extract rows from a JSON array of arrays.
///
/// A row that is not an array, or whose first two elements are not strings,
/// becomes an empty row so that [`build`] counts it as skipped.
pub fn json_rows(value: &Value) -> Result<Vec<Vec<String>>, LoadError> {
    let rows = value.as_array().ok_or_else(|| {
        LoadError::InvalidPayload("expected a JSON array of [user1, user2] rows".to_string())
    })?;

    Ok(rows
        .iter()
        .map(|row| {
            let fields = row.as_array().map(Vec::as_slice).unwrap_or_default();
            match (fields.first(), fields.get(1)) {
                (Some(Value::String(a)), Some(Value::String(b))) => vec![a.clone(), b.clone()],
                _ => Vec::new(),
            }
        })
        .collect())
}
