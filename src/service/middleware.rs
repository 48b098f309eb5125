//! Service middleware for request metrics.
//!
//! ## Metrics Exposed
//!
//! - `request` - request count and latency by path pattern, method, status
//! - `load` - users, edges and skipped rows per completed load

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use regex_lite::Regex;
use tracing::info;

use crate::ingest::LoadReport;

/// Metrics middleware that records request counts and latency.
///
/// Uses tracing events; aggregate them from the logs.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = normalize_path(request.uri().path());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "social_graph::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Normalize path for metrics to avoid high cardinality.
///
/// User names embedded in the path are replaced with a placeholder.
fn normalize_path(path: &str) -> String {
    static USER_SEGMENT: OnceLock<Regex> = OnceLock::new();
    let regex = USER_SEGMENT.get_or_init(|| {
        Regex::new(r"^/api/recommendations/[^/]+").expect("valid path pattern")
    });

    regex.replace(path, "/api/recommendations/:username").to_string()
}

/// Record load metrics.
pub fn record_load_metrics(report: &LoadReport, source: &str) {
    info!(
        target: "social_graph::metrics",
        metric_type = "load",
        source = source,
        users = report.users,
        edges = report.edges,
        rows_read = report.rows_read,
        rows_skipped = report.rows_skipped,
        "load_metric"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_replaces_username() {
        assert_eq!(
            normalize_path("/api/recommendations/Ada%20Lovelace"),
            "/api/recommendations/:username"
        );
    }

    #[test]
    fn test_normalize_path_preserves_regular_path() {
        assert_eq!(normalize_path("/api/graph-data"), "/api/graph-data");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
