//! Axum routes for the social graph service.

use axum::{
    body::Bytes,
    extract::{Json, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::demo::{demo_rows, DEFAULT_DEMO_SEED};
use crate::ingest::{self, csv::parse_edge_csv, LoadError, LoadReport};
use crate::query::{
    export_graph, list_users, mutual_friends, normalize_limit, recommend, statistics,
    top_influencers,
};
use crate::store::{EdgeSourceError, GraphStore, SocialGraph};
use crate::types::{GraphExport, GraphStatistics, Influencer, Recommendation};
use crate::SOCIAL_GRAPH_SCHEMA_VERSION;

use super::middleware::record_load_metrics;
use super::state::ServiceState;

/// Type alias for the state shared by all handlers.
pub type AppState = Arc<ServiceState>;

/// Error half of every fallible handler.
type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Optional `?limit=` query parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitParams {
    /// Requested result count; non-positive means none.
    pub limit: Option<i64>,
}

/// Query parameters for CSV uploads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadParams {
    /// Whether the first CSV row is a header (default: true).
    pub header: Option<bool>,
}

/// Recommendations for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    /// The requesting user, as given.
    pub username: String,
    /// Whether the user exists in the current graph.
    pub known_user: bool,
    /// Ranked recommendations.
    pub recommendations: Vec<Recommendation>,
}

/// Request for the mutual friends of two users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutualFriendsRequest {
    /// First user.
    pub user1: Option<String>,
    /// Second user.
    pub user2: Option<String>,
}

/// Mutual friends of two users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualFriendsResponse {
    /// First user.
    pub user1: String,
    /// Second user.
    pub user2: String,
    /// Shared friends, sorted by name.
    pub mutual_friends: Vec<String>,
}

/// Result of clearing the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    /// Always true on success.
    pub cleared: bool,
    /// Whether the persisted edge list was cleared as well.
    pub persisted: bool,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" once loaded, "empty" before.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Version of the serialized result records.
    pub schema_version: String,
    /// Whether a graph has been loaded since startup.
    pub loaded: bool,
    /// Users in the current graph.
    pub users: usize,
    /// Friendships in the current graph.
    pub edges: usize,
    /// Fingerprint of the graph currently served.
    pub fingerprint: String,
    /// Whether loads are persisted to an edge source.
    pub persistence: bool,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always "alive".
    pub status: String,
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service can answer queries.
    pub ready: bool,
    /// Why the service is not ready.
    pub details: Option<String>,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

fn api_error(status: StatusCode, body: ErrorResponse) -> ApiError {
    tracing::warn!(
        status = status.as_u16(),
        code = %body.code,
        error = %body.error,
        "Request error"
    );
    (status, Json(body))
}

fn load_error(err: LoadError) -> ApiError {
    match err {
        LoadError::CapacityExceeded { .. } => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new("CAPACITY_EXCEEDED", err.to_string()),
        ),
        LoadError::Csv(_) | LoadError::Json(_) | LoadError::InvalidPayload(_) => api_error(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("INVALID_EDGE_LIST", err.to_string()),
        ),
    }
}

fn persistence_error(err: EdgeSourceError) -> ApiError {
    api_error(
        StatusCode::BAD_GATEWAY,
        ErrorResponse::new("PERSISTENCE_FAILED", "Edge list could not be persisted")
            .with_details(err.to_string()),
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Aggregate statistics of the current graph.
async fn statistics_handler(State(state): State<AppState>) -> Json<GraphStatistics> {
    Json(statistics(&*state.graph.snapshot()))
}

/// All user names, sorted.
async fn users_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(list_users(&*state.graph.snapshot()))
}

/// Most connected users.
async fn influencers_handler(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Influencer>> {
    let limit = normalize_limit(params.limit, state.config.default_limit);
    Json(top_influencers(&*state.graph.snapshot(), limit))
}

/// Friend recommendations for a user.
async fn recommendations_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<LimitParams>,
) -> Json<RecommendationResponse> {
    let limit = normalize_limit(params.limit, state.config.default_limit);
    let graph = state.graph.snapshot();

    Json(RecommendationResponse {
        known_user: graph.lookup(&username).is_some(),
        recommendations: recommend(&*graph, &username, limit),
        username,
    })
}

/// Mutual friends of two users.
async fn mutual_friends_handler(
    State(state): State<AppState>,
    Json(request): Json<MutualFriendsRequest>,
) -> Result<Json<MutualFriendsResponse>, ApiError> {
    let user1 = request.user1.unwrap_or_default();
    let user2 = request.user2.unwrap_or_default();

    if user1.trim().is_empty() || user2.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("MISSING_USERS", "Please select both users"),
        ));
    }

    let mutual = mutual_friends(&*state.graph.snapshot(), &user1, &user2);
    Ok(Json(MutualFriendsResponse {
        user1,
        user2,
        mutual_friends: mutual,
    }))
}

/// Whole graph for visualization.
async fn graph_data_handler(State(state): State<AppState>) -> Json<GraphExport> {
    Json(export_graph(&*state.graph.snapshot()))
}

/// Replace the graph with an uploaded edge list.
///
/// Accepts `application/json` (an array of `[user1, user2]` rows) or CSV
/// text (anything else).
async fn load_handler(
    State(state): State<AppState>,
    Query(params): Query<LoadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoadReport>, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let rows = if is_json {
        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|e| load_error(LoadError::from(e)))?;
        ingest::json_rows(&value).map_err(load_error)?
    } else {
        parse_edge_csv(&body, params.header.unwrap_or(true)).map_err(load_error)?
    };

    let (graph, report) = ingest::build(rows, &state.config.limits).map_err(load_error)?;
    commit_load(&state, graph, &report, "upload").await?;
    Ok(Json(report))
}

/// Load the demo network.
///
/// Uses the configured seed CSV when it exists, otherwise the generated
/// network.
async fn load_demo_handler(State(state): State<AppState>) -> Result<Json<LoadReport>, ApiError> {
    let seed_file = match &state.config.seed_csv {
        Some(path) if path.is_file() => Some(path.clone()),
        _ => None,
    };

    let (graph, report, source) = match seed_file {
        Some(path) => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("SEED_READ_FAILED", "Demo file could not be read")
                        .with_details(format!("{}: {}", path.display(), e)),
                )
            })?;
            let rows = parse_edge_csv(&bytes, true).map_err(load_error)?;
            let (graph, report) = ingest::build(rows, &state.config.limits).map_err(load_error)?;
            (graph, report, "seed_csv")
        }
        None => {
            let rows = demo_rows(DEFAULT_DEMO_SEED);
            let (graph, report) = ingest::build(&rows, &state.config.limits).map_err(load_error)?;
            (graph, report, "generated")
        }
    };

    commit_load(&state, graph, &report, source).await?;
    Ok(Json(report))
}

/// Persist (when configured), then swap in a freshly built graph.
///
/// Runs under the reload guard so concurrent loads and clears apply in the
/// same order to the edge source and to the served graph.
async fn commit_load(
    state: &ServiceState,
    graph: SocialGraph,
    report: &LoadReport,
    source: &str,
) -> Result<(), ApiError> {
    let _guard = state.reload_guard().await;

    if let Some(edge_source) = state.edge_source() {
        edge_source
            .replace_edges(&graph.edge_list())
            .await
            .map_err(persistence_error)?;
    }

    state.graph.commit(graph, report);
    state.mark_loaded();
    record_load_metrics(report, source);
    Ok(())
}

/// Empty the graph and the persisted edge list.
async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>, ApiError> {
    let _guard = state.reload_guard().await;

    let persisted = match state.edge_source() {
        Some(edge_source) => {
            edge_source.clear().await.map_err(persistence_error)?;
            true
        }
        None => false,
    };

    state.graph.clear();
    tracing::info!(persisted = persisted, "Graph cleared");

    Ok(Json(ClearResponse {
        cleared: true,
        persisted,
    }))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (graph, fingerprint) = state.graph.snapshot_with_fingerprint();
    let loaded = state.is_loaded();

    Json(HealthResponse {
        status: if loaded { "healthy" } else { "empty" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: SOCIAL_GRAPH_SCHEMA_VERSION.to_string(),
        loaded,
        users: graph.user_count(),
        edges: graph.edge_count(),
        fingerprint,
        persistence: state.edge_source().is_some(),
    })
}

/// Liveness probe endpoint.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 once a graph has been loaded or hydrated, 503 before.
async fn readiness_handler(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.is_loaded() {
        Ok(Json(ReadinessResponse {
            ready: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                details: Some("No graph loaded yet".to_string()),
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the social graph service.
pub fn create_router(state: ServiceState) -> Router {
    let state = Arc::new(state);

    Router::new()
        // Queries
        .route("/api/statistics", get(statistics_handler))
        .route("/api/users", get(users_handler))
        .route("/api/influencers", get(influencers_handler))
        .route("/api/recommendations/:username", get(recommendations_handler))
        .route("/api/mutual-friends", post(mutual_friends_handler))
        .route("/api/graph-data", get(graph_data_handler))
        // Graph lifecycle
        .route("/api/load", post(load_handler))
        .route("/api/load/demo", post(load_demo_handler))
        .route("/api/clear", post(clear_handler))
        // Health checks
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceConfig;
    use crate::ingest::IngestLimits;
    use crate::store::{EdgeSource, InMemoryEdgeSource};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const SCENARIO_CSV: &str = "user1,user2\nA,B\nB,C\nA,C\nC,D\n";

    /// Edge source whose first write stalls after storing the edges.
    struct StallingEdgeSource {
        inner: InMemoryEdgeSource,
        stalled: AtomicBool,
    }

    impl StallingEdgeSource {
        fn new() -> Self {
            Self {
                inner: InMemoryEdgeSource::new(),
                stalled: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl EdgeSource for StallingEdgeSource {
        async fn fetch_edges(&self) -> Result<Vec<[String; 2]>, EdgeSourceError> {
            self.inner.fetch_edges().await
        }

        async fn replace_edges(&self, edges: &[[String; 2]]) -> Result<(), EdgeSourceError> {
            self.inner.replace_edges(edges).await?;
            if !self.stalled.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Ok(())
        }

        async fn clear(&self) -> Result<(), EdgeSourceError> {
            self.inner.clear().await
        }
    }

    async fn persisted_users(source: &dyn EdgeSource) -> Vec<String> {
        let edges = source.fetch_edges().await.unwrap();
        let (graph, _) = ingest::build(&edges, &IngestLimits::default()).unwrap();
        list_users(&graph)
    }

    fn test_state() -> ServiceState {
        ServiceState::new(ServiceConfig::default())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> (StatusCode, T) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_body(app: &Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn loaded_app() -> Router {
        let app = create_router(test_state());
        let (status, _) = post_body(&app, "/api/load", "text/csv", SCENARIO_CSV).await;
        assert_eq!(status, StatusCode::OK);
        app
    }

    #[tokio::test]
    async fn test_load_csv_and_statistics() {
        let app = loaded_app().await;

        let (status, stats): (_, GraphStatistics) = get_json(&app, "/api/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_edges, 4);
        assert_eq!(stats.average_degree, 2.0);
    }

    #[tokio::test]
    async fn test_load_json_rows() {
        let app = create_router(test_state());
        let (status, bytes) = post_body(
            &app,
            "/api/load",
            "application/json",
            r#"[["A","B"],["B",3],["B","C"]]"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let report: LoadReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report.edges, 2);
        assert_eq!(report.rows_skipped, 1);
    }

    #[tokio::test]
    async fn test_recommendations() {
        let app = loaded_app().await;

        let (_, body): (_, RecommendationResponse) =
            get_json(&app, "/api/recommendations/A").await;
        assert!(body.known_user);
        assert_eq!(
            body.recommendations,
            vec![Recommendation { name: "D".into(), mutual_friends: 1 }]
        );

        let (_, body): (_, RecommendationResponse) =
            get_json(&app, "/api/recommendations/A?limit=0").await;
        assert!(body.recommendations.is_empty());

        let (status, body): (_, RecommendationResponse) =
            get_json(&app, "/api/recommendations/Unknown").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.known_user);
        assert!(body.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_mutual_friends() {
        let app = loaded_app().await;

        let (status, bytes) = post_body(
            &app,
            "/api/mutual-friends",
            "application/json",
            r#"{"user1":"A","user2":"C"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: MutualFriendsResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.mutual_friends, vec!["B"]);

        let (status, bytes) = post_body(
            &app,
            "/api/mutual-friends",
            "application/json",
            r#"{"user1":"A"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "MISSING_USERS");
    }

    #[tokio::test]
    async fn test_influencers_and_graph_data() {
        let app = loaded_app().await;

        let (_, top): (_, Vec<Influencer>) = get_json(&app, "/api/influencers?limit=2").await;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "C");
        assert_eq!(top[0].connections, 3);

        let (_, export): (_, GraphExport) = get_json(&app, "/api/graph-data").await;
        assert_eq!(export.nodes.len(), 4);
        assert_eq!(export.edges.len(), 4);

        let (_, users): (_, Vec<String>) = get_json(&app, "/api/users").await;
        assert_eq!(users, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_capacity_failure_keeps_graph() {
        let config = ServiceConfig {
            limits: crate::ingest::IngestLimits { max_users: 4, max_edges: 100 },
            ..ServiceConfig::default()
        };
        let app = create_router(ServiceState::new(config));

        let (status, _) = post_body(&app, "/api/load", "text/csv", SCENARIO_CSV).await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = post_body(
            &app,
            "/api/load",
            "text/csv",
            "user1,user2\nP,Q\nR,S\nT,U\n",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "CAPACITY_EXCEEDED");

        let (_, users): (_, Vec<String>) = get_json(&app, "/api/users").await;
        assert_eq!(users, vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let app = create_router(test_state());
        let (status, bytes) =
            post_body(&app, "/api/load", "application/json", r#"{"not":"rows"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.code, "INVALID_EDGE_LIST");
    }

    #[tokio::test]
    async fn test_demo_load_and_clear_with_persistence() {
        let source = Arc::new(InMemoryEdgeSource::new());
        let state = test_state().with_edge_source(source.clone());
        let app = create_router(state);

        let (status, bytes) = post_body(&app, "/api/load/demo", "text/plain", "").await;
        assert_eq!(status, StatusCode::OK);
        let report: LoadReport = serde_json::from_slice(&bytes).unwrap();
        assert!(report.edges > 0);
        assert_eq!(source.len(), report.edges);

        let (status, bytes) = post_body(&app, "/api/clear", "text/plain", "").await;
        assert_eq!(status, StatusCode::OK);
        let cleared: ClearResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(cleared.persisted);
        assert!(source.is_empty());

        let (_, stats): (_, GraphStatistics) = get_json(&app, "/api/statistics").await;
        assert_eq!(stats, GraphStatistics::default());
    }

    #[tokio::test]
    async fn test_concurrent_loads_keep_persisted_edges_in_sync() {
        let source = Arc::new(StallingEdgeSource::new());
        let app = create_router(test_state().with_edge_source(source.clone()));

        let (first, second) = tokio::join!(
            post_body(&app, "/api/load", "text/csv", "user1,user2\nA,B\n"),
            post_body(&app, "/api/load", "text/csv", "user1,user2\nX,Y\n"),
        );
        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(second.0, StatusCode::OK);

        let (_, served): (_, Vec<String>) = get_json(&app, "/api/users").await;
        assert!(served == ["A", "B"] || served == ["X", "Y"]);
        assert_eq!(persisted_users(source.as_ref()).await, served);
    }

    #[tokio::test]
    async fn test_clear_waits_for_pending_load() {
        let source = Arc::new(StallingEdgeSource::new());
        let app = create_router(test_state().with_edge_source(source.clone()));

        let (load, clear) = tokio::join!(
            post_body(&app, "/api/load", "text/csv", "user1,user2\nA,B\n"),
            post_body(&app, "/api/clear", "text/plain", ""),
        );
        assert_eq!(load.0, StatusCode::OK);
        assert_eq!(clear.0, StatusCode::OK);

        let (_, served): (_, Vec<String>) = get_json(&app, "/api/users").await;
        assert!(served.is_empty() || served == ["A", "B"]);
        assert_eq!(persisted_users(source.as_ref()).await, served);
    }

    #[tokio::test]
    async fn test_readiness_follows_load() {
        let app = create_router(test_state());

        let (status, body): (_, ReadinessResponse) = get_json(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);

        post_body(&app, "/api/load", "text/csv", SCENARIO_CSV).await;

        let (status, _): (_, ReadinessResponse) = get_json(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);

        let (_, health): (_, HealthResponse) = get_json(&app, "/health").await;
        assert!(health.loaded);
        assert_eq!(health.users, 4);
        assert_eq!(health.fingerprint.len(), 16);
    }
}
