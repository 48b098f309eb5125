//! Social Graph Service Binary
//!
//! Runs the social graph kernel as a REST API service:
//! - Structured JSON logging
//! - Request tracing with correlation IDs
//! - Optional PostgreSQL persistence of the edge list
//! - Graceful shutdown handling
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT`: Service port (default: 5000)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `DEFAULT_LIMIT`: Result count for ranked queries (default: 10)
//! - `MAX_USERS`, `MAX_EDGES`: Capacity limits per load
//! - `SEED_CSV`: Demo CSV file (default: data/social_network_demo.csv)
//! - `DATABASE_URL`: PostgreSQL connection string (`postgres` feature only)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! LOG_FORMAT=pretty cargo run --bin social_graph_service --features service
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use social_graph_kernel::service::{create_router, metrics_middleware, ServiceConfig, ServiceState};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "social_graph_service=info,social_graph_kernel=info,tower_http=info,sqlx=warn".into()
    });

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
            )
            .init();
    }
}

/// Request logging middleware that adds correlation ID and timing
async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let trace_id = request
        .headers()
        .get("X-Request-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = request.method().clone();
    let uri = request.uri().path().to_string();

    let span = info_span!(
        "request",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    span.record("status", status);
    span.record("latency_ms", latency.as_millis() as u64);

    info!(
        target: "social_graph_service::access",
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}

/// Connect to PostgreSQL, hydrate the graph and attach the edge source.
#[cfg(feature = "postgres")]
async fn attach_postgres(state: ServiceState) -> Result<ServiceState, Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use social_graph_kernel::store::postgres::PostgresConfig;
    use social_graph_kernel::{EdgeSource, PostgresEdgeSource};

    let Some(config) = PostgresConfig::from_env() else {
        info!("DATABASE_URL not set, running without persistence");
        return Ok(state);
    };

    info!("Connecting to PostgreSQL...");
    let connect_start = Instant::now();

    let source = match tokio::time::timeout(
        std::time::Duration::from_secs(30),
        PostgresEdgeSource::new(config),
    )
    .await
    {
        Ok(Ok(source)) => source,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            return Err(e.into());
        }
        Err(_) => {
            tracing::error!("PostgreSQL connection timeout after 30s");
            return Err("Database connection timeout".into());
        }
    };

    source.ensure_schema().await?;
    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        "PostgreSQL connection established"
    );

    let edges = source.fetch_edges().await?;
    if !edges.is_empty() {
        let report = state.graph.reload(&edges, &state.config.limits)?;
        state.mark_loaded();
        info!(
            users = report.users,
            edges = report.edges,
            fingerprint = %report.fingerprint,
            "Graph hydrated from PostgreSQL"
        );
    }

    Ok(state.with_edge_source(Arc::new(source)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(
        version = version,
        build_sha = build_sha,
        "Starting Social Graph Service"
    );

    let config = ServiceConfig::from_env();
    info!(
        default_limit = config.default_limit,
        max_users = config.limits.max_users,
        max_edges = config.limits.max_edges,
        seed_csv = ?config.seed_csv,
        "Configuration loaded"
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = ServiceState::new(config);

    #[cfg(feature = "postgres")]
    let state = attach_postgres(state).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    info!(
        address = %addr,
        version = version,
        "Social Graph Service listening"
    );

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
            _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
        }
    };

    info!("Ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Social Graph Service shutdown complete");

    Ok(())
}
