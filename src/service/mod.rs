//! Social Graph REST Service
//!
//! Exposes the social graph kernel as a REST API.
//!
//! ## Endpoints
//!
//! - `GET /api/statistics` - User count, edge count and average degree
//! - `GET /api/users` - All user names, sorted
//! - `GET /api/influencers?limit=` - Most connected users
//! - `GET /api/recommendations/:username?limit=` - Friend recommendations
//! - `POST /api/mutual-friends` - Friends shared by two users
//! - `GET /api/graph-data` - Whole graph as nodes and edges
//! - `POST /api/load` - Replace the graph with a CSV or JSON edge list
//! - `POST /api/load/demo` - Replace the graph with the demo network
//! - `POST /api/clear` - Empty the graph
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_load_metrics};
pub use routes::{create_router, AppState, ErrorResponse};
pub use state::{ServiceConfig, ServiceState};
