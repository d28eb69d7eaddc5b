//! Health check endpoints for monitoring and load balancers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

/// Paths served by [`routes`]; no resource manager may mount under them.
pub const RESERVED_PATHS: [&str; 2] = ["/health", "/_liveness"];

/// Plural names of the mounted resource types.
pub type MountedResources = Arc<Vec<String>>;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` with `{"status": "healthy", "resources": [...], "timestamp": ...}`
pub async fn health_handler(State(resources): State<MountedResources>) -> Response {
    debug!("Processing health check request");

    let body = serde_json::json!({
        "status": "healthy",
        "resources": resources.as_slice(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(body)).into_response()
}

/// Liveness probe.
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Routes for `/health` and `/_liveness`.
pub fn routes(resources: Vec<String>) -> Router {
    Router::new()
        .route(RESERVED_PATHS[0], get(health_handler))
        .route(RESERVED_PATHS[1], get(liveness_handler))
        .with_state(Arc::new(resources))
}
