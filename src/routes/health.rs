// ============================================================================
// Health and Metrics Routes
// ============================================================================
//
// Endpoints:
// - GET /health - Store liveness check
// - GET /metrics - Prometheus metrics
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::context::AppContext;
use crate::metrics;

/// GET /health
pub async fn health_check(State(app_context): State<Arc<AppContext>>) -> impl IntoResponse {
    match app_context.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!(
                backend = app_context.store.backend_name(),
                error = %e,
                "Health check failed"
            );
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        }
    }
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(metrics_data) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_data,
        ),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain")],
                "Internal Server Error".to_string(),
            )
        }
    }
}
