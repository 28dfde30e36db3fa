// ============================================================================
// Axum Middleware
// ============================================================================
//
// - request_logging: method, path, status and duration of every request
//
// ============================================================================

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Request logging middleware
pub async fn request_logging(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    tracing::debug!(
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "Request completed"
    );

    response
}
