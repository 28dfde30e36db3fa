// ============================================================================
// Axum Routes Module
// ============================================================================
//
// Structure:
// - mod.rs: Main router assembly and middleware
// - health.rs: Health check and metrics endpoints
// - messages.rs: Message listing, creation, lookup and status changes
// - profile.rs: Own profile and token rotation
// - users.rs: Registration and login (anonymous)
// - admin.rs: Master-only views
// - extractors.rs: CurrentUser (authentication gate) and ApiJson
// - middleware.rs: Request logging
//
// ============================================================================

mod admin;
mod extractors;
mod health;
mod messages;
mod middleware;
mod profile;
mod users;

pub use extractors::{ApiJson, CurrentUser};
pub use messages::MessageResponse;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the main application router with all routes
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    let body_limit = app_context.config.security.max_request_body_size;

    Router::new()
        // Health and monitoring
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        // Authentication provider (anonymous)
        .route("/users", post(users::register))
        .route("/sessions", post(users::login))
        // Messages
        .route(
            "/messages",
            get(messages::list_received).post(messages::create_message),
        )
        .route("/messages/sent", get(messages::list_sent))
        .route("/messages/archived", get(messages::list_archived))
        .route("/messages/archive", patch(messages::archive_messages))
        .route("/messages/:id", get(messages::show_message))
        .route("/messages/:id/status", patch(messages::update_status))
        // Profile
        .route(
            "/profile",
            get(profile::show_profile)
                .put(profile::update_profile)
                .patch(profile::update_profile),
        )
        .route("/profile/token", post(profile::rotate_token))
        // Admin
        .route("/admin/messages", get(admin::list_messages))
        // Apply middleware (order matters - last added runs first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(DefaultBodyLimit::max(body_limit))
                .into_inner(),
        )
        .with_state(app_context)
}
