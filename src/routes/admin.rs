// ============================================================================
// Admin Routes
// ============================================================================
//
// Endpoints:
// - GET /admin/messages - Every non-archived message (master accounts only)
//
// ============================================================================

use axum::{extract::State, response::IntoResponse, Json};
use missive_error::AppError;
use std::sync::Arc;

use crate::context::AppContext;
use crate::message_service;
use crate::routes::extractors::CurrentUser;
use crate::routes::messages::MessageResponse;

/// GET /admin/messages
pub async fn list_messages(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let messages = message_service::list_all_active(app_context.store.as_ref(), &user).await?;
    Ok(Json(
        messages
            .into_iter()
            .map(MessageResponse::from)
            .collect::<Vec<_>>(),
    ))
}
