// ============================================================================
// Profile Routes
// ============================================================================
//
// Endpoints:
// - GET       /profile       - Own profile with message counts
// - PUT/PATCH /profile       - Update own name, e-mail or credential
// - POST      /profile/token - Rotate own bearer token
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use missive_error::AppError;
use serde_json::json;
use std::sync::Arc;

use crate::context::AppContext;
use crate::profile_service::{self, ProfileUpdate};
use crate::routes::extractors::{ApiJson, CurrentUser};
use crate::utils::log_safe_id;

/// GET /profile
pub async fn show_profile(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let profile = profile_service::show(app_context.store.as_ref(), &user).await?;
    Ok(Json(profile))
}

/// PUT/PATCH /profile
pub async fn update_profile(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    profile_service::update(app_context.store.as_ref(), &app_context.auth, &user, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /profile/token
pub async fn rotate_token(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let token =
        profile_service::rotate_token(app_context.store.as_ref(), &app_context.auth, &user)
            .await?;
    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), app_context.log_salt()),
        "Bearer token rotated"
    );
    Ok(Json(json!({ "token": token })))
}
