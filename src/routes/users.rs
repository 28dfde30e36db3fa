// ============================================================================
// Account Routes
// ============================================================================
//
// Anonymous endpoints of the authentication provider:
// - POST /users    - Register an account, returns its bearer token
// - POST /sessions - Exchange e-mail and credential for the bearer token
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use missive_error::AppError;
use missive_types::Permission;
use serde_json::json;
use std::sync::Arc;

use crate::account_service::{self, Login, Registration};
use crate::context::AppContext;
use crate::routes::extractors::ApiJson;
use crate::utils::log_safe_id;

/// POST /users
pub async fn register(
    State(app_context): State<Arc<AppContext>>,
    ApiJson(registration): ApiJson<Registration>,
) -> Result<impl IntoResponse, AppError> {
    let user = account_service::register(
        app_context.store.as_ref(),
        &app_context.auth,
        registration,
        Permission::Normal,
    )
    .await?;

    tracing::info!(
        user_hash = %log_safe_id(&user.id.to_string(), app_context.log_salt()),
        "Account registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "token": user.token,
        })),
    ))
}

/// POST /sessions
pub async fn login(
    State(app_context): State<Arc<AppContext>>,
    ApiJson(login): ApiJson<Login>,
) -> Result<impl IntoResponse, AppError> {
    let user = account_service::login(app_context.store.as_ref(), &app_context.auth, login).await?;
    Ok(Json(json!({ "token": user.token })))
}
