// ============================================================================
// Axum Extractors
// ============================================================================
//
// - CurrentUser: runs the authentication gate on the Authorization header
//   and binds the resolved account for the handler
// - ApiJson: JSON body extractor whose rejections render as validation errors
//
// Handlers list CurrentUser before any body extractor, so an unauthenticated
// request is rejected before its body is read.
//
// ============================================================================

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use missive_error::AppError;
use missive_types::User;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth;
use crate::context::AppContext;
use crate::utils::log_safe_id;

/// The account the request acts as.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppContext>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| auth::unreadable_header())?),
        };

        let user = auth::authenticate(state.store.as_ref(), header).await?;
        tracing::debug!(
            user_hash = %log_safe_id(&user.id.to_string(), state.log_salt()),
            "Request authenticated"
        );
        Ok(CurrentUser(user))
    }
}

/// `Json<T>` that reports malformed bodies as validation failures.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("Expected request with `Content-Type: application/json`")
        }
        other => AppError::validation(other.body_text()),
    }
}
