// ============================================================================
// Messages Routes
// ============================================================================
//
// Endpoints:
// - GET   /messages            - Received, non-archived messages
// - POST  /messages            - Send a message to a user by e-mail
// - GET   /messages/sent       - Sent, non-archived messages
// - GET   /messages/archived   - Received, archived messages
// - PATCH /messages/archive    - Archive several received messages
// - GET   /messages/:id        - One received message
// - PATCH /messages/:id/status - Move a received message forward
//
// ============================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use missive_error::AppError;
use missive_types::{MessageDetails, MessageStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;
use crate::message_service::{self, CreateMessage};
use crate::routes::extractors::{ApiJson, CurrentUser};

#[derive(Debug, Serialize)]
pub struct SenderResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// The receiver's e-mail is not exposed.
#[derive(Debug, Serialize)]
pub struct ReceiverResponse {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub sender: SenderResponse,
    pub receiver: ReceiverResponse,
}

impl From<MessageDetails> for MessageResponse {
    fn from(details: MessageDetails) -> Self {
        let MessageDetails {
            message,
            sender,
            receiver,
        } = details;
        Self {
            id: message.id,
            title: message.title,
            content: message.content,
            status: message.status,
            created_at: message.created_at,
            read_at: message.read_at,
            archived_at: message.archived_at,
            sender: SenderResponse {
                id: sender.id,
                name: sender.name,
                email: sender.email,
            },
            receiver: ReceiverResponse {
                id: receiver.id,
                name: receiver.name,
            },
        }
    }
}

fn render(messages: Vec<MessageDetails>) -> Json<Vec<MessageResponse>> {
    Json(messages.into_iter().map(MessageResponse::from).collect())
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: MessageStatus,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// GET /messages
pub async fn list_received(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let messages = message_service::list_received(app_context.store.as_ref(), &user).await?;
    Ok(render(messages))
}

/// GET /messages/sent
pub async fn list_sent(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let messages = message_service::list_sent(app_context.store.as_ref(), &user).await?;
    Ok(render(messages))
}

/// GET /messages/archived
pub async fn list_archived(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let messages = message_service::list_archived(app_context.store.as_ref(), &user).await?;
    Ok(render(messages))
}

/// POST /messages
pub async fn create_message(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<CreateMessage>,
) -> Result<impl IntoResponse, AppError> {
    let created = message_service::create(app_context.store.as_ref(), &user, request).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(created))))
}

/// GET /messages/:id
pub async fn show_message(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let message = message_service::show(app_context.store.as_ref(), &user, &id).await?;
    Ok(Json(MessageResponse::from(message)))
}

/// PATCH /messages/:id/status
pub async fn update_status(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message =
        message_service::update_status(app_context.store.as_ref(), &user, &id, request.status)
            .await?;
    Ok(Json(MessageResponse::from(message)))
}

/// PATCH /messages/archive
pub async fn archive_messages(
    State(app_context): State<Arc<AppContext>>,
    CurrentUser(user): CurrentUser,
    ApiJson(request): ApiJson<ArchiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let archived =
        message_service::archive_many(app_context.store.as_ref(), &user, &request.ids).await?;
    Ok(Json(json!({ "archived": archived })))
}
