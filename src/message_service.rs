// ============================================================================
// Message Service
// ============================================================================
//
// Ownership-scoped operations on messages. Every function takes the acting
// user explicitly; there is no request-scoped state.
//
// - list_received / list_sent / list_archived: visibility queries
// - create: sender is always the caller, receiver resolved by e-mail
// - show: receiver-owned lookup; missing and foreign ids are both NotFound
// - update_status / archive_many: the forward-only status lifecycle
// - list_all_active: master-only view over every active message
//
// ============================================================================

use chrono::Utc;
use missive_db::{MessageFilter, Store};
use missive_error::{AppError, AppResult};
use missive_types::{MessageDetails, MessageStatus, NewMessage, User, ValidationErrors};
use serde::Deserialize;
use uuid::Uuid;

use crate::metrics;

pub const FORBIDDEN_MESSAGE: &str = "You are not allowed to access this resource";
pub const CONCURRENT_CHANGE_MESSAGE: &str = "Status was changed by another request";

/// Create payload. The receiver is addressed by e-mail, never by id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub receiver_email: Option<String>,
}

/// Messages received by `user` that are not archived, newest first.
pub async fn list_received(store: &dyn Store, user: &User) -> AppResult<Vec<MessageDetails>> {
    store.find_messages(&MessageFilter::received_by(user.id)).await
}

/// Messages sent by `user` that are not archived, newest first.
pub async fn list_sent(store: &dyn Store, user: &User) -> AppResult<Vec<MessageDetails>> {
    store.find_messages(&MessageFilter::sent_by(user.id)).await
}

pub async fn list_archived(store: &dyn Store, user: &User) -> AppResult<Vec<MessageDetails>> {
    store.find_messages(&MessageFilter::archived_for(user.id)).await
}

/// Every non-archived message in the system. Master accounts only.
pub async fn list_all_active(store: &dyn Store, user: &User) -> AppResult<Vec<MessageDetails>> {
    if !user.is_master() {
        return Err(AppError::forbidden(FORBIDDEN_MESSAGE));
    }
    store.find_messages(&MessageFilter::active()).await
}

/// Creates a message from `user`.
///
/// An unknown receiver e-mail is not checked up front: the unresolved
/// reference goes to the store, which rejects the write.
pub async fn create(
    store: &dyn Store,
    user: &User,
    request: CreateMessage,
) -> AppResult<MessageDetails> {
    let receiver_id = match request.receiver_email.as_deref() {
        Some(email) if !email.trim().is_empty() => {
            store.find_user_by_email(email).await?.map(|u| u.id)
        }
        _ => None,
    };

    let details = store
        .create_message(NewMessage {
            title: request.title.trim().to_string(),
            content: request.content.trim().to_string(),
            sender_id: user.id,
            receiver_id,
        })
        .await?;

    metrics::MESSAGES_CREATED_TOTAL.inc();
    tracing::debug!(message_id = %details.message.id, "Message created");
    Ok(details)
}

/// Looks up a message the caller received. Unparsable ids are reported like
/// missing ones.
pub async fn show(store: &dyn Store, user: &User, id: &str) -> AppResult<MessageDetails> {
    let id = parse_message_id(id)?;
    store
        .find_received_message(user.id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Message", id))
}

/// Moves a received message forward through `unread -> read -> archived`.
///
/// Requesting the current status returns the message untouched. The write is
/// guarded on the status the plan was made against.
pub async fn update_status(
    store: &dyn Store,
    user: &User,
    id: &str,
    status: MessageStatus,
) -> AppResult<MessageDetails> {
    let current = show(store, user, id).await?;

    let change = current
        .message
        .plan_status_change(status, Utc::now())
        .map_err(ValidationErrors::from)?;
    let Some(change) = change else {
        return Ok(current);
    };

    let updated = store
        .apply_status_change(current.message.id, &change)
        .await?
        .ok_or_else(|| AppError::validation(CONCURRENT_CHANGE_MESSAGE))?;

    metrics::STATUS_TRANSITIONS_TOTAL.inc();
    tracing::debug!(
        message_id = %updated.message.id,
        from = %change.from,
        to = %change.to,
        "Message status changed"
    );
    Ok(updated)
}

/// Archives the listed messages the caller received. Ids the caller did not
/// receive, already archived ones and unparsable ones are skipped.
pub async fn archive_many(store: &dyn Store, user: &User, ids: &[String]) -> AppResult<u64> {
    let ids: Vec<Uuid> = ids
        .iter()
        .filter_map(|id| Uuid::parse_str(id.trim()).ok())
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    let archived = store.archive_received(user.id, &ids, Utc::now()).await?;
    metrics::STATUS_TRANSITIONS_TOTAL.inc_by(archived);
    Ok(archived)
}

fn parse_message_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found("Message", raw))
}
