// ============================================================================
// In-memory store
// ============================================================================
//
// Same contract as the PostgreSQL store, backed by process-local tables
// behind one RwLock. Each operation holds the lock for its whole critical
// section, which gives single-row atomicity for creates and updates.
//
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use missive_error::{AppError, AppResult};
use missive_types::{
    normalize_email, Message, MessageDetails, MessageStatus, NewMessage, NewUser, Participant,
    StatusChange, User, UserChanges, ValidationErrors,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{MessageFilter, MessageStore, Store, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    /// token -> user id
    tokens: HashMap<String, Uuid>,
    /// Insertion order; newest last
    messages: Vec<Message>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn participant(&self, id: Uuid) -> AppResult<Participant> {
        self.users
            .get(&id)
            .map(|u| Participant {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .ok_or_else(|| AppError::internal(format!("message references missing user {}", id)))
    }

    fn details(&self, message: &Message) -> AppResult<MessageDetails> {
        Ok(MessageDetails {
            message: message.clone(),
            sender: self.participant(message.sender_id)?,
            receiver: self.participant(message.receiver_id)?,
        })
    }

    /// Validates and stores a message under the caller's write lock.
    fn insert_message(
        &mut self,
        new_message: NewMessage,
        status: MessageStatus,
        created_at: DateTime<Utc>,
    ) -> AppResult<MessageDetails> {
        new_message.validate()?;
        let receiver_id = match new_message.receiver_id {
            Some(id) if self.users.contains_key(&id) => id,
            _ => return Err(ValidationErrors::single("Receiver must exist").into()),
        };
        if !self.users.contains_key(&new_message.sender_id) {
            return Err(ValidationErrors::single("Sender must exist").into());
        }

        let message = Message {
            id: Uuid::new_v4(),
            title: new_message.title,
            content: new_message.content,
            sender_id: new_message.sender_id,
            receiver_id,
            status,
            created_at,
            read_at: (status == MessageStatus::Read).then_some(created_at),
            archived_at: (status == MessageStatus::Archived).then_some(created_at),
        };
        let details = self.details(&message)?;
        self.messages.push(message);
        Ok(details)
    }

    /// Matching messages, newest first. Equal timestamps keep reverse insertion order.
    fn select(&self, filter: &MessageFilter) -> Vec<&Message> {
        let mut selected: Vec<&Message> = self
            .messages
            .iter()
            .rev()
            .filter(|m| filter.matches(m))
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}

/// Process-local store
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

}

/// Fixture helpers for tests
#[cfg(any(test, feature = "test-utils"))]
impl MemoryStore {
    /// Number of stored messages, whatever their status
    pub async fn message_count(&self) -> usize {
        self.tables.read().await.messages.len()
    }

    /// Stores a message with an explicit status and creation time, applying
    /// the same validation as the create path.
    pub async fn insert_message_at(
        &self,
        new_message: NewMessage,
        status: MessageStatus,
        created_at: DateTime<Utc>,
    ) -> AppResult<MessageDetails> {
        self.tables
            .write()
            .await
            .insert_message(new_message, status, created_at)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;
        let email = normalize_email(&new_user.email);

        let mut tables = self.tables.write().await;
        if tables.email_taken(&email, None) {
            return Err(ValidationErrors::single("Email has already been taken").into());
        }
        if tables.tokens.contains_key(&new_user.token) {
            return Err(ValidationErrors::single("Token has already been taken").into());
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.trim().to_string(),
            email,
            credential_hash: new_user.credential_hash,
            token: new_user.token,
            permission: new_user.permission,
            created_at: Utc::now(),
        };
        tables.tokens.insert(user.token.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        changes.validate()?;
        let email = changes.email.as_deref().map(normalize_email);

        let mut tables = self.tables.write().await;
        if let Some(email) = &email {
            if tables.email_taken(email, Some(id)) {
                return Err(ValidationErrors::single("Email has already been taken").into());
            }
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User", id))?;
        if let Some(name) = changes.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(hash) = changes.credential_hash {
            user.credential_hash = hash;
        }
        Ok(user.clone())
    }

    async fn replace_token(&self, id: Uuid, token: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.tokens.contains_key(token) {
            return Err(ValidationErrors::single("Token has already been taken").into());
        }
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User", id))?;
        let previous = std::mem::replace(&mut user.token, token.to_string());
        tables.tokens.remove(&previous);
        tables.tokens.insert(token.to_string(), id);
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, new_message: NewMessage) -> AppResult<MessageDetails> {
        self.tables
            .write()
            .await
            .insert_message(new_message, MessageStatus::Unread, Utc::now())
    }

    async fn find_messages(&self, filter: &MessageFilter) -> AppResult<Vec<MessageDetails>> {
        let tables = self.tables.read().await;
        tables
            .select(filter)
            .into_iter()
            .map(|m| tables.details(m))
            .collect()
    }

    async fn count_messages(&self, filter: &MessageFilter) -> AppResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.messages.iter().filter(|m| filter.matches(m)).count() as i64)
    }

    async fn find_received_message(
        &self,
        receiver_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<MessageDetails>> {
        let tables = self.tables.read().await;
        tables
            .messages
            .iter()
            .find(|m| m.id == id && m.receiver_id == receiver_id)
            .map(|m| tables.details(m))
            .transpose()
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<MessageDetails>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables
            .messages
            .iter()
            .position(|m| m.id == id && m.status == change.from)
        else {
            return Ok(None);
        };
        tables.messages[index].apply(change);
        let updated = tables.messages[index].clone();
        tables.details(&updated).map(Some)
    }

    async fn archive_received(
        &self,
        receiver_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut archived = 0;
        for message in tables.messages.iter_mut().filter(|m| {
            m.receiver_id == receiver_id && !m.is_archived() && ids.contains(&m.id)
        }) {
            message.status = MessageStatus::Archived;
            message.archived_at.get_or_insert(now);
            archived += 1;
        }
        Ok(archived)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
