//! # Missive Database
//!
//! The abstract relational store behind the API. Two implementations share
//! the same contract:
//!
//! - [`PgStore`]: PostgreSQL via sqlx; constraint violations surface as
//!   validation errors.
//! - [`MemoryStore`]: process-local tables for tests and demos.
//!
//! Every mutation is a single statement (or a single critical section for the
//! in-memory tables), so an aborted request never leaves a half-written row.

mod filter;
mod memory;
mod postgres;

pub use filter::{MessageFilter, StatusFilter};
pub use memory::MemoryStore;
pub use postgres::{create_pool, DbPool, PgStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use missive_error::AppResult;
use missive_types::{MessageDetails, NewMessage, NewUser, StatusChange, User, UserChanges};
use std::sync::Arc;
use uuid::Uuid;

/// Account storage and token lookup
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts an account. Fails with a validation error on blank fields or a
    /// duplicate e-mail.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Exact match on the stored token.
    async fn find_user_by_token(&self, token: &str) -> AppResult<Option<User>>;

    /// Case-insensitive match on the normalised e-mail.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Applies the present fields of `changes` to one row and returns it.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Replaces the bearer token; the previous one stops resolving.
    async fn replace_token(&self, id: Uuid, token: &str) -> AppResult<()>;
}

/// Message storage. All list queries return newest first.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts a message in status `unread`. Fails with a validation error
    /// (and writes nothing) on blank fields or an unresolved receiver.
    async fn create_message(&self, new_message: NewMessage) -> AppResult<MessageDetails>;

    async fn find_messages(&self, filter: &MessageFilter) -> AppResult<Vec<MessageDetails>>;

    async fn count_messages(&self, filter: &MessageFilter) -> AppResult<i64>;

    /// Looks a message up by id, scoped to `receiver_id`.
    async fn find_received_message(
        &self,
        receiver_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<MessageDetails>>;

    /// Writes a planned status change if the row still has `change.from`.
    /// Returns `None` when the row moved in the meantime.
    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> AppResult<Option<MessageDetails>>;

    /// Archives the listed messages that `receiver_id` received and that are
    /// not archived yet. Returns how many rows changed.
    async fn archive_received(
        &self,
        receiver_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> AppResult<u64>;
}

/// Everything the services need from persistence
#[async_trait]
pub trait Store: UserStore + MessageStore {
    /// Liveness check for the health endpoint
    async fn ping(&self) -> AppResult<()>;

    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn Store>;
