use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

/// Message lifecycle. Only moves forward: `unread -> read -> archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Read,
    Archived,
}

impl MessageStatus {
    /// Stored representation (`messages.status` column). Ordering matches the lifecycle.
    pub fn as_i16(self) -> i16 {
        match self {
            MessageStatus::Unread => 0,
            MessageStatus::Read => 1,
            MessageStatus::Archived => 2,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(MessageStatus::Unread),
            1 => Some(MessageStatus::Read),
            2 => Some(MessageStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
            MessageStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Insert payload. `receiver_id` is `None` when the recipient could not be resolved;
/// the store rejects such a write.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub title: String,
    pub content: String,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_present("Title", Some(&self.title));
        errors.require_present("Content", Some(&self.content));
        if self.receiver_id.is_none() {
            errors.add("Receiver must exist");
        }
        errors.into_result()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Status cannot change from {from} to {to}")]
    Regression {
        from: MessageStatus,
        to: MessageStatus,
    },
}

impl From<TransitionError> for ValidationErrors {
    fn from(err: TransitionError) -> Self {
        ValidationErrors::single(err.to_string())
    }
}

/// A planned status move together with the timestamps the row ends up with.
///
/// `from` is the status the plan was computed against; stores use it as the
/// compare-and-set guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: MessageStatus,
    pub to: MessageStatus,
    pub read_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Plans a move to `to`.
    ///
    /// Returns `Ok(None)` when the message already has that status. `read_at`
    /// is stamped only on `unread -> read`, `archived_at` only on the first
    /// move into `archived`; neither is overwritten once set.
    pub fn plan_status_change(
        &self,
        to: MessageStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>, TransitionError> {
        let from = self.status;
        if to == from {
            return Ok(None);
        }
        if to < from {
            return Err(TransitionError::Regression { from, to });
        }

        let read_at = match (from, to, self.read_at) {
            (MessageStatus::Unread, MessageStatus::Read, None) => Some(now),
            (_, _, existing) => existing,
        };
        let archived_at = match (to, self.archived_at) {
            (MessageStatus::Archived, None) => Some(now),
            (_, existing) => existing,
        };

        Ok(Some(StatusChange {
            from,
            to,
            read_at,
            archived_at,
        }))
    }

    pub fn apply(&mut self, change: &StatusChange) {
        self.status = change.to;
        self.read_at = change.read_at;
        self.archived_at = change.archived_at;
    }

    pub fn is_archived(&self) -> bool {
        self.status == MessageStatus::Archived
    }
}

/// Public identity of a message participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A message joined with both participants, as returned by store queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetails {
    pub message: Message,
    pub sender: Participant,
    pub receiver: Participant,
}
