use missive_types::{Message, MessageStatus};
use uuid::Uuid;

/// Status constraint of a [`MessageFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Any,
    /// Everything except `archived`
    Active,
    Only(MessageStatus),
}

impl StatusFilter {
    pub fn matches(self, status: MessageStatus) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Active => status != MessageStatus::Archived,
            StatusFilter::Only(wanted) => status == wanted,
        }
    }
}

/// Ownership-scoped message query.
///
/// Plain data: stores translate it to SQL or evaluate [`MessageFilter::matches`]
/// row by row, so visibility rules live in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFilter {
    pub receiver_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub status: StatusFilter,
}

impl MessageFilter {
    /// Inbox view: received by `user`, not archived
    pub fn received_by(user: Uuid) -> Self {
        Self {
            receiver_id: Some(user),
            sender_id: None,
            status: StatusFilter::Active,
        }
    }

    /// Every message `user` received, whatever its status
    pub fn all_received_by(user: Uuid) -> Self {
        Self {
            status: StatusFilter::Any,
            ..Self::received_by(user)
        }
    }

    /// Received by `user` and archived
    pub fn archived_for(user: Uuid) -> Self {
        Self {
            status: StatusFilter::Only(MessageStatus::Archived),
            ..Self::received_by(user)
        }
    }

    /// Outbox view: sent by `user`, not archived
    pub fn sent_by(user: Uuid) -> Self {
        Self {
            receiver_id: None,
            sender_id: Some(user),
            status: StatusFilter::Active,
        }
    }

    /// Every non-archived message in the system
    pub fn active() -> Self {
        Self {
            receiver_id: None,
            sender_id: None,
            status: StatusFilter::Active,
        }
    }

    pub fn matches(&self, message: &Message) -> bool {
        self.receiver_id.map_or(true, |id| message.receiver_id == id)
            && self.sender_id.map_or(true, |id| message.sender_id == id)
            && self.status.matches(message.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(sender: Uuid, receiver: Uuid, status: MessageStatus) -> Message {
        Message {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            sender_id: sender,
            receiver_id: receiver,
            status,
            created_at: Utc::now(),
            read_at: None,
            archived_at: None,
        }
    }

    #[test]
    fn inbox_excludes_archived_and_foreign_messages() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let filter = MessageFilter::received_by(me);

        assert!(filter.matches(&message(other, me, MessageStatus::Unread)));
        assert!(filter.matches(&message(other, me, MessageStatus::Read)));
        assert!(!filter.matches(&message(other, me, MessageStatus::Archived)));
        assert!(!filter.matches(&message(me, other, MessageStatus::Unread)));
    }

    #[test]
    fn all_received_counts_every_status() {
        let me = Uuid::new_v4();
        let filter = MessageFilter::all_received_by(me);
        assert!(filter.matches(&message(Uuid::new_v4(), me, MessageStatus::Archived)));
    }

    #[test]
    fn outbox_matches_sender_only() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let filter = MessageFilter::sent_by(me);
        assert!(filter.matches(&message(me, other, MessageStatus::Read)));
        assert!(!filter.matches(&message(me, other, MessageStatus::Archived)));
        assert!(!filter.matches(&message(other, me, MessageStatus::Unread)));
    }

    #[test]
    fn archived_view() {
        let me = Uuid::new_v4();
        let filter = MessageFilter::archived_for(me);
        assert!(filter.matches(&message(Uuid::new_v4(), me, MessageStatus::Archived)));
        assert!(!filter.matches(&message(Uuid::new_v4(), me, MessageStatus::Read)));
    }
}
