//! Support tickets and their chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ticket lifecycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

/// A single chat message inside a ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Server identifier
    pub id: i64,
    /// Owning ticket
    pub ticket: i64,
    /// Text content
    pub content: String,
    /// Whether an admin sent this message
    #[serde(default)]
    pub is_admin: bool,
    /// Read flag, set by the recipient
    #[serde(default)]
    pub is_read: bool,
    /// Send time
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Only the recipient may mark a message read: admins read participant
    /// messages and participants read admin messages.
    pub const fn can_mark_read(&self, viewer_is_admin: bool) -> bool {
        self.is_admin != viewer_is_admin
    }

    /// Unread from the point of view of `viewer_is_admin`.
    pub const fn is_unread_for(&self, viewer_is_admin: bool) -> bool {
        !self.is_read && self.can_mark_read(viewer_is_admin)
    }
}

/// A support ticket with its conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Server identifier
    pub id: i64,
    /// Short description of the issue
    pub subject: String,
    /// Open or closed
    #[serde(default)]
    pub status: TicketStatus,
    /// Team that raised the ticket (admin listings only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Conversation, ordered by creation time
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Ticket {
    /// Whether new messages may still be posted.
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }

    /// Restore creation-time ordering of messages.
    pub fn sort_messages(&mut self) {
        self.messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    /// Number of messages the viewer has not read yet.
    pub fn unread_for(&self, viewer_is_admin: bool) -> usize {
        self.messages.iter().filter(|m| m.is_unread_for(viewer_is_admin)).count()
    }

    /// Mark every message addressed to the viewer as read. Returns how many changed.
    pub fn mark_read_for(&mut self, viewer_is_admin: bool) -> usize {
        let mut changed = 0;
        for message in &mut self.messages {
            if message.is_unread_for(viewer_is_admin) {
                message.is_read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Last message in the conversation.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.iter().max_by_key(|m| m.created_at)
    }
}

/// Body of `POST tickets/create/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct CreateTicketRequest {
    /// Short description of the issue
    #[validate(length(min = 1, max = 120, message = "Subject is required"))]
    pub subject: String,
    /// Opening message
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// Body of `POST tickets/message/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct SendMessageRequest {
    /// Target ticket
    pub ticket: i64,
    /// Text content
    #[validate(length(min = 1, message = "Message is required"))]
    pub content: String,
}

/// Body of `POST tickets/mark-as-read/` and `POST tickets/mark-as-closed/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketRef {
    /// Target ticket
    pub ticket: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(id: i64, is_admin: bool, is_read: bool, minute: u32) -> Message {
        Message {
            id,
            ticket: 1,
            content: format!("m{id}"),
            is_admin,
            is_read,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 10, minute, 0).unwrap(),
        }
    }

    fn ticket(messages: Vec<Message>) -> Ticket {
        Ticket {
            id: 1,
            subject: "Video upload fails".to_string(),
            status: TicketStatus::Open,
            team_name: None,
            created_at: Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
            messages,
        }
    }

    #[test]
    fn test_only_recipient_marks_read() {
        let from_admin = message(1, true, false, 1);
        assert!(from_admin.can_mark_read(false));
        assert!(!from_admin.can_mark_read(true));
    }

    #[test]
    fn test_mark_read_for_participant() {
        let mut t = ticket(vec![message(1, false, false, 1), message(2, true, false, 2)]);

        assert_eq!(t.unread_for(false), 1);
        assert_eq!(t.unread_for(true), 1);
        assert_eq!(t.mark_read_for(false), 1);
        assert_eq!(t.unread_for(false), 0);
        // participant's own message is still unread for the admin
        assert_eq!(t.unread_for(true), 1);
    }

    #[test]
    fn test_sort_messages_by_creation() {
        let mut t = ticket(vec![message(3, true, false, 5), message(2, false, false, 1)]);
        t.sort_messages();
        assert_eq!(t.messages[0].id, 2);
        assert_eq!(t.last_message().map(|m| m.id), Some(3));
    }
}
