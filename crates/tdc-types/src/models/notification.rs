//! Announcements broadcast by admins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A notification as listed to users and admins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Server identifier
    pub id: i64,
    /// Headline
    pub title: String,
    /// Body text
    #[serde(default)]
    pub description: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Body of `POST admin/notifications/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct NotificationDraft {
    /// Headline
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub description: String,
}

impl NotificationDraft {
    /// Local stand-in shown until the server confirms the create.
    pub fn to_pending(&self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: 0,
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: now,
        }
    }
}
