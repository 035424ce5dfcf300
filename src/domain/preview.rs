//! Per-member discussion previews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Message};

/// Denormalized summary of one discussion for one member's list view.
///
/// Owned by the fan-out path; apart from the read-marker reset nothing else
/// writes these entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscussionPreview {
    /// Body of the latest message, empty until one exists
    pub last_message: String,
    /// Sender of the latest message
    pub last_message_sender: Option<AccountId>,
    /// Timestamp of the latest message
    pub last_message_at: Option<DateTime<Utc>>,
    /// Messages appended since this member last marked the discussion read
    pub unread_count: u32,
}

impl DiscussionPreview {
    /// Preview state for a member with nothing to show yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Overwrite the latest-message fields, leaving the unread counter
    /// untouched.
    pub fn record_message(&mut self, message: &Message) {
        self.last_message = message.content.clone();
        self.last_message_sender = Some(message.sender_id);
        self.last_message_at = Some(message.timestamp);
    }
}
