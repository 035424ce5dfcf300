//! Message value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;

/// A single entry in a discussion's message log.
///
/// Messages are immutable once appended; the log never removes or reorders
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,
    /// Account that sent the message
    pub sender_id: AccountId,
    /// Message body
    pub content: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(sender_id: AccountId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
