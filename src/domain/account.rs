//! Account directory records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, DiscussionId, DiscussionPreview};

/// An account as the directory stores it.
///
/// Registration and profile edits happen outside this crate; the engine reads
/// accounts for authorization and naming, and maintains the `previews` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Unique account ID
    pub id: AccountId,
    pub display_name: String,
    pub handle: String,
    pub email: String,
    pub photo_url: Option<String>,
    /// Per-discussion previews, keyed by discussion id
    #[serde(default)]
    pub previews: HashMap<DiscussionId, DiscussionPreview>,
}

impl Account {
    /// Create an account record with an empty preview map.
    pub fn new(
        display_name: impl Into<String>,
        handle: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            handle: handle.into(),
            email: email.into(),
            photo_url: None,
            previews: HashMap::new(),
        }
    }

    /// This account's preview of `discussion`, if one exists.
    pub fn preview(&self, discussion: DiscussionId) -> Option<&DiscussionPreview> {
        self.previews.get(&discussion)
    }
}
