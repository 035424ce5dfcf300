//! The discussion aggregate.
//!
//! `Discussion` is the unit of authorization and atomic mutation: membership,
//! roles, and the append-only message log live on one record, and every
//! mutation path rewrites the whole record through the gateway's
//! conflict-detecting commit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, DiscussionId, Message};

/// A group discussion: membership, roles, and the message log.
///
/// Membership collections are vectors with set semantics; insertion order is
/// stable and is what the blank-rename fallback joins. The creator is
/// permanently an admin and participant, and every admin is a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discussion {
    /// Unique discussion ID, assigned at creation
    pub id: DiscussionId,
    /// Display name, never blank after normalization
    pub name: String,
    pub description: String,
    /// Account that created the discussion
    pub creator_id: AccountId,
    /// Member ids in join order
    pub participants: Vec<AccountId>,
    /// Admin ids, always a subset of `participants`
    pub admins: Vec<AccountId>,
    /// Append-only message log
    pub messages: Vec<Message>,
    /// When the discussion was created
    pub created_at: DateTime<Utc>,
}

impl Discussion {
    /// Create a discussion with `creator_id` as sole participant and admin.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        creator_id: AccountId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            creator_id,
            participants: vec![creator_id],
            admins: vec![creator_id],
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Check if the account is a member.
    pub fn is_participant(&self, account: AccountId) -> bool {
        self.participants.contains(&account)
    }

    /// Check if the account holds admin rights.
    pub fn is_admin(&self, account: AccountId) -> bool {
        self.admins.contains(&account)
    }

    /// Latest message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Add a member; already-member is a no-op.
    pub(crate) fn add_participant(&mut self, account: AccountId) {
        if !self.participants.contains(&account) {
            self.participants.push(account);
        }
    }

    /// Remove a member along with any admin role they hold. Callers have
    /// already rejected creator removal.
    pub(crate) fn remove_participant(&mut self, account: AccountId) {
        self.participants.retain(|id| *id != account);
        self.admins.retain(|id| *id != account);
    }

    /// Grant admin rights, adding the account as a participant first if it
    /// was not one.
    pub(crate) fn add_admin(&mut self, account: AccountId) {
        self.add_participant(account);
        if !self.admins.contains(&account) {
            self.admins.push(account);
        }
    }

    /// Revoke admin rights; participant status is untouched.
    pub(crate) fn remove_admin(&mut self, account: AccountId) {
        self.admins.retain(|id| *id != account);
    }

    /// Fallback name used when a rename comes in blank: the raw participant
    /// ids joined in membership order.
    pub(crate) fn fallback_name(&self) -> String {
        let joined = self
            .participants
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Discussion with: {joined}")
    }

    /// The creator is an admin and every admin is a participant.
    pub fn membership_is_consistent(&self) -> bool {
        self.admins.contains(&self.creator_id)
            && self.admins.iter().all(|id| self.participants.contains(id))
    }
}
