//! Centralized authorization for discussion operations.
//!
//! Every mutating operation maps to one [`Action`], and [`authorize`] is the
//! single predicate deciding whether an actor may perform it. Creator
//! protection is a separate guard ([`guard_creator`]) because it depends on
//! the operation's targets, not on the actor.

use crate::domain::{AccountId, Discussion};
use crate::error::ServiceError;

/// Operation kinds that require an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Rename,
    EditDescription,
    AddParticipants,
    RemoveParticipants,
    AddAdmins,
    RemoveAdmins,
    Delete,
    SendMessage,
}

impl Action {
    /// Sending is open to every participant; everything else needs admin
    /// rights.
    fn requires_admin(self) -> bool {
        !matches!(self, Action::SendMessage)
    }

    fn verb(self) -> &'static str {
        match self {
            Action::Rename => "rename",
            Action::EditDescription => "edit the description of",
            Action::AddParticipants => "add participants to",
            Action::RemoveParticipants => "remove participants from",
            Action::AddAdmins => "grant admin rights in",
            Action::RemoveAdmins => "revoke admin rights in",
            Action::Delete => "delete",
            Action::SendMessage => "send messages to",
        }
    }
}

/// Check that `actor` may perform `action` on `discussion`.
pub fn authorize(
    discussion: &Discussion,
    actor: AccountId,
    action: Action,
) -> Result<(), ServiceError> {
    let allowed = if action.requires_admin() {
        discussion.is_admin(actor)
    } else {
        discussion.is_participant(actor)
    };
    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            "[Engine] denied {action:?} on discussion {} for account {actor}",
            discussion.id
        );
        Err(ServiceError::permission_denied(format!(
            "account {actor} may not {} discussion {}",
            action.verb(),
            discussion.id
        )))
    }
}

/// Reject any target batch that would strip the creator of membership or
/// admin rights.
pub fn guard_creator(discussion: &Discussion, targets: &[AccountId]) -> Result<(), ServiceError> {
    if targets.contains(&discussion.creator_id) {
        return Err(ServiceError::permission_denied(format!(
            "creator {} cannot be removed from discussion {}",
            discussion.creator_id, discussion.id
        )));
    }
    Ok(())
}
