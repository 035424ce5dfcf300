//! Engine error types.
//!
//! Every mutating call either returns the new aggregate state or one of
//! these kinds; there is no partial-success shape. Authorization and
//! not-found failures commit nothing.
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the discussion engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No account with this id exists in the directory
    #[error("account not found: {id}")]
    AccountNotFound {
        /// The missing account id
        id: Uuid,
    },

    /// No discussion with this id exists (or it has been deleted)
    #[error("discussion not found: {id}")]
    DiscussionNotFound {
        /// The missing discussion id
        id: Uuid,
    },

    /// The actor lacks the role this operation requires, or the operation
    /// would strip the creator of theirs
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Human-readable error message
        message: String,
    },

    /// The gateway kept rejecting the write, or failed outright
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Human-readable error message
        message: String,
    },
}

impl ServiceError {
    /// Create a new account-not-found error.
    pub fn account_not_found(id: Uuid) -> Self {
        Self::AccountNotFound { id }
    }

    /// Create a new discussion-not-found error.
    pub fn discussion_not_found(id: Uuid) -> Self {
        Self::DiscussionNotFound { id }
    }

    /// Create a new permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
