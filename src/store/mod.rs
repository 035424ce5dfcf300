//! Persistence gateway contract.
//!
//! The engine never touches storage directly: every read, write, and live
//! feed goes through a [`DocumentGateway`]. The gateway owns durability,
//! conflict detection, and change notification; the engine owns recomputing
//! aggregate state from fresh reads. Persisted document shapes and
//! collection layout are an adapter detail, not part of this contract.

pub mod memory;

use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::{Account, AccountId, Discussion, DiscussionId};
use crate::error::ServiceError;

pub use memory::MemoryGateway;

/// Collection name used in store errors and logs for discussions.
pub const DISCUSSIONS: &str = "discussions";

/// Collection name used in store errors and logs for accounts.
pub const ACCOUNTS: &str = "accounts";

/// A document plus the version its read observed.
///
/// The version feeds back into [`WriteBatch`] writes; a commit against a
/// stale version fails with [`StoreError::Conflict`].
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub doc: T,
    pub version: u64,
}

/// Value carried by a discussion watch feed.
#[derive(Debug, Clone)]
pub enum DiscussionState {
    /// Snapshot after the latest committed mutation
    Live(Discussion),
    /// Terminal: the discussion was deleted
    Deleted,
}

/// One discussion write in a commit batch.
#[derive(Debug, Clone)]
pub enum DiscussionWrite {
    /// Insert a brand-new discussion; fails if the id is taken
    Create(Discussion),
    /// Replace an existing discussion read at version `expect`
    Put { expect: u64, doc: Discussion },
    /// Remove an existing discussion read at version `expect`
    Delete { expect: u64, id: DiscussionId },
}

/// Account replacement guarded by the version the caller read.
#[derive(Debug, Clone)]
pub struct AccountWrite {
    pub expect: u64,
    pub doc: Account,
}

/// A multi-document write applied atomically.
///
/// Either every write lands and every watcher sees the new state, or the
/// batch fails as a whole; stale `expect` versions fail it with
/// [`StoreError::Conflict`] so the caller can re-read and recompute.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub discussion: Option<DiscussionWrite>,
    pub accounts: Vec<AccountWrite>,
}

impl WriteBatch {
    /// Batch containing a single discussion write.
    pub fn for_discussion(write: DiscussionWrite) -> Self {
        Self {
            discussion: Some(write),
            accounts: Vec::new(),
        }
    }

    /// Add a guarded account replacement.
    pub fn push_account(&mut self, expect: u64, doc: Account) {
        self.accounts.push(AccountWrite { expect, doc });
    }
}

/// Gateway failures.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The document does not exist
    #[error("document not found: {collection}/{id}")]
    NotFound {
        collection: &'static str,
        id: Uuid,
    },

    /// A concurrent writer committed between the caller's read and this
    /// commit
    #[error("write conflict on {collection}/{id}")]
    Conflict {
        collection: &'static str,
        id: Uuid,
    },

    /// A create hit an id that is already taken
    #[error("document already exists: {collection}/{id}")]
    AlreadyExists {
        collection: &'static str,
        id: Uuid,
    },

    /// Transient gateway failure
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } if collection == ACCOUNTS => {
                ServiceError::account_not_found(id)
            }
            StoreError::NotFound { id, .. } => ServiceError::discussion_not_found(id),
            StoreError::Conflict { collection, id } => {
                ServiceError::unavailable(format!("unresolved write conflict on {collection}/{id}"))
            }
            StoreError::AlreadyExists { collection, id } => {
                ServiceError::unavailable(format!("duplicate document {collection}/{id}"))
            }
            StoreError::Unavailable { message } => ServiceError::Unavailable { message },
        }
    }
}

/// Abstract document store consumed by the engine.
///
/// Point reads fail with [`StoreError::NotFound`], `commit` applies a
/// [`WriteBatch`] atomically with conflict detection, and the watch methods
/// hand out buffered-last-value feeds. Every method may suspend; nothing
/// here assumes synchronous completion.
#[allow(async_fn_in_trait)]
pub trait DocumentGateway: Send + Sync {
    /// Point read of a discussion.
    async fn discussion(&self, id: DiscussionId) -> Result<Versioned<Discussion>, StoreError>;

    /// Point read of an account.
    async fn account(&self, id: AccountId) -> Result<Versioned<Account>, StoreError>;

    /// Insert or replace an account record unconditionally.
    ///
    /// The account directory registers and edits accounts outside this
    /// crate; this is its write path into the gateway.
    async fn upsert_account(&self, doc: Account) -> Result<(), StoreError>;

    /// Apply a batch atomically, rejecting stale versions with
    /// [`StoreError::Conflict`].
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Buffered-last-value feed of a discussion's state.
    async fn watch_discussion(
        &self,
        id: DiscussionId,
    ) -> Result<watch::Receiver<DiscussionState>, StoreError>;

    /// Buffered-last-value feed of an account record.
    async fn watch_account(&self, id: AccountId) -> Result<watch::Receiver<Account>, StoreError>;
}
