//! In-memory gateway adapter.
//!
//! Backs the engine in tests and single-process deployments. Documents are
//! versioned and `commit` checks every expected version under one write
//! lock, so concurrent read-modify-write loops behave exactly as they would
//! against a conflict-detecting remote store. Each document id has its own
//! `watch` channel; watchers of one id never observe writes to another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::domain::{Account, AccountId, Discussion, DiscussionId};

use super::{
    AccountWrite, DiscussionState, DiscussionWrite, DocumentGateway, StoreError, Versioned,
    WriteBatch, ACCOUNTS, DISCUSSIONS,
};

#[derive(Default)]
struct Shelves {
    discussions: HashMap<DiscussionId, Versioned<Discussion>>,
    accounts: HashMap<AccountId, Versioned<Account>>,
    discussion_feeds: HashMap<DiscussionId, watch::Sender<DiscussionState>>,
    account_feeds: HashMap<AccountId, watch::Sender<Account>>,
}

impl Shelves {
    /// Verify every guarded write in the batch against current versions.
    fn check(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        match &batch.discussion {
            Some(DiscussionWrite::Create(doc)) => {
                if self.discussions.contains_key(&doc.id) {
                    return Err(StoreError::AlreadyExists {
                        collection: DISCUSSIONS,
                        id: doc.id,
                    });
                }
            }
            Some(DiscussionWrite::Put { expect, doc }) => {
                self.check_discussion_version(doc.id, *expect)?;
            }
            Some(DiscussionWrite::Delete { expect, id }) => {
                self.check_discussion_version(*id, *expect)?;
            }
            None => {}
        }

        for write in &batch.accounts {
            let current = self
                .accounts
                .get(&write.doc.id)
                .ok_or(StoreError::NotFound {
                    collection: ACCOUNTS,
                    id: write.doc.id,
                })?;
            if current.version != write.expect {
                return Err(StoreError::Conflict {
                    collection: ACCOUNTS,
                    id: write.doc.id,
                });
            }
        }

        Ok(())
    }

    fn check_discussion_version(&self, id: DiscussionId, expect: u64) -> Result<(), StoreError> {
        let current = self.discussions.get(&id).ok_or(StoreError::NotFound {
            collection: DISCUSSIONS,
            id,
        })?;
        if current.version != expect {
            return Err(StoreError::Conflict {
                collection: DISCUSSIONS,
                id,
            });
        }
        Ok(())
    }

    /// Apply an already-checked batch and notify watchers.
    fn apply(&mut self, batch: WriteBatch) {
        match batch.discussion {
            Some(DiscussionWrite::Create(doc)) => {
                let id = doc.id;
                self.discussions.insert(
                    id,
                    Versioned {
                        doc: doc.clone(),
                        version: 1,
                    },
                );
                let (tx, _rx) = watch::channel(DiscussionState::Live(doc));
                self.discussion_feeds.insert(id, tx);
            }
            Some(DiscussionWrite::Put { doc, .. }) => {
                let id = doc.id;
                if let Some(entry) = self.discussions.get_mut(&id) {
                    entry.version += 1;
                    entry.doc = doc.clone();
                }
                if let Some(tx) = self.discussion_feeds.get(&id) {
                    tx.send_replace(DiscussionState::Live(doc));
                }
            }
            Some(DiscussionWrite::Delete { id, .. }) => {
                self.discussions.remove(&id);
                if let Some(tx) = self.discussion_feeds.remove(&id) {
                    tx.send_replace(DiscussionState::Deleted);
                }
            }
            None => {}
        }

        for AccountWrite { doc, .. } in batch.accounts {
            let id = doc.id;
            if let Some(entry) = self.accounts.get_mut(&id) {
                entry.version += 1;
                entry.doc = doc.clone();
            }
            if let Some(tx) = self.account_feeds.get(&id) {
                tx.send_replace(doc);
            }
        }
    }
}

/// In-memory [`DocumentGateway`] implementation.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    shelves: Arc<RwLock<Shelves>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active watchers on a discussion feed, for tests and diagnostics.
    pub async fn discussion_watcher_count(&self, id: DiscussionId) -> usize {
        self.shelves
            .read()
            .await
            .discussion_feeds
            .get(&id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl DocumentGateway for MemoryGateway {
    async fn discussion(&self, id: DiscussionId) -> Result<Versioned<Discussion>, StoreError> {
        self.shelves
            .read()
            .await
            .discussions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                collection: DISCUSSIONS,
                id,
            })
    }

    async fn account(&self, id: AccountId) -> Result<Versioned<Account>, StoreError> {
        self.shelves
            .read()
            .await
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                collection: ACCOUNTS,
                id,
            })
    }

    async fn upsert_account(&self, doc: Account) -> Result<(), StoreError> {
        let mut shelves = self.shelves.write().await;
        let id = doc.id;
        let version = match shelves.accounts.get(&id) {
            Some(entry) => entry.version + 1,
            None => 1,
        };
        shelves.accounts.insert(
            id,
            Versioned {
                doc: doc.clone(),
                version,
            },
        );
        shelves
            .account_feeds
            .entry(id)
            .or_insert_with(|| watch::channel(doc.clone()).0)
            .send_replace(doc);
        tracing::debug!("[Store] upserted {ACCOUNTS}/{id} at version {version}");
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut shelves = self.shelves.write().await;
        if let Err(err) = shelves.check(&batch) {
            tracing::debug!("[Store] commit rejected: {err}");
            return Err(err);
        }
        shelves.apply(batch);
        Ok(())
    }

    async fn watch_discussion(
        &self,
        id: DiscussionId,
    ) -> Result<watch::Receiver<DiscussionState>, StoreError> {
        self.shelves
            .read()
            .await
            .discussion_feeds
            .get(&id)
            .map(|tx| tx.subscribe())
            .ok_or(StoreError::NotFound {
                collection: DISCUSSIONS,
                id,
            })
    }

    async fn watch_account(&self, id: AccountId) -> Result<watch::Receiver<Account>, StoreError> {
        self.shelves
            .read()
            .await
            .account_feeds
            .get(&id)
            .map(|tx| tx.subscribe())
            .ok_or(StoreError::NotFound {
                collection: ACCOUNTS,
                id,
            })
    }
}
