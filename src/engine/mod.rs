//! The discussion service.
//!
//! [`DiscussionService`] is the single mutation surface: it validates actor
//! authority, recomputes aggregate state from a fresh gateway read, and
//! commits through the gateway's conflict-detecting batch write. A commit
//! that loses a race is recomputed from re-read state, never replayed as a
//! blind delta, so retries are safe under concurrent writers.

mod fanout;
mod membership;
pub mod permissions;

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::{Discussion, DiscussionId};
use crate::error::ServiceError;
use crate::store::{DocumentGateway, StoreError, WriteBatch};

/// Permission-checked operations over a [`DocumentGateway`].
pub struct DiscussionService<G> {
    gateway: Arc<G>,
    config: EngineConfig,
}

impl<G> Clone for DiscussionService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: self.config.clone(),
        }
    }
}

impl<G: DocumentGateway> DiscussionService<G> {
    /// Create a service with the default configuration.
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_config(gateway, EngineConfig::default())
    }

    /// Create a service with an explicit configuration.
    pub fn with_config(gateway: Arc<G>, config: EngineConfig) -> Self {
        Self { gateway, config }
    }

    /// The gateway this service mutates through.
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Fetch a discussion by id.
    pub async fn get_discussion(&self, id: DiscussionId) -> Result<Discussion, ServiceError> {
        let read = self.gateway.discussion(id).await?;
        Ok(read.doc)
    }

    /// Commit attempt numbers run from 1 to this bound, inclusive.
    pub(crate) fn attempts(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.config.max_commit_retries
    }

    /// Try to land a batch. `Ok(true)` means committed, `Ok(false)` means a
    /// concurrent writer won and the caller should recompute from fresh
    /// state.
    pub(crate) async fn try_commit(
        &self,
        op: &'static str,
        attempt: u32,
        batch: WriteBatch,
    ) -> Result<bool, ServiceError> {
        match self.gateway.commit(batch).await {
            Ok(()) => Ok(true),
            Err(StoreError::Conflict { collection, id }) => {
                tracing::debug!(
                    "[Engine] {op}: write conflict on {collection}/{id} (attempt {attempt}), recomputing"
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Error for a mutation whose every commit attempt conflicted.
    pub(crate) fn retries_exhausted(
        &self,
        op: &'static str,
        id: DiscussionId,
    ) -> ServiceError {
        tracing::warn!(
            "[Engine] {op}: giving up on discussion {id} after {} attempts",
            self.config.max_commit_retries
        );
        ServiceError::unavailable(format!(
            "{op} on discussion {id} kept conflicting after {} attempts",
            self.config.max_commit_retries
        ))
    }
}
