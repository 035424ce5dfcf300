//! Snapshot feeds over gateway watch channels.
//!
//! Both feeds are hot with a buffered last value: a newly attached consumer
//! immediately receives the current state, then one emission per committed
//! change. Rapid writes may coalesce; every emission reflects a state at
//! least as new as the previous one.

use std::collections::HashMap;
use std::pin::Pin;

use futures_util::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use crate::domain::{AccountId, Discussion, DiscussionId, DiscussionPreview};
use crate::engine::DiscussionService;
use crate::error::ServiceError;
use crate::store::{DiscussionState, DocumentGateway};

/// Live feed of full discussion snapshots.
pub type DiscussionFeed = Pin<Box<dyn Stream<Item = Discussion> + Send>>;

/// Live feed of one account's full preview map.
pub type PreviewsFeed =
    Pin<Box<dyn Stream<Item = HashMap<DiscussionId, DiscussionPreview>> + Send>>;

impl<G: DocumentGateway> DiscussionService<G> {
    /// Watch a discussion: current snapshot first, then one per committed
    /// mutation.
    ///
    /// The stream ends when the discussion is deleted or the gateway goes
    /// away; dropping it detaches this consumer only.
    pub async fn watch_discussion(
        &self,
        id: DiscussionId,
    ) -> Result<DiscussionFeed, ServiceError> {
        let rx = self.gateway().watch_discussion(id).await?;
        tracing::debug!("[Watch] consumer attached to discussion {id}");

        Ok(Box::pin(stream::unfold(
            (rx, true),
            |(mut rx, first)| async move {
                if !first && rx.changed().await.is_err() {
                    return None;
                }
                let state = rx.borrow_and_update().clone();
                match state {
                    DiscussionState::Live(doc) => Some((doc, (rx, false))),
                    DiscussionState::Deleted => None,
                }
            },
        )))
    }

    /// Watch one account's preview map, re-emitted in full whenever any
    /// entry changes.
    pub async fn watch_my_previews(
        &self,
        account_id: AccountId,
    ) -> Result<PreviewsFeed, ServiceError> {
        let rx = self.gateway().watch_account(account_id).await?;
        tracing::debug!("[Watch] consumer attached to previews of account {account_id}");

        Ok(Box::pin(
            WatchStream::new(rx).map(|account| account.previews),
        ))
    }
}
