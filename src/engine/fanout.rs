//! Message append and preview fan-out.
//!
//! One committed transaction covers both effects of a send: the message
//! lands on the aggregate's log and every current participant's preview
//! reflects it. The batch is recomputed from freshly read state on every
//! conflict retry, so concurrent senders never lose unread increments.

use uuid::Uuid;

use crate::domain::{Account, AccountId, Discussion, DiscussionId, Message};
use crate::error::ServiceError;
use crate::store::{DiscussionWrite, DocumentGateway, WriteBatch};

use super::permissions::{self, Action};
use super::DiscussionService;

impl<G: DocumentGateway> DiscussionService<G> {
    /// Append a message and update every member's preview. Participant only.
    ///
    /// The sender's preview resets to zero unread; every other participant's
    /// counter goes up by one on top of whatever the freshly read state
    /// holds.
    pub async fn send_message(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        content: &str,
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::SendMessage)?;

            let message = Message::new(actor, content);
            let mut updated = current.doc.clone();
            updated.messages.push(message.clone());

            let mut batch = WriteBatch::for_discussion(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });
            for member in &updated.participants {
                let account = self.gateway().account(*member).await?;
                let mut doc = account.doc.clone();
                let preview = doc.previews.entry(discussion_id).or_default();
                preview.record_message(&message);
                if *member == actor {
                    preview.unread_count = 0;
                } else {
                    preview.unread_count += 1;
                }
                batch.push_account(account.version, doc);
            }

            if self.try_commit("send_message", attempt, batch).await? {
                tracing::debug!(
                    "[Fanout] message {} from {actor} fanned out to {} previews in discussion {discussion_id}",
                    message.id,
                    updated.participants.len()
                );
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("send_message", discussion_id))
    }

    /// Reset the unread counter on one account's preview of one discussion.
    ///
    /// Idempotent: with no new messages a repeat call is a no-op with the
    /// same result. `up_to` names the latest message the caller has seen and
    /// is accepted for interface compatibility; the counter is reset
    /// unconditionally.
    pub async fn read_messages(
        &self,
        account_id: AccountId,
        discussion_id: DiscussionId,
        up_to: Option<Uuid>,
    ) -> Result<Account, ServiceError> {
        self.gateway().discussion(discussion_id).await?;
        tracing::debug!(
            "[Fanout] read marker for account {account_id} on discussion {discussion_id} (up to {up_to:?})"
        );

        for attempt in self.attempts() {
            let account = self.gateway().account(account_id).await?;
            let mut doc = account.doc.clone();
            match doc.previews.get_mut(&discussion_id) {
                Some(preview) if preview.unread_count != 0 => preview.unread_count = 0,
                _ => return Ok(doc),
            }

            let mut batch = WriteBatch::default();
            batch.push_account(account.version, doc.clone());
            if self.try_commit("read_messages", attempt, batch).await? {
                return Ok(doc);
            }
        }
        Err(self.retries_exhausted("read_messages", discussion_id))
    }
}
