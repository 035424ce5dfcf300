//! Membership, role, and metadata operations.
//!
//! Not-found checks run before permission checks, permission checks run
//! before any write, and bulk variants either apply to the whole batch or
//! leave the discussion untouched.

use crate::domain::{Account, AccountId, Discussion, DiscussionId, DiscussionPreview};
use crate::error::ServiceError;
use crate::store::{DiscussionWrite, DocumentGateway, StoreError, Versioned, WriteBatch};

use super::permissions::{self, Action};
use super::DiscussionService;

impl<G: DocumentGateway> DiscussionService<G> {
    /// Create a discussion owned by `creator_id`.
    ///
    /// A blank name defaults to `"<creator display name>'s discussion"`. The
    /// creator becomes sole participant and admin and receives an empty
    /// preview entry in the same commit. Anyone may create.
    pub async fn create_discussion(
        &self,
        name: &str,
        description: &str,
        creator_id: AccountId,
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let creator = self.gateway().account(creator_id).await?;
            let name = if name.trim().is_empty() {
                format!("{}'s discussion", creator.doc.display_name)
            } else {
                name.trim().to_string()
            };
            let discussion = Discussion::new(name, description, creator_id);

            let mut creator_doc = creator.doc.clone();
            creator_doc
                .previews
                .insert(discussion.id, DiscussionPreview::empty());
            let mut batch = WriteBatch::for_discussion(DiscussionWrite::Create(discussion.clone()));
            batch.push_account(creator.version, creator_doc);

            if self.try_commit("create_discussion", attempt, batch).await? {
                tracing::info!(
                    "[Engine] account {creator_id} created discussion {} ({:?})",
                    discussion.id,
                    discussion.name
                );
                return Ok(discussion);
            }
        }
        Err(ServiceError::unavailable(format!(
            "create_discussion for account {creator_id} kept conflicting"
        )))
    }

    /// Rename a discussion. Admin only.
    ///
    /// A blank name does not error; it falls back to the raw participant ids
    /// joined in membership order.
    pub async fn set_name(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        new_name: &str,
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::Rename)?;

            let mut updated = current.doc.clone();
            updated.name = if new_name.trim().is_empty() {
                updated.fallback_name()
            } else {
                new_name.trim().to_string()
            };

            let batch = WriteBatch::for_discussion(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });
            if self.try_commit("set_name", attempt, batch).await? {
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("set_name", discussion_id))
    }

    /// Replace a discussion's description. Admin only.
    pub async fn set_description(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        new_description: &str,
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::EditDescription)?;

            let mut updated = current.doc.clone();
            updated.description = new_description.to_string();

            let batch = WriteBatch::for_discussion(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });
            if self.try_commit("set_description", attempt, batch).await? {
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("set_description", discussion_id))
    }

    /// Add a single participant. Admin only.
    pub async fn add_participant(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Discussion, ServiceError> {
        self.add_participants(discussion_id, actor, &[target]).await
    }

    /// Add a batch of participants. Admin only; all-or-nothing.
    ///
    /// Already-members are skipped, not errors, and nobody gains admin
    /// rights here. A member joining a discussion that already has messages
    /// gets a preview primed from the latest one, with every logged message
    /// counting as unread.
    pub async fn add_participants(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        targets: &[AccountId],
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            let accounts = self.read_accounts(targets).await?;
            permissions::authorize(&current.doc, actor, Action::AddParticipants)?;

            let mut updated = current.doc.clone();
            let mut batch = WriteBatch::default();
            for account in accounts {
                if updated.is_participant(account.doc.id) {
                    continue;
                }
                updated.add_participant(account.doc.id);
                self.prime_preview(&mut batch, &updated, account);
            }
            batch.discussion = Some(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });

            if self.try_commit("add_participants", attempt, batch).await? {
                tracing::debug!(
                    "[Engine] discussion {discussion_id} now has {} participants",
                    updated.participants.len()
                );
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("add_participants", discussion_id))
    }

    /// Remove a single participant. Admin only; removing the creator always
    /// fails.
    pub async fn remove_participant(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Discussion, ServiceError> {
        self.remove_participants(discussion_id, actor, &[target])
            .await
    }

    /// Remove a batch of participants. Admin only; all-or-nothing.
    ///
    /// A batch containing the creator is rejected outright. Removal also
    /// revokes any admin role the member held and drops their preview entry
    /// for this discussion; removing a non-member is a no-op.
    pub async fn remove_participants(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        targets: &[AccountId],
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::RemoveParticipants)?;
            permissions::guard_creator(&current.doc, targets)?;

            let mut updated = current.doc.clone();
            let mut batch = WriteBatch::default();
            for target in targets {
                if !updated.is_participant(*target) {
                    continue;
                }
                updated.remove_participant(*target);
                self.drop_preview(&mut batch, discussion_id, *target).await?;
            }
            batch.discussion = Some(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });

            if self
                .try_commit("remove_participants", attempt, batch)
                .await?
            {
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("remove_participants", discussion_id))
    }

    /// Grant admin rights to a single account. Admin only.
    pub async fn add_admin(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Discussion, ServiceError> {
        self.add_admins(discussion_id, actor, &[target]).await
    }

    /// Grant admin rights to a batch of accounts. Admin only; all-or-nothing.
    ///
    /// Promoting a non-participant adds them as a participant in the same
    /// state transition.
    pub async fn add_admins(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        targets: &[AccountId],
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            let accounts = self.read_accounts(targets).await?;
            permissions::authorize(&current.doc, actor, Action::AddAdmins)?;

            let mut updated = current.doc.clone();
            let mut batch = WriteBatch::default();
            for account in accounts {
                let newly_joined = !updated.is_participant(account.doc.id);
                updated.add_admin(account.doc.id);
                if newly_joined {
                    self.prime_preview(&mut batch, &updated, account);
                }
            }
            batch.discussion = Some(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });

            if self.try_commit("add_admins", attempt, batch).await? {
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("add_admins", discussion_id))
    }

    /// Revoke admin rights from a single account. Admin only; demoting the
    /// creator always fails.
    pub async fn remove_admin(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        target: AccountId,
    ) -> Result<Discussion, ServiceError> {
        self.remove_admins(discussion_id, actor, &[target]).await
    }

    /// Revoke admin rights from a batch of accounts. Admin only;
    /// all-or-nothing. Participant status is never touched.
    pub async fn remove_admins(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
        targets: &[AccountId],
    ) -> Result<Discussion, ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::RemoveAdmins)?;
            permissions::guard_creator(&current.doc, targets)?;

            let mut updated = current.doc.clone();
            for target in targets {
                updated.remove_admin(*target);
            }

            let batch = WriteBatch::for_discussion(DiscussionWrite::Put {
                expect: current.version,
                doc: updated.clone(),
            });
            if self.try_commit("remove_admins", attempt, batch).await? {
                return Ok(updated);
            }
        }
        Err(self.retries_exhausted("remove_admins", discussion_id))
    }

    /// Delete a discussion. Admin only.
    ///
    /// Every member's preview entry for it is purged in the same commit, so
    /// no stale entry survives the aggregate. Watchers observe a terminal
    /// deletion.
    pub async fn delete_discussion(
        &self,
        discussion_id: DiscussionId,
        actor: AccountId,
    ) -> Result<(), ServiceError> {
        for attempt in self.attempts() {
            let current = self.gateway().discussion(discussion_id).await?;
            permissions::authorize(&current.doc, actor, Action::Delete)?;

            let mut batch = WriteBatch::default();
            for member in &current.doc.participants {
                self.drop_preview(&mut batch, discussion_id, *member).await?;
            }
            batch.discussion = Some(DiscussionWrite::Delete {
                expect: current.version,
                id: discussion_id,
            });

            if self.try_commit("delete_discussion", attempt, batch).await? {
                tracing::info!("[Engine] account {actor} deleted discussion {discussion_id}");
                return Ok(());
            }
        }
        Err(self.retries_exhausted("delete_discussion", discussion_id))
    }

    /// Read every target account, surfacing the first missing one.
    async fn read_accounts(
        &self,
        targets: &[AccountId],
    ) -> Result<Vec<Versioned<Account>>, ServiceError> {
        let mut accounts = Vec::with_capacity(targets.len());
        for target in targets {
            accounts.push(self.gateway().account(*target).await?);
        }
        Ok(accounts)
    }

    /// Queue a preview entry for an account that just became a member.
    ///
    /// Only written once the discussion has messages; the empty state is
    /// materialized lazily by the fan-out otherwise.
    fn prime_preview(
        &self,
        batch: &mut WriteBatch,
        discussion: &Discussion,
        account: Versioned<Account>,
    ) {
        let Some(last) = discussion.last_message() else {
            return;
        };
        let mut doc = account.doc;
        let mut preview = DiscussionPreview::empty();
        preview.record_message(last);
        preview.unread_count = discussion.messages.len() as u32;
        doc.previews.insert(discussion.id, preview);
        batch.push_account(account.version, doc);
    }

    /// Queue removal of a member's preview entry, tolerating accounts the
    /// directory no longer knows.
    async fn drop_preview(
        &self,
        batch: &mut WriteBatch,
        discussion_id: DiscussionId,
        member: AccountId,
    ) -> Result<(), ServiceError> {
        match self.gateway().account(member).await {
            Ok(account) => {
                let mut doc = account.doc;
                if doc.previews.remove(&discussion_id).is_some() {
                    batch.push_account(account.version, doc);
                }
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
