//! Introduction versioning use-case service.
//!
//! # Responsibility
//! - Expose the two-step draft flow: `prepare_next_draft` pre-populates a
//!   form, `create_draft` persists what the caller submits.
//! - Expose `create_next_draft`, the single-call form where the store derives
//!   the version inside the insert transaction.
//!
//! # Invariants
//! - `create_draft` never re-derives `version`; it persists the given value.
//! - `update_draft` never re-runs carry-forward.
//! - Sibling drafts are never renumbered.

use crate::model::introduction::{
    Access, DraftSeed, Introduction, IntroductionId, IntroductionPatch, NewIntroduction,
};
use crate::model::repository::RepositoryId;
use crate::repo::introduction_store::IntroductionStore;
use crate::repo::{EntityRef, RepoError, RepoResult};
use log::{info, warn};

/// Use-case facade over an `IntroductionStore`.
pub struct DraftService<S: IntroductionStore> {
    store: S,
}

impl<S: IntroductionStore> DraftService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Computes version/contents/access defaults for the next draft.
    ///
    /// Read-only. The returned seed embeds the resolved repository.
    pub fn prepare_next_draft(&self, repository_id: RepositoryId) -> RepoResult<DraftSeed> {
        self.store.prepare_next_draft(repository_id)
    }

    /// Persists one draft exactly as submitted.
    ///
    /// # Errors
    /// - `NotFound` when the repository does not exist.
    /// - `Validation` for blank contents or a version below 1.
    /// - `Conflict` when the version is already taken in this repository; the
    ///   caller should prepare a fresh seed and submit again.
    pub fn create_draft(&self, draft: &NewIntroduction) -> RepoResult<Introduction> {
        match self.store.create_introduction(draft) {
            Ok(created) => {
                info!(
                    "event=draft_create module=service status=ok repository_id={} introduction_id={} version={}",
                    created.repository_id, created.id, created.version
                );
                Ok(created)
            }
            Err(err) => {
                warn!(
                    "event=draft_create module=service status=error repository_id={} version={} error={err}",
                    draft.repository_id, draft.version
                );
                Err(err)
            }
        }
    }

    /// Creates the next draft with a store-derived version.
    ///
    /// Retries once on `Conflict`, which can only come from a writer outside
    /// this connection's transaction discipline.
    pub fn create_next_draft(
        &self,
        repository_id: RepositoryId,
        contents: &str,
        access: Access,
    ) -> RepoResult<Introduction> {
        let created = match self
            .store
            .create_next_introduction(repository_id, contents, access)
        {
            Err(RepoError::Conflict { version, .. }) => {
                warn!(
                    "event=draft_create_next module=service status=retry repository_id={repository_id} version={version}"
                );
                self.store
                    .create_next_introduction(repository_id, contents, access)?
            }
            other => other?,
        };

        info!(
            "event=draft_create_next module=service status=ok repository_id={} introduction_id={} version={}",
            created.repository_id, created.id, created.version
        );
        Ok(created)
    }

    pub fn get_draft(&self, id: IntroductionId) -> RepoResult<Introduction> {
        self.store
            .get_introduction(id)?
            .ok_or(RepoError::NotFound(EntityRef::Introduction(id)))
    }

    /// Edits one draft in place.
    pub fn update_draft(
        &self,
        id: IntroductionId,
        patch: &IntroductionPatch,
    ) -> RepoResult<Introduction> {
        let updated = self.store.update_introduction(id, patch)?;
        info!(
            "event=draft_update module=service status=ok introduction_id={id} repository_id={} version={}",
            updated.repository_id, updated.version
        );
        Ok(updated)
    }

    /// Deletes one draft and its comments. Returns the removed comment count.
    pub fn delete_draft(&self, id: IntroductionId) -> RepoResult<usize> {
        let comments = self.store.delete_introduction(id)?;
        info!(
            "event=draft_delete module=service status=ok introduction_id={id} comments={comments}"
        );
        Ok(comments)
    }

    /// Lists drafts of one repository, highest version first.
    pub fn list_for_repository(&self, repository_id: RepositoryId) -> RepoResult<Vec<Introduction>> {
        self.store.list_for_repository(repository_id)
    }
}
