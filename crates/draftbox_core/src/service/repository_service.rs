//! Repository use-case service.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list entry points for repositories.
//! - Turn absent rows into `RepoError::NotFound` for single-record reads.
//! - Emit metadata-only lifecycle log events.

use crate::model::repository::{NewRepository, Repository, RepositoryId, RepositoryPatch};
use crate::repo::repository_store::RepositoryStore;
use crate::repo::{DeleteReport, EntityRef, RepoError, RepoResult};
use log::{info, warn};

/// Use-case facade over a `RepositoryStore`.
pub struct RepositoryService<S: RepositoryStore> {
    store: S,
}

impl<S: RepositoryStore> RepositoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates one repository. Timestamps are assigned by the store.
    pub fn create_repository(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        deadline: i64,
    ) -> RepoResult<Repository> {
        let request = NewRepository::new(name, description, deadline);
        match self.store.create_repository(&request) {
            Ok(repository) => {
                info!(
                    "event=repository_create module=service status=ok repository_id={} deadline={}",
                    repository.id, repository.deadline
                );
                Ok(repository)
            }
            Err(err) => {
                warn!("event=repository_create module=service status=error error={err}");
                Err(err)
            }
        }
    }

    pub fn get_repository(&self, id: RepositoryId) -> RepoResult<Repository> {
        self.store
            .get_repository(id)?
            .ok_or(RepoError::NotFound(EntityRef::Repository(id)))
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn update_repository(
        &self,
        id: RepositoryId,
        patch: &RepositoryPatch,
    ) -> RepoResult<Repository> {
        let updated = self.store.update_repository(id, patch)?;
        info!("event=repository_update module=service status=ok repository_id={id}");
        Ok(updated)
    }

    /// Deletes one repository together with every owned draft and comment.
    pub fn delete_repository(&self, id: RepositoryId) -> RepoResult<DeleteReport> {
        match self.store.delete_repository(id) {
            Ok(report) => {
                info!(
                    "event=repository_delete module=service status=ok repository_id={id} introductions={} comments={}",
                    report.introductions, report.comments
                );
                Ok(report)
            }
            Err(err) => {
                warn!(
                    "event=repository_delete module=service status=error repository_id={id} error={err}"
                );
                Err(err)
            }
        }
    }

    /// Lists repositories, soonest deadline first.
    pub fn list_repositories(&self) -> RepoResult<Vec<Repository>> {
        self.store.list_repositories()
    }
}
