//! Comment thread use-case service.

use crate::model::comment::{Comment, CommentId};
use crate::model::introduction::IntroductionId;
use crate::repo::comment_store::CommentStore;
use crate::repo::{EntityRef, RepoError, RepoResult};
use log::info;

/// Use-case facade over a `CommentStore`.
pub struct CommentService<S: CommentStore> {
    store: S,
}

impl<S: CommentStore> CommentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Attaches a comment to one introduction version.
    pub fn add_comment(&self, introduction_id: IntroductionId, text: &str) -> RepoResult<Comment> {
        let created = self.store.create_comment(introduction_id, text)?;
        info!(
            "event=comment_create module=service status=ok introduction_id={introduction_id} comment_id={}",
            created.id
        );
        Ok(created)
    }

    pub fn get_comment(&self, id: CommentId) -> RepoResult<Comment> {
        self.store
            .get_comment(id)?
            .ok_or(RepoError::NotFound(EntityRef::Comment(id)))
    }

    /// Replaces comment text and refreshes `updated_at`.
    pub fn update_comment(&self, id: CommentId, text: &str) -> RepoResult<Comment> {
        let updated = self.store.update_comment(id, text)?;
        info!("event=comment_update module=service status=ok comment_id={id}");
        Ok(updated)
    }

    pub fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        self.store.delete_comment(id)?;
        info!("event=comment_delete module=service status=ok comment_id={id}");
        Ok(())
    }

    /// Lists comments of one introduction, newest first.
    pub fn list_for_introduction(&self, introduction_id: IntroductionId) -> RepoResult<Vec<Comment>> {
        self.store.list_for_introduction(introduction_id)
    }
}
