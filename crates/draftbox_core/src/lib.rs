//! Core domain logic for Draftbox: repositories of versioned introduction
//! drafts with threaded comments.
//! This crate is the single source of truth for version-chain and cascade
//! invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::{Comment, CommentId, COMMENT_MAX_CHARS};
pub use model::introduction::{
    Access, DraftSeed, Introduction, IntroductionId, IntroductionPatch, NewIntroduction,
    FIRST_VERSION,
};
pub use model::repository::{
    parse_deadline, NewRepository, Repository, RepositoryId, RepositoryPatch,
};
pub use model::validation::ValidationError;
pub use repo::comment_store::{CommentStore, SqliteCommentStore};
pub use repo::introduction_store::{IntroductionStore, SqliteIntroductionStore};
pub use repo::repository_store::{RepositoryStore, SqliteRepositoryStore};
pub use repo::{DeleteReport, EntityRef, RepoError, RepoResult};
pub use service::comment_service::CommentService;
pub use service::draft_service::DraftService;
pub use service::repository_service::RepositoryService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
