//! Store layer: SQLite persistence for repositories, drafts and comments.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Keep SQL details, ordering and cascade fan-out inside this boundary.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Every mutating call runs in one `IMMEDIATE` transaction; a failure
//!   leaves prior state unchanged.
//! - Stores refuse connections whose schema is not fully migrated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::comment::CommentId;
use crate::model::introduction::IntroductionId;
use crate::model::repository::RepositoryId;
use crate::model::validation::ValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod comment_store;
pub mod introduction_store;
pub mod repository_store;

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies which entity a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Repository(RepositoryId),
    Introduction(IntroductionId),
    Comment(CommentId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repository(id) => write!(f, "repository {id}"),
            Self::Introduction(id) => write!(f, "introduction {id}"),
            Self::Comment(id) => write!(f, "comment {id}"),
        }
    }
}

/// Error returned by every store and service operation.
#[derive(Debug)]
pub enum RepoError {
    /// Caller input failed field validation. Nothing was written.
    Validation(ValidationError),
    /// Storage failure (connectivity, transaction abort, ...).
    Db(DbError),
    /// Referenced entity does not exist.
    NotFound(EntityRef),
    /// `(repository, version)` is already taken by another draft.
    Conflict {
        repository_id: RepositoryId,
        version: i64,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted into a valid model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::Conflict {
                repository_id,
                version,
            } => write!(
                f,
                "repository {repository_id} already has a draft with version {version}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "store requires table `{table}`"),
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Counts of descendants removed together with a deleted parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub introductions: usize,
    pub comments: usize,
}

pub(crate) fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Verifies schema version plus the presence of `table` and its `columns`.
pub(crate) fn ensure_table_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
