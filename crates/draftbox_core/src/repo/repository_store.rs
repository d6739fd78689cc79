//! Repository store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist repository records and assign `created_at`/`updated_at`.
//! - Own the repository delete cascade (introductions, then their comments).
//!
//! # Invariants
//! - Listing is ordered `deadline ASC, id ASC` (soonest deadline first).
//! - Delete removes comments, introductions and the repository in one
//!   `IMMEDIATE` transaction; no orphan is observable afterwards.

use crate::model::repository::{NewRepository, Repository, RepositoryId, RepositoryPatch};
use crate::repo::{
    ensure_table_ready, now_epoch_ms, DeleteReport, EntityRef, RepoError, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const REPOSITORY_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    deadline,
    created_at,
    updated_at
FROM repositories";

const REPOSITORY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "deadline",
    "created_at",
    "updated_at",
];

/// Repository interface for repository CRUD operations.
pub trait RepositoryStore {
    fn create_repository(&self, repository: &NewRepository) -> RepoResult<Repository>;
    fn get_repository(&self, id: RepositoryId) -> RepoResult<Option<Repository>>;
    fn update_repository(
        &self,
        id: RepositoryId,
        patch: &RepositoryPatch,
    ) -> RepoResult<Repository>;
    /// Deletes one repository with all owned introductions and comments.
    fn delete_repository(&self, id: RepositoryId) -> RepoResult<DeleteReport>;
    fn list_repositories(&self) -> RepoResult<Vec<Repository>>;
}

/// SQLite-backed repository store.
pub struct SqliteRepositoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositoryStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "repositories", REPOSITORY_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl RepositoryStore for SqliteRepositoryStore<'_> {
    fn create_repository(&self, repository: &NewRepository) -> RepoResult<Repository> {
        repository.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO repositories (
                name,
                description,
                deadline,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?4);",
            params![
                repository.name.as_str(),
                repository.description.as_str(),
                repository.deadline,
                now,
            ],
        )?;

        let id = tx.last_insert_rowid();
        let created = load_repository(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted repository {id} missing on read-back"))
        })?;
        tx.commit()?;
        Ok(created)
    }

    fn get_repository(&self, id: RepositoryId) -> RepoResult<Option<Repository>> {
        load_repository(self.conn, id)
    }

    fn update_repository(
        &self,
        id: RepositoryId,
        patch: &RepositoryPatch,
    ) -> RepoResult<Repository> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current =
            load_repository(&tx, id)?.ok_or(RepoError::NotFound(EntityRef::Repository(id)))?;
        let mut next = patch.apply_to(&current)?;
        next.updated_at = now_epoch_ms();

        tx.execute(
            "UPDATE repositories
             SET
                name = ?2,
                description = ?3,
                deadline = ?4,
                updated_at = ?5
             WHERE id = ?1;",
            params![
                id,
                next.name.as_str(),
                next.description.as_str(),
                next.deadline,
                next.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(next)
    }

    fn delete_repository(&self, id: RepositoryId) -> RepoResult<DeleteReport> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_repository(&tx, id)?.is_none() {
            return Err(RepoError::NotFound(EntityRef::Repository(id)));
        }

        let comments = tx.execute(
            "DELETE FROM comments
             WHERE introduction_id IN (
                SELECT id
                FROM introductions
                WHERE repository_id = ?1
             );",
            [id],
        )?;
        let introductions =
            tx.execute("DELETE FROM introductions WHERE repository_id = ?1;", [id])?;
        tx.execute("DELETE FROM repositories WHERE id = ?1;", [id])?;
        tx.commit()?;

        Ok(DeleteReport {
            introductions,
            comments,
        })
    }

    fn list_repositories(&self) -> RepoResult<Vec<Repository>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPOSITORY_SELECT_SQL} ORDER BY deadline ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut repositories = Vec::new();
        while let Some(row) = rows.next()? {
            repositories.push(parse_repository_row(row)?);
        }
        Ok(repositories)
    }
}

/// Loads one repository by id. Shared with the draft store for seed lookups.
pub(crate) fn load_repository(
    conn: &Connection,
    id: RepositoryId,
) -> RepoResult<Option<Repository>> {
    let repository = conn
        .query_row(
            &format!("{REPOSITORY_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_repository_row(row)),
        )
        .optional()?;
    repository.transpose()
}

pub(crate) fn repository_exists(conn: &Connection, id: RepositoryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM repositories WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_repository_row(row: &Row<'_>) -> RepoResult<Repository> {
    Ok(Repository {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        deadline: row.get("deadline")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
