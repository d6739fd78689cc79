//! Introduction draft store: version-chain persistence.
//!
//! # Responsibility
//! - Read the latest draft of a repository and build the next-draft seed.
//! - Persist drafts exactly as given, or with a store-computed next version.
//! - Own the draft delete cascade (comments).
//!
//! # Invariants
//! - Listing is ordered `version DESC, id DESC`.
//! - "Latest" is the first row of that ordering, so duplicate versions
//!   resolve to the most recently inserted draft.
//! - `(repository_id, version)` is unique; collisions surface as
//!   `RepoError::Conflict` and write nothing.
//! - Next-version derivation and insert share one `IMMEDIATE` transaction.

use crate::model::introduction::{
    validate_contents, Access, DraftSeed, Introduction, IntroductionId, IntroductionPatch,
    NewIntroduction,
};
use crate::model::repository::RepositoryId;
use crate::repo::repository_store::{load_repository, repository_exists};
use crate::repo::{ensure_table_ready, is_unique_violation, EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const INTRODUCTION_SELECT_SQL: &str = "SELECT
    id,
    repository_id,
    version,
    contents,
    access
FROM introductions";

const INTRODUCTION_COLUMNS: &[&str] = &["id", "repository_id", "version", "contents", "access"];

/// Store interface for introduction drafts.
pub trait IntroductionStore {
    /// Computes the seed for the next draft of `repository_id`. Read-only.
    fn prepare_next_draft(&self, repository_id: RepositoryId) -> RepoResult<DraftSeed>;
    /// Inserts one draft with a caller-provided version.
    fn create_introduction(&self, draft: &NewIntroduction) -> RepoResult<Introduction>;
    /// Inserts one draft at `max(version) + 1` (or 1) in a single transaction.
    fn create_next_introduction(
        &self,
        repository_id: RepositoryId,
        contents: &str,
        access: Access,
    ) -> RepoResult<Introduction>;
    fn get_introduction(&self, id: IntroductionId) -> RepoResult<Option<Introduction>>;
    fn update_introduction(
        &self,
        id: IntroductionId,
        patch: &IntroductionPatch,
    ) -> RepoResult<Introduction>;
    /// Deletes one draft and its comments. Returns the removed comment count.
    fn delete_introduction(&self, id: IntroductionId) -> RepoResult<usize>;
    fn list_for_repository(&self, repository_id: RepositoryId) -> RepoResult<Vec<Introduction>>;
}

/// SQLite-backed introduction store.
pub struct SqliteIntroductionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIntroductionStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "introductions", INTRODUCTION_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl IntroductionStore for SqliteIntroductionStore<'_> {
    fn prepare_next_draft(&self, repository_id: RepositoryId) -> RepoResult<DraftSeed> {
        // Deferred: repository and latest draft come from one read snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let repository = load_repository(&tx, repository_id)?
            .ok_or(RepoError::NotFound(EntityRef::Repository(repository_id)))?;
        let latest = load_latest(&tx, repository_id)?;
        tx.commit()?;

        Ok(DraftSeed::from_latest(repository, latest.as_ref())?)
    }

    fn create_introduction(&self, draft: &NewIntroduction) -> RepoResult<Introduction> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !repository_exists(&tx, draft.repository_id)? {
            return Err(RepoError::NotFound(EntityRef::Repository(
                draft.repository_id,
            )));
        }

        let created = insert_introduction(&tx, draft)?;
        tx.commit()?;
        Ok(created)
    }

    fn create_next_introduction(
        &self,
        repository_id: RepositoryId,
        contents: &str,
        access: Access,
    ) -> RepoResult<Introduction> {
        validate_contents(contents)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let repository = load_repository(&tx, repository_id)?
            .ok_or(RepoError::NotFound(EntityRef::Repository(repository_id)))?;
        let latest = load_latest(&tx, repository_id)?;
        let seed = DraftSeed::from_latest(repository, latest.as_ref())?;

        let draft = NewIntroduction {
            contents: contents.to_string(),
            access,
            ..seed.into_new_introduction()
        };
        let created = insert_introduction(&tx, &draft)?;
        tx.commit()?;
        Ok(created)
    }

    fn get_introduction(&self, id: IntroductionId) -> RepoResult<Option<Introduction>> {
        load_introduction(self.conn, id)
    }

    fn update_introduction(
        &self,
        id: IntroductionId,
        patch: &IntroductionPatch,
    ) -> RepoResult<Introduction> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current =
            load_introduction(&tx, id)?.ok_or(RepoError::NotFound(EntityRef::Introduction(id)))?;
        let next = patch.apply_to(&current)?;

        if next.repository_id != current.repository_id
            && !repository_exists(&tx, next.repository_id)?
        {
            return Err(RepoError::NotFound(EntityRef::Repository(
                next.repository_id,
            )));
        }

        tx.execute(
            "UPDATE introductions
             SET
                repository_id = ?2,
                version = ?3,
                contents = ?4,
                access = ?5
             WHERE id = ?1;",
            params![
                id,
                next.repository_id,
                next.version,
                next.contents.as_str(),
                next.access.code(),
            ],
        )
        .map_err(|err| map_version_conflict(err, next.repository_id, next.version))?;
        tx.commit()?;

        Ok(next)
    }

    fn delete_introduction(&self, id: IntroductionId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_introduction(&tx, id)?.is_none() {
            return Err(RepoError::NotFound(EntityRef::Introduction(id)));
        }

        let comments = tx.execute("DELETE FROM comments WHERE introduction_id = ?1;", [id])?;
        tx.execute("DELETE FROM introductions WHERE id = ?1;", [id])?;
        tx.commit()?;

        Ok(comments)
    }

    fn list_for_repository(&self, repository_id: RepositoryId) -> RepoResult<Vec<Introduction>> {
        if !repository_exists(self.conn, repository_id)? {
            return Err(RepoError::NotFound(EntityRef::Repository(repository_id)));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{INTRODUCTION_SELECT_SQL}
             WHERE repository_id = ?1
             ORDER BY version DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([repository_id])?;
        let mut drafts = Vec::new();
        while let Some(row) = rows.next()? {
            drafts.push(parse_introduction_row(row)?);
        }
        Ok(drafts)
    }
}

pub(crate) fn load_introduction(
    conn: &Connection,
    id: IntroductionId,
) -> RepoResult<Option<Introduction>> {
    let draft = conn
        .query_row(
            &format!("{INTRODUCTION_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_introduction_row(row)),
        )
        .optional()?;
    draft.transpose()
}

fn load_latest(conn: &Connection, repository_id: RepositoryId) -> RepoResult<Option<Introduction>> {
    let latest = conn
        .query_row(
            &format!(
                "{INTRODUCTION_SELECT_SQL}
                 WHERE repository_id = ?1
                 ORDER BY version DESC, id DESC
                 LIMIT 1;"
            ),
            [repository_id],
            |row| Ok(parse_introduction_row(row)),
        )
        .optional()?;
    latest.transpose()
}

fn insert_introduction(conn: &Connection, draft: &NewIntroduction) -> RepoResult<Introduction> {
    conn.execute(
        "INSERT INTO introductions (
            repository_id,
            version,
            contents,
            access
        ) VALUES (?1, ?2, ?3, ?4);",
        params![
            draft.repository_id,
            draft.version,
            draft.contents.as_str(),
            draft.access.code(),
        ],
    )
    .map_err(|err| map_version_conflict(err, draft.repository_id, draft.version))?;

    Ok(Introduction {
        id: conn.last_insert_rowid(),
        repository_id: draft.repository_id,
        version: draft.version,
        contents: draft.contents.clone(),
        access: draft.access,
    })
}

fn map_version_conflict(
    err: rusqlite::Error,
    repository_id: RepositoryId,
    version: i64,
) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::Conflict {
            repository_id,
            version,
        }
    } else {
        err.into()
    }
}

fn parse_introduction_row(row: &Row<'_>) -> RepoResult<Introduction> {
    let access_code: i64 = row.get("access")?;
    let access = Access::from_code(access_code).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid access value `{access_code}` in introductions.access"
        ))
    })?;

    Ok(Introduction {
        id: row.get("id")?,
        repository_id: row.get("repository_id")?,
        version: row.get("version")?,
        contents: row.get("contents")?,
        access,
    })
}
