//! Comment store contracts and SQLite implementation.
//!
//! # Invariants
//! - Listing is ordered `created_at DESC, id DESC` (newest first; ties on the
//!   same millisecond resolve to insertion order).
//! - `introduction_id` is written once at insert; updates touch text only.

use crate::model::comment::{validate_comment_text, Comment, CommentId};
use crate::model::introduction::IntroductionId;
use crate::repo::introduction_store::load_introduction;
use crate::repo::{ensure_table_ready, now_epoch_ms, EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    introduction_id,
    comment,
    created_at,
    updated_at
FROM comments";

const COMMENT_COLUMNS: &[&str] = &[
    "id",
    "introduction_id",
    "comment",
    "created_at",
    "updated_at",
];

/// Store interface for comment threads.
pub trait CommentStore {
    fn create_comment(&self, introduction_id: IntroductionId, text: &str) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn update_comment(&self, id: CommentId, text: &str) -> RepoResult<Comment>;
    fn delete_comment(&self, id: CommentId) -> RepoResult<()>;
    fn list_for_introduction(&self, introduction_id: IntroductionId) -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed comment store.
pub struct SqliteCommentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "comments", COMMENT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl CommentStore for SqliteCommentStore<'_> {
    fn create_comment(&self, introduction_id: IntroductionId, text: &str) -> RepoResult<Comment> {
        validate_comment_text(text)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_introduction(&tx, introduction_id)?.is_none() {
            return Err(RepoError::NotFound(EntityRef::Introduction(
                introduction_id,
            )));
        }

        let now = now_epoch_ms();
        tx.execute(
            "INSERT INTO comments (
                introduction_id,
                comment,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?3);",
            params![introduction_id, text, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Comment {
            id,
            introduction_id,
            comment: text.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        load_comment(self.conn, id)
    }

    fn update_comment(&self, id: CommentId, text: &str) -> RepoResult<Comment> {
        validate_comment_text(text)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE comments
             SET
                comment = ?2,
                updated_at = ?3
             WHERE id = ?1;",
            params![id, text, now_epoch_ms()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Comment(id)));
        }

        let updated = load_comment(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("updated comment {id} missing on read-back"))
        })?;
        tx.commit()?;
        Ok(updated)
    }

    fn delete_comment(&self, id: CommentId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM comments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Comment(id)));
        }
        tx.commit()?;
        Ok(())
    }

    fn list_for_introduction(&self, introduction_id: IntroductionId) -> RepoResult<Vec<Comment>> {
        if load_introduction(self.conn, introduction_id)?.is_none() {
            return Err(RepoError::NotFound(EntityRef::Introduction(
                introduction_id,
            )));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE introduction_id = ?1
             ORDER BY created_at DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([introduction_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }
}

fn load_comment(conn: &Connection, id: CommentId) -> RepoResult<Option<Comment>> {
    let comment = conn
        .query_row(
            &format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| Ok(parse_comment_row(row)),
        )
        .optional()?;
    comment.transpose()
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        introduction_id: row.get("introduction_id")?,
        comment: row.get("comment")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
