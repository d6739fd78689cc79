//! Comment thread model.
//!
//! # Invariants
//! - A comment belongs to exactly one introduction for its whole lifetime.
//! - Text is non-blank and at most `COMMENT_MAX_CHARS` characters.

use crate::model::introduction::IntroductionId;
use crate::model::validation::{exceeds_chars, ValidationError};
use serde::{Deserialize, Serialize};

/// Store-assigned comment identifier.
pub type CommentId = i64;

/// Maximum comment length in characters.
pub const COMMENT_MAX_CHARS: usize = 200;

/// Persisted comment attached to one introduction version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub introduction_id: IntroductionId,
    pub comment: String,
    /// Epoch milliseconds. Set once on insert.
    pub created_at: i64,
    /// Epoch milliseconds. Refreshed on every update.
    pub updated_at: i64,
}

/// Checks comment text against blank and length rules.
pub fn validate_comment_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::BlankComment);
    }
    if let Some(actual) = exceeds_chars(text, COMMENT_MAX_CHARS) {
        return Err(ValidationError::CommentTooLong {
            max: COMMENT_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}
