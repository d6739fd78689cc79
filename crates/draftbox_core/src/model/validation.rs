//! Field validation errors shared by every write path.
//!
//! # Invariants
//! - Validation runs before any SQL mutation; a failed check writes nothing.
//! - Length limits are counted in Unicode scalar values, not bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection reason for caller-provided field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Repository name is empty after trim.
    BlankName,
    /// Repository name exceeds the column limit.
    NameTooLong { max: usize, actual: usize },
    /// Repository description is empty after trim.
    BlankDescription,
    /// Repository description exceeds the column limit.
    DescriptionTooLong { max: usize, actual: usize },
    /// Deadline text was empty.
    MissingDeadline,
    /// Deadline text could not be parsed as a timestamp.
    InvalidDeadline(String),
    /// Deadline epoch value is outside the representable calendar range.
    DeadlineOutOfRange(i64),
    /// Draft version must be `>= 1`.
    NonPositiveVersion(i64),
    /// Latest draft already holds the largest representable version.
    VersionOverflow(i64),
    /// Draft contents are empty after trim.
    BlankContents,
    /// Access code is neither `0` (private) nor `1` (public).
    UnknownAccess(i64),
    /// Comment text is empty after trim.
    BlankComment,
    /// Comment text exceeds the column limit.
    CommentTooLong { max: usize, actual: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "repository name must not be blank"),
            Self::NameTooLong { max, actual } => write!(
                f,
                "repository name is {actual} characters; limit is {max}"
            ),
            Self::BlankDescription => write!(f, "repository description must not be blank"),
            Self::DescriptionTooLong { max, actual } => write!(
                f,
                "repository description is {actual} characters; limit is {max}"
            ),
            Self::MissingDeadline => write!(f, "repository deadline is required"),
            Self::InvalidDeadline(value) => write!(f, "invalid deadline timestamp `{value}`"),
            Self::DeadlineOutOfRange(value) => {
                write!(f, "deadline epoch millis {value} is out of range")
            }
            Self::NonPositiveVersion(value) => {
                write!(f, "draft version must be >= 1, got {value}")
            }
            Self::VersionOverflow(latest) => {
                write!(f, "no version follows latest draft version {latest}")
            }
            Self::BlankContents => write!(f, "draft contents must not be blank"),
            Self::UnknownAccess(code) => {
                write!(f, "unknown access code {code}; expected 0 (private) or 1 (public)")
            }
            Self::BlankComment => write!(f, "comment must not be blank"),
            Self::CommentTooLong { max, actual } => {
                write!(f, "comment is {actual} characters; limit is {max}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Returns the character count of `value` when it exceeds `max`.
pub(crate) fn exceeds_chars(value: &str, max: usize) -> Option<usize> {
    let count = value.chars().count();
    (count > max).then_some(count)
}
