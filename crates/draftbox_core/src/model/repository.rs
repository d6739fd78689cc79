//! Repository domain model.
//!
//! A repository is a time-boxed container that owns a sequence of
//! introduction drafts.
//!
//! # Invariants
//! - `created_at` is assigned once at insertion and never rewritten.
//! - `updated_at` is refreshed on every mutation.
//! - `deadline` is an epoch-millisecond value representable as a UTC datetime.
//!
//! # See also
//! - `crate::repo::repository_store`

use crate::model::validation::{exceeds_chars, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned repository identifier.
pub type RepositoryId = i64;

/// Maximum repository name length in characters.
pub const REPOSITORY_NAME_MAX_CHARS: usize = 60;
/// Maximum repository description length in characters.
pub const REPOSITORY_DESCRIPTION_MAX_CHARS: usize = 200;

const NAIVE_DEADLINE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Persisted repository record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub description: String,
    /// Epoch milliseconds, UTC.
    pub deadline: i64,
    /// Epoch milliseconds. Set once on insert.
    pub created_at: i64,
    /// Epoch milliseconds. Refreshed on every update.
    pub updated_at: i64,
}

/// Caller input for creating a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub description: String,
    pub deadline: i64,
}

impl NewRepository {
    pub fn new(name: impl Into<String>, description: impl Into<String>, deadline: i64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            deadline,
        }
    }

    /// Checks required fields, length limits and deadline range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_deadline(self.deadline)
    }
}

/// Partial update for a repository. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<i64>,
}

impl RepositoryPatch {
    /// Returns a copy of `current` with this patch applied and validated.
    pub fn apply_to(&self, current: &Repository) -> Result<Repository, ValidationError> {
        let mut next = current.clone();
        if let Some(name) = self.name.as_ref() {
            next.name = name.clone();
        }
        if let Some(description) = self.description.as_ref() {
            next.description = description.clone();
        }
        if let Some(deadline) = self.deadline {
            next.deadline = deadline;
        }

        validate_name(&next.name)?;
        validate_description(&next.description)?;
        validate_deadline(next.deadline)?;
        Ok(next)
    }
}

/// Parses caller-supplied deadline text into epoch milliseconds (UTC).
///
/// Accepted shapes:
/// - RFC 3339 with offset (`2024-03-01T09:00:00+09:00`)
/// - naive datetime, read as UTC (`2024-03-01 09:00[:00]`, `T` separator too)
/// - bare date, read as UTC midnight (`2024-03-01`)
pub fn parse_deadline(value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDeadline);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.timestamp_millis());
    }

    for format in NAIVE_DEADLINE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc().timestamp_millis());
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc().timestamp_millis());
    }

    Err(ValidationError::InvalidDeadline(trimmed.to_string()))
}

/// Rejects epoch values that do not map to a UTC datetime.
pub fn validate_deadline(deadline: i64) -> Result<(), ValidationError> {
    match DateTime::<Utc>::from_timestamp_millis(deadline) {
        Some(_) => Ok(()),
        None => Err(ValidationError::DeadlineOutOfRange(deadline)),
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if let Some(actual) = exceeds_chars(name, REPOSITORY_NAME_MAX_CHARS) {
        return Err(ValidationError::NameTooLong {
            max: REPOSITORY_NAME_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::BlankDescription);
    }
    if let Some(actual) = exceeds_chars(description, REPOSITORY_DESCRIPTION_MAX_CHARS) {
        return Err(ValidationError::DescriptionTooLong {
            max: REPOSITORY_DESCRIPTION_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_deadline, NewRepository, Repository, RepositoryPatch};
    use crate::model::validation::ValidationError;

    const MARCH_1_2024_MS: i64 = 1_709_251_200_000;

    #[test]
    fn parse_deadline_accepts_bare_date_as_utc_midnight() {
        assert_eq!(parse_deadline("2024-03-01").unwrap(), MARCH_1_2024_MS);
    }

    #[test]
    fn parse_deadline_honors_rfc3339_offset() {
        let parsed = parse_deadline("2024-03-01T09:00:00+09:00").unwrap();
        assert_eq!(parsed, MARCH_1_2024_MS);
    }

    #[test]
    fn parse_deadline_accepts_naive_datetime() {
        let parsed = parse_deadline(" 2024-03-01 00:30 ").unwrap();
        assert_eq!(parsed, MARCH_1_2024_MS + 30 * 60 * 1000);
    }

    #[test]
    fn parse_deadline_rejects_malformed_and_empty_text() {
        assert_eq!(parse_deadline("   "), Err(ValidationError::MissingDeadline));
        assert!(matches!(
            parse_deadline("2024-13-01"),
            Err(ValidationError::InvalidDeadline(_))
        ));
    }

    #[test]
    fn new_repository_enforces_required_fields_and_limits() {
        let blank = NewRepository::new("  ", "desc", MARCH_1_2024_MS);
        assert_eq!(blank.validate(), Err(ValidationError::BlankName));

        let long_name = NewRepository::new("n".repeat(61), "desc", MARCH_1_2024_MS);
        assert_eq!(
            long_name.validate(),
            Err(ValidationError::NameTooLong {
                max: 60,
                actual: 61
            })
        );

        let out_of_range = NewRepository::new("name", "desc", i64::MAX);
        assert_eq!(
            out_of_range.validate(),
            Err(ValidationError::DeadlineOutOfRange(i64::MAX))
        );
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let current = Repository {
            id: 7,
            name: "Spring2024".to_string(),
            description: "spring hiring".to_string(),
            deadline: MARCH_1_2024_MS,
            created_at: 10,
            updated_at: 10,
        };
        let patch = RepositoryPatch {
            description: Some("updated".to_string()),
            ..RepositoryPatch::default()
        };

        let next = patch.apply_to(&current).unwrap();
        assert_eq!(next.name, "Spring2024");
        assert_eq!(next.description, "updated");
        assert_eq!(next.deadline, MARCH_1_2024_MS);
        assert_eq!(next.created_at, 10);
    }
}
