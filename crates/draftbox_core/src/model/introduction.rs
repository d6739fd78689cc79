//! Introduction draft model and the carry-forward seed rule.
//!
//! # Responsibility
//! - Define the versioned draft record owned by one repository.
//! - Derive the starting values of the next draft from the latest one.
//!
//! # Invariants
//! - `version` is always `>= 1`.
//! - A seed for a repository without drafts is `{1, "", Public}`.
//! - A seed otherwise copies `contents`/`access` of the latest draft and uses
//!   `latest.version + 1`.
//! - "Latest" means highest `version`; equal versions resolve to the highest
//!   `id` (most recently inserted).
//!
//! # See also
//! - `crate::repo::introduction_store`

use crate::model::repository::{Repository, RepositoryId};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Store-assigned introduction identifier.
pub type IntroductionId = i64;

/// Version assigned to the first draft of a repository.
pub const FIRST_VERSION: i64 = 1;

/// Draft visibility flag. Stored as data only; nothing in core enforces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Stored as `0`.
    Private,
    /// Stored as `1`.
    #[default]
    Public,
}

impl Access {
    /// Stable integer code used in storage.
    pub fn code(self) -> i64 {
        match self {
            Self::Private => 0,
            Self::Public => 1,
        }
    }

    /// Parses a storage/form integer code.
    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Private),
            1 => Ok(Self::Public),
            other => Err(ValidationError::UnknownAccess(other)),
        }
    }
}

/// Persisted introduction draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Introduction {
    pub id: IntroductionId,
    pub repository_id: RepositoryId,
    pub version: i64,
    pub contents: String,
    pub access: Access,
}

/// Pre-computed starting values for a new draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSeed {
    /// Resolved owning repository.
    pub repository: Repository,
    pub version: i64,
    pub contents: String,
    pub access: Access,
}

impl DraftSeed {
    /// Builds the seed from the latest existing draft, if any.
    ///
    /// Fails with `VersionOverflow` when `latest.version + 1` does not fit.
    pub fn from_latest(
        repository: Repository,
        latest: Option<&Introduction>,
    ) -> Result<Self, ValidationError> {
        let seed = match latest {
            None => Self {
                repository,
                version: FIRST_VERSION,
                contents: String::new(),
                access: Access::default(),
            },
            Some(latest) => Self {
                repository,
                version: latest
                    .version
                    .checked_add(1)
                    .ok_or(ValidationError::VersionOverflow(latest.version))?,
                contents: latest.contents.clone(),
                access: latest.access,
            },
        };
        Ok(seed)
    }

    /// Converts the (possibly caller-edited) seed into a create request.
    pub fn into_new_introduction(self) -> NewIntroduction {
        NewIntroduction {
            repository_id: self.repository.id,
            version: self.version,
            contents: self.contents,
            access: self.access,
        }
    }
}

/// Caller input for persisting a draft exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIntroduction {
    pub repository_id: RepositoryId,
    pub version: i64,
    pub contents: String,
    pub access: Access,
}

impl NewIntroduction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_version(self.version)?;
        validate_contents(&self.contents)
    }
}

/// Partial in-place edit of a draft. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntroductionPatch {
    pub repository_id: Option<RepositoryId>,
    pub version: Option<i64>,
    pub contents: Option<String>,
    pub access: Option<Access>,
}

impl IntroductionPatch {
    /// Returns a copy of `current` with this patch applied and validated.
    pub fn apply_to(&self, current: &Introduction) -> Result<Introduction, ValidationError> {
        let mut next = current.clone();
        if let Some(repository_id) = self.repository_id {
            next.repository_id = repository_id;
        }
        if let Some(version) = self.version {
            next.version = version;
        }
        if let Some(contents) = self.contents.as_ref() {
            next.contents = contents.clone();
        }
        if let Some(access) = self.access {
            next.access = access;
        }

        validate_version(next.version)?;
        validate_contents(&next.contents)?;
        Ok(next)
    }
}

fn validate_version(version: i64) -> Result<(), ValidationError> {
    if version < FIRST_VERSION {
        return Err(ValidationError::NonPositiveVersion(version));
    }
    Ok(())
}

pub(crate) fn validate_contents(contents: &str) -> Result<(), ValidationError> {
    if contents.trim().is_empty() {
        return Err(ValidationError::BlankContents);
    }
    Ok(())
}
