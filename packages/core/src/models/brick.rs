//! Brick Data Structures
//!
//! A brick is one discussion unit: either a root thesis or a typed response
//! (pro, contra, comment, question, improvement) to another brick.
//!
//! # Invariants
//!
//! - A thesis has no parent; every other brick has one.
//! - `associated_group` and `additional_groups` equal those of the root thesis.
//!   They are fixed when the thesis is created and copied onto every response.
//!
//! # Examples
//!
//! ```rust
//! use sober_core::models::{BrickType, NewBrick};
//!
//! let thesis = NewBrick::thesis("Cities should be car-free", "Because ...", "public");
//! assert_eq!(thesis.brick_type, BrickType::Thesis);
//! assert!(thesis.validate().is_ok());
//! ```

use crate::models::{BrickType, VoteCriterion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Primary key of a brick
pub type BrickId = i64;

/// Primary key of a user
pub type UserId = i64;

/// Group name (e.g. `"public"`)
pub type GroupId = String;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_CONTENT_LEN: usize = 5000;
pub const MAX_TAGS_LEN: usize = 1000;
pub const MAX_REFERENCES_LEN: usize = 5000;

/// Validation errors for brick and vote input
///
/// All of these are raised before anything is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid brick type code: {0}")]
    InvalidTypeCode(String),

    #[error("Field '{field}' exceeds {max} characters (got {actual})")]
    FieldTooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("A thesis cannot have a parent (parent {parent_id})")]
    ThesisWithParent { parent_id: BrickId },

    #[error("A {brick_type} brick requires a parent")]
    ResponseWithoutParent { brick_type: BrickType },

    #[error("Vote value {0} is outside [-2, 2]")]
    VoteOutOfRange(f64),

    #[error("Short title length must be greater than 3 (got {0})")]
    InvalidShortTitleLength(usize),
}

/// Persisted discussion unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brick {
    pub id: BrickId,

    pub brick_type: BrickType,

    pub title: String,

    pub content: String,

    pub tags: Option<String>,

    pub references: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// `None` only for a thesis
    pub parent_id: Option<BrickId>,

    /// Group the whole tree belongs to (copied from the thesis)
    pub associated_group: GroupId,

    /// Further groups allowed to see the tree (copied from the thesis)
    #[serde(default)]
    pub additional_groups: BTreeSet<GroupId>,

    /// Arithmetic mean of all votes, rewritten after every vote
    #[serde(default)]
    pub cached_avg_vote: f64,

    pub creator_id: Option<UserId>,
}

impl Brick {
    pub fn symbol(&self) -> &'static str {
        self.brick_type.symbol()
    }

    pub fn type_code(&self) -> &'static str {
        self.brick_type.code()
    }

    pub fn vote_criterion(&self) -> VoteCriterion {
        self.brick_type.vote_criterion()
    }

    pub fn is_thesis(&self) -> bool {
        self.brick_type.is_thesis()
    }

    /// Title truncated to `n_chars` characters, ending in `...` when cut
    pub fn short_title(&self, n_chars: usize) -> Result<String, ValidationError> {
        if n_chars <= 3 {
            return Err(ValidationError::InvalidShortTitleLength(n_chars));
        }

        if self.title.chars().count() <= n_chars {
            return Ok(self.title.clone());
        }

        let head: String = self.title.chars().take(n_chars - 3).collect();
        Ok(format!("{}...", head))
    }

    /// Check the thesis/parent rule for this record
    ///
    /// Returns a description of the violation, if any.
    pub fn structure_violation(&self) -> Option<String> {
        match (self.brick_type, self.parent_id) {
            (BrickType::Thesis, Some(parent_id)) => Some(format!(
                "thesis {} has parent {}",
                self.id, parent_id
            )),
            (brick_type, None) if !brick_type.is_thesis() => Some(format!(
                "{} brick {} has no parent",
                brick_type, self.id
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Brick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 30 > 3, so this cannot fail
        let short = self.short_title(30).unwrap_or_default();
        write!(f, "Brick_{}({}): '{}'", self.id, self.brick_type, short)
    }
}

/// Input for creating a brick
///
/// For responses the group fields are ignored: the service copies them from
/// the root thesis.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBrick {
    pub brick_type: BrickType,
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
    pub references: Option<String>,
    pub parent_id: Option<BrickId>,
    pub associated_group: GroupId,
    pub additional_groups: BTreeSet<GroupId>,
    pub creator_id: Option<UserId>,
}

impl NewBrick {
    /// New thesis owned by `group`
    pub fn thesis(
        title: impl Into<String>,
        content: impl Into<String>,
        group: impl Into<GroupId>,
    ) -> Self {
        Self {
            brick_type: BrickType::Thesis,
            title: title.into(),
            content: content.into(),
            tags: None,
            references: None,
            parent_id: None,
            associated_group: group.into(),
            additional_groups: BTreeSet::new(),
            creator_id: None,
        }
    }

    /// New response of `brick_type` under `parent_id`
    pub fn response(
        brick_type: BrickType,
        parent_id: BrickId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            brick_type,
            title: title.into(),
            content: content.into(),
            tags: None,
            references: None,
            parent_id: Some(parent_id),
            associated_group: GroupId::new(),
            additional_groups: BTreeSet::new(),
            creator_id: None,
        }
    }

    pub fn with_creator(mut self, creator_id: UserId) -> Self {
        self.creator_id = Some(creator_id);
        self
    }

    pub fn with_additional_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupId>,
    {
        self.additional_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_references(mut self, references: impl Into<String>) -> Self {
        self.references = Some(references.into());
        self
    }

    /// Validate field limits and the thesis/parent rule
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()));
        }

        check_len("title", &self.title, MAX_TITLE_LEN)?;
        check_len("content", &self.content, MAX_CONTENT_LEN)?;
        if let Some(tags) = &self.tags {
            check_len("tags", tags, MAX_TAGS_LEN)?;
        }
        if let Some(references) = &self.references {
            check_len("references", references, MAX_REFERENCES_LEN)?;
        }

        match (self.brick_type, self.parent_id) {
            (BrickType::Thesis, Some(parent_id)) => {
                Err(ValidationError::ThesisWithParent { parent_id })
            }
            (BrickType::Thesis, None) if self.associated_group.is_empty() => Err(
                ValidationError::MissingField("associated_group".to_string()),
            ),
            (brick_type, None) if !brick_type.is_thesis() => {
                Err(ValidationError::ResponseWithoutParent { brick_type })
            }
            _ => Ok(()),
        }
    }
}

/// Editable fields of an existing brick
///
/// Type, parent and groups never change after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrickEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Option<String>>,
    pub references: Option<Option<String>>,
}

impl BrickEdit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::MissingField("title".to_string()));
            }
            check_len("title", title, MAX_TITLE_LEN)?;
        }
        if let Some(content) = &self.content {
            check_len("content", content, MAX_CONTENT_LEN)?;
        }
        if let Some(Some(tags)) = &self.tags {
            check_len("tags", tags, MAX_TAGS_LEN)?;
        }
        if let Some(Some(references)) = &self.references {
            check_len("references", references, MAX_REFERENCES_LEN)?;
        }
        Ok(())
    }

    /// Apply the edit to `brick`, leaving untouched fields as they are
    pub fn apply_to(self, brick: &mut Brick) {
        if let Some(title) = self.title {
            brick.title = title;
        }
        if let Some(content) = self.content {
            brick.content = content;
        }
        if let Some(tags) = self.tags {
            brick.tags = tags;
        }
        if let Some(references) = self.references {
            brick.references = references;
        }
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }
    Ok(())
}
