//! Brick Type Registry
//!
//! Every brick has exactly one [`BrickType`]. All per-type presentation data
//! (numeric code, two-letter type code, display name, symbol, presentation rank
//! and vote criterion) lives in a single table so the lookups cannot drift apart.
//!
//! # Examples
//!
//! ```rust
//! use sober_core::models::BrickType;
//!
//! let pro = BrickType::from_code("pa").unwrap();
//! assert_eq!(pro, BrickType::Pro);
//! assert_eq!(pro.symbol(), "✓");
//! assert!(BrickType::Thesis.rank() < pro.rank());
//! ```

use crate::models::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discussion unit type
///
/// The discriminants are the persisted numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrickType {
    Thesis = 1,
    Pro = 2,
    Contra = 3,
    Comment = 4,
    Question = 5,
    Improvement = 6,
}

/// Criterion a vote on a brick is judged by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteCriterion {
    Agreement,
    Cogency,
    Relevance,
}

impl VoteCriterion {
    /// Label in `language` (`en` or `de`); anything else falls back to English
    pub fn localized_label(self, language: &str) -> &'static str {
        match (language, self) {
            ("de", VoteCriterion::Agreement) => "Zustimmung",
            ("de", VoteCriterion::Cogency) => "Stichhaltigkeit",
            ("de", VoteCriterion::Relevance) => "Relevanz",
            (_, VoteCriterion::Agreement) => "Agreement",
            (_, VoteCriterion::Cogency) => "Cogency",
            (_, VoteCriterion::Relevance) => "Relevance",
        }
    }
}

impl fmt::Display for VoteCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.localized_label("en"))
    }
}

/// Static description of one brick type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrickTypeInfo {
    pub brick_type: BrickType,
    /// Two-letter code used in URLs and forms
    pub code: &'static str,
    pub name: &'static str,
    /// German display name
    pub name_de: &'static str,
    /// Symbol used in title tags
    pub symbol: &'static str,
    /// Sort key for presentation order among siblings
    pub rank: u8,
    pub vote_criterion: VoteCriterion,
}

const REGISTRY: [BrickTypeInfo; 6] = [
    BrickTypeInfo {
        brick_type: BrickType::Thesis,
        code: "th",
        name: "Thesis",
        name_de: "These",
        symbol: "!",
        rank: 1,
        vote_criterion: VoteCriterion::Agreement,
    },
    BrickTypeInfo {
        brick_type: BrickType::Pro,
        code: "pa",
        name: "Pro",
        name_de: "Pro",
        symbol: "✓",
        rank: 2,
        vote_criterion: VoteCriterion::Cogency,
    },
    BrickTypeInfo {
        brick_type: BrickType::Contra,
        code: "ca",
        name: "Contra",
        name_de: "Contra",
        symbol: "⚡",
        rank: 3,
        vote_criterion: VoteCriterion::Cogency,
    },
    BrickTypeInfo {
        brick_type: BrickType::Comment,
        code: "co",
        name: "Comment",
        name_de: "Kommentar",
        symbol: "\u{1F5E8}",
        rank: 4,
        vote_criterion: VoteCriterion::Relevance,
    },
    BrickTypeInfo {
        brick_type: BrickType::Question,
        code: "qu",
        name: "Question",
        name_de: "Frage",
        symbol: "?",
        rank: 5,
        vote_criterion: VoteCriterion::Relevance,
    },
    BrickTypeInfo {
        brick_type: BrickType::Improvement,
        code: "is",
        name: "Improvement",
        name_de: "Verbesserungsvorschlag",
        symbol: "\u{1F4A1}",
        rank: 6,
        vote_criterion: VoteCriterion::Relevance,
    },
];

impl BrickType {
    /// All types in registry order
    pub const ALL: [BrickType; 6] = [
        BrickType::Thesis,
        BrickType::Pro,
        BrickType::Contra,
        BrickType::Comment,
        BrickType::Question,
        BrickType::Improvement,
    ];

    pub fn info(self) -> &'static BrickTypeInfo {
        &REGISTRY[self.index()]
    }

    /// Position of this type in [`BrickType::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    pub fn numeric_code(self) -> u8 {
        self as u8
    }

    pub fn code(self) -> &'static str {
        self.info().code
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Display name in `language` (`en` or `de`); anything else falls back to English
    pub fn localized_name(self, language: &str) -> &'static str {
        match language {
            "de" => self.info().name_de,
            _ => self.info().name,
        }
    }

    pub fn symbol(self) -> &'static str {
        self.info().symbol
    }

    pub fn rank(self) -> u8 {
        self.info().rank
    }

    pub fn vote_criterion(self) -> VoteCriterion {
        self.info().vote_criterion
    }

    pub fn is_thesis(self) -> bool {
        self == BrickType::Thesis
    }

    /// Parse a two-letter type code (`th`, `pa`, `ca`, `co`, `qu`, `is`)
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        REGISTRY
            .iter()
            .find(|info| info.code == code)
            .map(|info| info.brick_type)
            .ok_or_else(|| ValidationError::InvalidTypeCode(code.to_string()))
    }

    /// Parse a persisted numeric code
    pub fn from_numeric_code(code: u8) -> Result<Self, ValidationError> {
        BrickType::ALL
            .iter()
            .copied()
            .find(|t| t.numeric_code() == code)
            .ok_or_else(|| ValidationError::InvalidTypeCode(code.to_string()))
    }
}

impl fmt::Display for BrickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
