//! Service Layer Error Types
//!
//! One error type covers materialization, extraction, voting and brick
//! creation. Every error aborts the whole operation that raised it; nothing
//! is retried or partially returned.

use crate::models::{BrickId, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrickServiceError {
    /// Requested brick does not exist in the store
    #[error("Brick not found: {id}")]
    NotFound { id: BrickId },

    /// Structural violation found while walking a tree
    ///
    /// Thesis with a parent, response without one, a dangling parent
    /// reference or a parent chain that does not terminate. Never repaired
    /// in-line; an operator sweep has to fix the data.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// Brick was not materialized in the tree it was requested from
    #[error("Brick {id} is not part of the materialized tree")]
    NotInTree { id: BrickId },

    /// Input rejected before any write
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Caller may not see the tree containing this brick
    #[error("Permission denied for brick {id}")]
    PermissionDenied { id: BrickId },

    /// Engine settings rejected at service construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend failure reported by the store
    #[error("Store operation failed: {0}")]
    Store(#[from] anyhow::Error),
}

impl BrickServiceError {
    pub fn not_found(id: BrickId) -> Self {
        Self::NotFound { id }
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    pub fn not_in_tree(id: BrickId) -> Self {
        Self::NotInTree { id }
    }

    pub fn permission_denied(id: BrickId) -> Self {
        Self::PermissionDenied { id }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
