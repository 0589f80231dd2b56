//! Store Error Types
//!
//! Errors raised by [`InMemoryStore`](crate::db::InMemoryStore). Store methods
//! return `anyhow::Result`, so these travel inside `anyhow::Error` and can be
//! recovered with `downcast_ref`.

use crate::models::{BrickId, UserId, VoteId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Uniqueness constraint on (voter, brick) violated
    #[error("Vote by user {voter_id} on brick {brick_id} already exists")]
    DuplicateVote { voter_id: UserId, brick_id: BrickId },

    #[error("Brick {id} not found in store")]
    BrickNotFound { id: BrickId },

    #[error("Vote {id} not found in store")]
    VoteNotFound { id: VoteId },
}

impl StoreError {
    pub fn duplicate_vote(voter_id: UserId, brick_id: BrickId) -> Self {
        Self::DuplicateVote { voter_id, brick_id }
    }

    pub fn brick_not_found(id: BrickId) -> Self {
        Self::BrickNotFound { id }
    }

    pub fn vote_not_found(id: VoteId) -> Self {
        Self::VoteNotFound { id }
    }
}
