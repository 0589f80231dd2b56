//! Vote records
//!
//! A vote rates one brick on the criterion of its type (see
//! [`VoteCriterion`](crate::models::VoteCriterion)). Each user holds at most
//! one vote per brick; voting again replaces the value.

use crate::models::{BrickId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// Primary key of a vote
pub type VoteId = i64;

pub const MIN_VOTE_VALUE: f64 = -2.0;
pub const MAX_VOTE_VALUE: f64 = 2.0;

/// Persisted vote, unique per `(voter_id, brick_id)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: UserId,
    pub brick_id: BrickId,
    pub value: f64,
}

/// Vote not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewVote {
    pub voter_id: UserId,
    pub brick_id: BrickId,
    pub value: f64,
}

/// Reject NaN, infinities and values outside `[-2, 2]`
pub fn validate_vote_value(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && (MIN_VOTE_VALUE..=MAX_VOTE_VALUE).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::VoteOutOfRange(value))
    }
}

/// Arithmetic mean of the vote values, 0 for no votes
pub fn average_vote<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> f64 {
    let (sum, count) = votes
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v.value, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
