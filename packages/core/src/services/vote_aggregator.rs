//! Vote Aggregation
//!
//! Records one user's vote on a brick and rewrites the brick's cached
//! average. The store recomputes the average from all votes on every call,
//! in one atomic step; vote counts per brick are small.

use crate::db::BrickStore;
use crate::models::{validate_vote_value, BrickId, NewVote, UserId};
use crate::services::BrickServiceError;

/// Insert or update the vote of `voter_id` on `brick_id` and return the new average
///
/// # Errors
///
/// - `Validation` if `value` is outside `[-2, 2]` (nothing is written)
/// - `NotFound` if the brick does not exist
/// - `Store` for backend failures, including a concurrent duplicate insert
pub async fn record_vote(
    store: &dyn BrickStore,
    brick_id: BrickId,
    voter_id: UserId,
    value: f64,
) -> Result<f64, BrickServiceError> {
    let value = validate_vote_value(value)?;

    if store.get_brick(brick_id).await?.is_none() {
        return Err(BrickServiceError::not_found(brick_id));
    }

    match store.get_vote(brick_id, voter_id).await? {
        Some(existing) => {
            store.update_vote_value(existing.id, value).await?;
        }
        None => {
            store
                .insert_vote(NewVote {
                    voter_id,
                    brick_id,
                    value,
                })
                .await?;
        }
    }

    let average = store.recompute_cached_avg_vote(brick_id).await?;
    tracing::debug!("Brick {} vote average now {:.3}", brick_id, average);

    Ok(average)
}
