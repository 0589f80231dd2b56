//! BrickStore Trait - Persistence Abstraction
//!
//! The tree engine and the services only see bricks, votes and group
//! memberships through this trait. Implementations decide how records are
//! stored; [`InMemoryStore`](crate::db::InMemoryStore) is the bundled one.
//!
//! # Design Decisions
//!
//! 1. **Async**: all methods are async so database-backed implementations can
//!    await their driver. The engine awaits each call in sequence.
//! 2. **Ownership**: methods take ownership of inputs and return owned records.
//! 3. **Errors**: `anyhow::Result` keeps backend errors opaque to the engine.
//!    A missing record is `Ok(None)`, not an error.
//! 4. **Constraints**: uniqueness of (voter, brick) on votes and the atomic
//!    recomputation of the cached vote average are enforced here, not in the
//!    services.
//!
//! # Examples
//!
//! ```rust
//! use sober_core::db::{BrickStore, InMemoryStore};
//! use sober_core::models::NewBrick;
//! use chrono::Utc;
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//! let thesis = store
//!     .insert_brick(NewBrick::thesis("Title", "Content", "public"), Utc::now())
//!     .await?;
//! assert!(store.get_brick(thesis.id).await?.is_some());
//! # Ok::<(), anyhow::Error>(())
//! # }).unwrap();
//! ```

use crate::models::{Brick, BrickId, GroupId, NewBrick, NewVote, UserId, Vote, VoteId};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Abstraction over brick, vote and group-membership persistence
///
/// Implementations must be `Send + Sync` so services can be shared across tasks.
#[async_trait]
pub trait BrickStore: Send + Sync {
    //
    // BRICKS
    //

    /// Persist a new brick, assigning its id
    ///
    /// `created_at` is used for both timestamps. The record is stored as given;
    /// validation and group propagation are the caller's job.
    async fn insert_brick(&self, brick: NewBrick, created_at: DateTime<Utc>) -> Result<Brick>;

    /// Get brick by id, `Ok(None)` when it does not exist
    async fn get_brick(&self, id: BrickId) -> Result<Option<Brick>>;

    /// Direct children of a brick, in no particular order
    async fn get_children(&self, parent_id: BrickId) -> Result<Vec<Brick>>;

    /// Replace the stored record with `brick` (matched by id)
    async fn update_brick(&self, brick: Brick) -> Result<Brick>;

    /// All bricks of type thesis, in no particular order
    async fn list_theses(&self) -> Result<Vec<Brick>>;

    //
    // VOTES
    //

    /// Vote of `voter_id` on `brick_id`, if any
    async fn get_vote(&self, brick_id: BrickId, voter_id: UserId) -> Result<Option<Vote>>;

    /// Insert a vote; must fail if (voter, brick) already has one
    async fn insert_vote(&self, vote: NewVote) -> Result<Vote>;

    /// Overwrite the value of an existing vote
    async fn update_vote_value(&self, id: VoteId, value: f64) -> Result<Vote>;

    /// All votes on a brick
    async fn get_votes(&self, brick_id: BrickId) -> Result<Vec<Vote>>;

    /// Recompute the mean of all votes on a brick and store it as its cached average
    ///
    /// Reading the votes and writing the average must be one atomic step, so
    /// concurrent voters can never leave an average that misses a stored vote.
    /// Returns the new average (0 when there are no votes).
    async fn recompute_cached_avg_vote(&self, brick_id: BrickId) -> Result<f64>;

    //
    // GROUPS
    //

    /// Groups a user is a member of
    async fn get_user_groups(&self, user_id: UserId) -> Result<BTreeSet<GroupId>>;
}
