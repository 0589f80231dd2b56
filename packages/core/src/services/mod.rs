//! Business Services
//!
//! - `BrickService` - rendering, creation, editing, voting, thesis index, integrity sweep
//! - `vote_aggregator` - one-vote-per-user recording and average recomputation
//! - `visibility` - group-based visibility of discussion trees
//!
//! Services coordinate between the [`BrickStore`](crate::db::BrickStore) and the
//! tree engine in [`crate::tree`].

pub mod brick_service;
pub mod error;
pub mod visibility;
pub mod vote_aggregator;

pub use brick_service::{BrickService, IntegrityIssue};
pub use error::BrickServiceError;
pub use visibility::{is_visible, resolve_caller_groups};
pub use vote_aggregator::record_vote;
