//! Data Models
//!
//! - `Brick` - persisted discussion unit (thesis or typed response)
//! - `BrickType` - closed set of brick types with their presentation data
//! - `Vote` - one user's rating of one brick

mod brick;
mod brick_type;
mod vote;


pub use brick::{
    Brick, BrickEdit, BrickId, GroupId, NewBrick, UserId, ValidationError, MAX_CONTENT_LEN,
    MAX_REFERENCES_LEN, MAX_TAGS_LEN, MAX_TITLE_LEN,
};
pub use brick_type::{BrickType, BrickTypeInfo, VoteCriterion};
pub use vote::{average_vote, validate_vote_value, NewVote, Vote, VoteId, MAX_VOTE_VALUE, MIN_VOTE_VALUE};
