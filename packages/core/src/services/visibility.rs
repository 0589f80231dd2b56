//! Group Visibility
//!
//! A tree is visible to a caller when the caller belongs to the tree's
//! associated group or to one of its additional groups. Only roots are
//! checked: responses carry the same groups as their thesis, copied at
//! creation time.

use crate::config::SoberConfig;
use crate::db::BrickStore;
use crate::models::{Brick, GroupId, UserId};
use crate::services::BrickServiceError;
use std::collections::BTreeSet;

/// Whether a caller holding `caller_groups` may see `brick`
pub fn is_visible(brick: &Brick, caller_groups: &BTreeSet<GroupId>) -> bool {
    caller_groups.contains(&brick.associated_group)
        || brick
            .additional_groups
            .iter()
            .any(|g| caller_groups.contains(g))
}

/// Groups of the caller: the public group when anonymous, memberships otherwise
pub async fn resolve_caller_groups(
    store: &dyn BrickStore,
    user_id: Option<UserId>,
    config: &SoberConfig,
) -> Result<BTreeSet<GroupId>, BrickServiceError> {
    match user_id {
        None => Ok(BTreeSet::from([config.public_group.clone()])),
        Some(user_id) => Ok(store.get_user_groups(user_id).await?),
    }
}
