//! Subtree extraction
//!
//! Produces the render list for one base brick from an existing [`BrickTree`].
//! Works on the arena alone; the store is never consulted.

use crate::models::{Brick, BrickId};
use crate::services::BrickServiceError;
use crate::tree::depth::{within, DepthBound};
use crate::tree::{BrickTree, MaterializedBrick};
use std::collections::HashSet;

/// Which bricks of a subtree end up in the render list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IncludedIds {
    #[default]
    All,
    /// Only these ids; the base brick is always added
    Only(HashSet<BrickId>),
}

impl IncludedIds {
    pub fn only<I: IntoIterator<Item = BrickId>>(ids: I) -> Self {
        IncludedIds::Only(ids.into_iter().collect())
    }

    fn admits(&self, id: BrickId, base_id: BrickId) -> bool {
        match self {
            IncludedIds::All => true,
            IncludedIds::Only(ids) => id == base_id || ids.contains(&id),
        }
    }
}

/// One entry of a render list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickView<'a> {
    pub node: &'a MaterializedBrick,
    /// Depth below the base brick
    pub relative_level: u32,
    pub indentation: u32,
}

impl<'a> BrickView<'a> {
    pub fn brick(&self) -> &'a Brick {
        &self.node.brick
    }

    pub fn id(&self) -> BrickId {
        self.node.brick.id
    }

    /// CSS class for the indentation bucket (`ml0`, `ml1`, ...)
    pub fn indentation_class(&self) -> String {
        format!("ml{}", self.indentation)
    }
}

impl BrickTree {
    /// Depth-first render list below `base_id`
    ///
    /// Children are taken in presentation order. A relative bound is counted
    /// from the base brick. Branches that go past the bound, or that were not
    /// materialized, are dropped whole. When the base is a thesis its direct
    /// responses share indentation 0 with it.
    ///
    /// # Errors
    ///
    /// `NotInTree` if `base_id` was not materialized.
    pub fn subtree(
        &self,
        base_id: BrickId,
        bound: DepthBound,
        included: &IncludedIds,
    ) -> Result<Vec<BrickView<'_>>, BrickServiceError> {
        let base = self
            .get(base_id)
            .ok_or_else(|| BrickServiceError::not_in_tree(base_id))?;
        let max_level = bound.max_absolute_level(base.absolute_level);
        let base_is_thesis = base.brick.is_thesis();

        let mut views = Vec::new();
        let mut stack = vec![base_id];

        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if !within(node.absolute_level, max_level) {
                continue;
            }

            stack.extend(node.direct_children.iter().rev().map(|c| c.id));

            if !included.admits(id, base_id) {
                continue;
            }

            let relative_level = node.absolute_level.saturating_sub(base.absolute_level);
            let indentation = if base_is_thesis {
                relative_level.saturating_sub(1)
            } else {
                relative_level
            };

            views.push(BrickView {
                node,
                relative_level,
                indentation,
            });
        }

        Ok(views)
    }
}
