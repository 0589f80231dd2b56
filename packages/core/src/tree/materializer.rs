//! Tree Materialization
//!
//! [`TreeMaterializer::materialize`] turns the flat, parent-linked bricks of one
//! discussion into a [`BrickTree`]: an arena of [`MaterializedBrick`]s keyed by
//! brick id, annotated with depth, typed index, title tag and child counts.
//!
//! # Algorithm
//!
//! 1. Follow parent references from the entry brick to the root thesis,
//!    counting hops (the entry brick's absolute level).
//! 2. Walk the tree depth-first in pre-order from the root. For every brick:
//!    - children are sorted chronologically `(created_at, type, id)` and each
//!      gets its 1-based index among same-typed siblings (`typed_idx`);
//!    - the child-type histogram and the title tag are computed;
//!    - children are visited in presentation order
//!      `(type rank, cached vote desc, updated_at desc, id)`, which is also the
//!      order stored in `direct_children`.
//! 3. Bricks beyond the depth bound are not visited. Bricks at the bound still
//!    list and count their children.
//!
//! The walk uses an explicit stack, so a parent is always finalized before any
//! of its children and each brick is annotated exactly once per pass.

use crate::db::BrickStore;
use crate::models::{Brick, BrickId, BrickType};
use crate::services::BrickServiceError;
use crate::tree::depth::{within, DepthBound};
use crate::tree::title_tag::{child_path, render_title_tag, root_segment, TagSegment};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Parent chains longer than this are treated as cycles
pub const DEFAULT_MAX_ANCESTOR_HOPS: u32 = 256;

/// Number of direct children per brick type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChildTypeHistogram {
    counts: [u32; 6],
}

impl ChildTypeHistogram {
    pub fn count(&self, brick_type: BrickType) -> u32 {
        self.counts[brick_type.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Non-zero counts in registry order
    pub fn iter(&self) -> impl Iterator<Item = (BrickType, u32)> + '_ {
        BrickType::ALL
            .iter()
            .map(|t| (*t, self.count(*t)))
            .filter(|(_, n)| *n > 0)
    }

    /// Count one more child of `brick_type`, returning the new count
    fn increment(&mut self, brick_type: BrickType) -> u32 {
        let slot = &mut self.counts[brick_type.index()];
        *slot += 1;
        *slot
    }
}

/// Reference to a direct child in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildEntry {
    pub id: BrickId,
    pub brick_type: BrickType,
}

/// A brick annotated by one materialization pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedBrick {
    pub brick: Brick,
    /// Depth below the root thesis
    pub absolute_level: u32,
    /// 1-based index among same-typed siblings; `None` for the root thesis
    pub typed_idx: Option<u32>,
    pub child_histogram: ChildTypeHistogram,
    pub tag_path: Vec<TagSegment>,
    pub title_tag: String,
    /// Direct children in presentation order (including unvisited ones at the bound)
    pub direct_children: Vec<ChildEntry>,
}

impl MaterializedBrick {
    pub fn id(&self) -> BrickId {
        self.brick.id
    }

    pub fn brick_type(&self) -> BrickType {
        self.brick.brick_type
    }

    pub fn children_of_type(&self, brick_type: BrickType) -> Vec<BrickId> {
        self.direct_children
            .iter()
            .filter(|c| c.brick_type == brick_type)
            .map(|c| c.id)
            .collect()
    }

    pub fn children_pro(&self) -> Vec<BrickId> {
        self.children_of_type(BrickType::Pro)
    }

    pub fn children_contra(&self) -> Vec<BrickId> {
        self.children_of_type(BrickType::Contra)
    }

    /// Children that are neither pro nor contra
    pub fn children_rest(&self) -> Vec<BrickId> {
        self.direct_children
            .iter()
            .filter(|c| !matches!(c.brick_type, BrickType::Pro | BrickType::Contra))
            .map(|c| c.id)
            .collect()
    }
}

/// Result of one materialization pass
///
/// Owns every [`MaterializedBrick`] of the pass. Lookups go through the brick
/// id, never through object identity.
#[derive(Debug, Clone)]
pub struct BrickTree {
    root_id: BrickId,
    entry_id: BrickId,
    entry_level: u32,
    nodes: HashMap<BrickId, MaterializedBrick>,
    visit_order: Vec<BrickId>,
}

impl BrickTree {
    pub fn root_id(&self) -> BrickId {
        self.root_id
    }

    pub fn entry_id(&self) -> BrickId {
        self.entry_id
    }

    /// Absolute level of the entry brick
    pub fn entry_level(&self) -> u32 {
        self.entry_level
    }

    pub fn get(&self, id: BrickId) -> Option<&MaterializedBrick> {
        self.nodes.get(&id)
    }

    pub fn root(&self) -> Option<&MaterializedBrick> {
        self.get(self.root_id)
    }

    pub fn contains(&self, id: BrickId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Materialized bricks in visit (pre-)order
    pub fn iter(&self) -> impl Iterator<Item = &MaterializedBrick> + '_ {
        self.visit_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Take one brick out of the tree, dropping the rest
    pub fn into_brick(mut self, id: BrickId) -> Option<MaterializedBrick> {
        self.nodes.remove(&id)
    }

    fn insert(&mut self, node: MaterializedBrick) {
        self.visit_order.push(node.id());
        self.nodes.insert(node.id(), node);
    }
}

/// Builds [`BrickTree`]s from a [`BrickStore`]
pub struct TreeMaterializer<'a> {
    store: &'a dyn BrickStore,
    max_ancestor_hops: u32,
}

impl<'a> TreeMaterializer<'a> {
    pub fn new(store: &'a dyn BrickStore) -> Self {
        Self {
            store,
            max_ancestor_hops: DEFAULT_MAX_ANCESTOR_HOPS,
        }
    }

    pub fn with_max_ancestor_hops(mut self, hops: u32) -> Self {
        self.max_ancestor_hops = hops;
        self
    }

    /// Materialize the whole tree containing `entry_id`, down to `bound`
    ///
    /// A relative bound is counted from the entry brick.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the entry brick does not exist
    /// - `DataIntegrity` for any structural violation met on the way
    /// - `Store` for backend failures
    pub async fn materialize(
        &self,
        entry_id: BrickId,
        bound: DepthBound,
    ) -> Result<BrickTree, BrickServiceError> {
        let entry = self
            .store
            .get_brick(entry_id)
            .await?
            .ok_or_else(|| BrickServiceError::not_found(entry_id))?;

        let (root, entry_level) = self.resolve_root(entry).await?;
        let max_level = bound.max_absolute_level(entry_level);

        let mut tree = BrickTree {
            root_id: root.id,
            entry_id,
            entry_level,
            nodes: HashMap::new(),
            visit_order: Vec::new(),
        };

        // typed indices are assigned while processing the parent, before the child is visited
        let mut typed_indices: HashMap<BrickId, u32> = HashMap::new();
        let mut stack: Vec<(Brick, u32)> = vec![(root, 0)];

        while let Some((brick, level)) = stack.pop() {
            if tree.contains(brick.id) {
                continue;
            }
            ensure_structure(&brick)?;

            let mut children = self.store.get_children(brick.id).await?;
            children.sort_by(chronological_order);
            children.dedup_by_key(|c| c.id);

            let mut histogram = ChildTypeHistogram::default();
            for child in &children {
                if child.parent_id != Some(brick.id) {
                    return Err(BrickServiceError::data_integrity(format!(
                        "brick {} listed as child of {} but references parent {:?}",
                        child.id, brick.id, child.parent_id
                    )));
                }
                let idx = histogram.increment(child.brick_type);
                typed_indices.insert(child.id, idx);
            }

            let typed_idx = typed_indices.get(&brick.id).copied();
            let tag_path = self.tag_path_for(&tree, &brick, typed_idx)?;
            let title_tag = render_title_tag(&tag_path);

            children.sort_by(presentation_order);
            let direct_children = children
                .iter()
                .map(|c| ChildEntry {
                    id: c.id,
                    brick_type: c.brick_type,
                })
                .collect();

            if within(level + 1, max_level) {
                // reversed so the first child in presentation order is popped first
                stack.extend(children.into_iter().rev().map(|c| (c, level + 1)));
            }

            tree.insert(MaterializedBrick {
                brick,
                absolute_level: level,
                typed_idx,
                child_histogram: histogram,
                tag_path,
                title_tag,
                direct_children,
            });
        }

        tracing::debug!(
            "Materialized {} brick(s) of tree {} (entry {}, level {}, max level {:?})",
            tree.len(),
            tree.root_id,
            entry_id,
            entry_level,
            max_level
        );

        Ok(tree)
    }

    /// Follow parent references up to the root thesis
    ///
    /// Returns the root and the number of hops taken.
    pub async fn resolve_root(&self, start: Brick) -> Result<(Brick, u32), BrickServiceError> {
        let mut current = start;
        let mut hops: u32 = 0;

        loop {
            ensure_structure(&current)?;
            let Some(parent_id) = current.parent_id else {
                return Ok((current, hops));
            };

            hops += 1;
            if hops > self.max_ancestor_hops {
                return Err(BrickServiceError::data_integrity(format!(
                    "parent chain above brick {} exceeds {} hops (cycle?)",
                    current.id, self.max_ancestor_hops
                )));
            }

            let child_id = current.id;
            current = self.store.get_brick(parent_id).await?.ok_or_else(|| {
                BrickServiceError::data_integrity(format!(
                    "brick {} references missing parent {}",
                    child_id, parent_id
                ))
            })?;
        }
    }

    fn tag_path_for(
        &self,
        tree: &BrickTree,
        brick: &Brick,
        typed_idx: Option<u32>,
    ) -> Result<Vec<TagSegment>, BrickServiceError> {
        let Some(parent_id) = brick.parent_id else {
            return Ok(vec![root_segment(brick.id)]);
        };

        let parent = tree.get(parent_id).ok_or_else(|| {
            BrickServiceError::data_integrity(format!(
                "parent {} of brick {} was not materialized before it",
                parent_id, brick.id
            ))
        })?;
        let typed_idx = typed_idx.ok_or_else(|| {
            BrickServiceError::data_integrity(format!(
                "brick {} was reached without being listed by its parent {}",
                brick.id, parent_id
            ))
        })?;

        Ok(child_path(
            &parent.tag_path,
            brick.brick_type,
            typed_idx,
            brick.id,
        ))
    }
}

/// Thesis has no parent, everything else has one
fn ensure_structure(brick: &Brick) -> Result<(), BrickServiceError> {
    match brick.structure_violation() {
        Some(violation) => Err(BrickServiceError::data_integrity(violation)),
        None => Ok(()),
    }
}

fn chronological_order(a: &Brick, b: &Brick) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.brick_type.numeric_code().cmp(&b.brick_type.numeric_code()))
        .then_with(|| a.id.cmp(&b.id))
}

fn presentation_order(a: &Brick, b: &Brick) -> Ordering {
    a.brick_type
        .rank()
        .cmp(&b.brick_type.rank())
        .then_with(|| b.cached_avg_vote.total_cmp(&a.cached_avg_vote))
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.id.cmp(&b.id))
}
