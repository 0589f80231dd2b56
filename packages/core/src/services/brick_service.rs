//! Brick Service - discussion operations
//!
//! This module provides the business logic layer used by the web views:
//!
//! - Tree rendering (materialization with the configured default depth)
//! - Brick creation with group propagation, and editing
//! - Voting
//! - The group-filtered thesis index
//! - An integrity sweep for operators
//!
//! # Group Propagation
//!
//! A thesis is created with its groups. Every response copies
//! `associated_group` and `additional_groups` from the root thesis of its
//! tree, whatever the request says and whoever creates it. This keeps the
//! visibility check at the root sufficient for the whole tree.

use crate::config::SoberConfig;
use crate::db::BrickStore;
use crate::models::{
    Brick, BrickEdit, BrickId, BrickType, GroupId, NewBrick, UserId, ValidationError,
};
use crate::services::visibility::{is_visible, resolve_caller_groups};
use crate::services::{vote_aggregator, BrickServiceError};
use crate::tree::{BrickTree, DepthBound, MaterializedBrick, TreeMaterializer};
use chrono::Utc;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Structural problem found by [`BrickService::check_integrity`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub brick_id: BrickId,
    pub description: String,
}

/// Discussion service
///
/// Cheap to clone; clones share the store.
///
/// # Examples
///
/// ```rust
/// use sober_core::db::InMemoryStore;
/// use sober_core::models::{BrickType, NewBrick};
/// use sober_core::services::BrickService;
/// use sober_core::tree::{DepthBound, IncludedIds};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let service = BrickService::new(Arc::new(InMemoryStore::new()));
/// let thesis = service
///     .create_brick(NewBrick::thesis("Title", "Content", "public"))
///     .await?;
/// let pro = service
///     .create_brick(NewBrick::response(BrickType::Pro, thesis.id, "Yes", "..."))
///     .await?;
///
/// let tree = service.render(thesis.id).await?;
/// let views = tree.subtree(thesis.id, DepthBound::Unbounded, &IncludedIds::All)?;
/// assert_eq!(views.len(), 2);
/// assert_eq!(views[1].node.title_tag, format!("Thesis#{}✓1", thesis.id));
/// # let _ = pro;
/// # Ok::<(), sober_core::services::BrickServiceError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct BrickService {
    store: Arc<dyn BrickStore>,
    config: SoberConfig,
}

impl BrickService {
    /// Create a service with default settings
    pub fn new(store: Arc<dyn BrickStore>) -> Self {
        Self {
            store,
            config: SoberConfig::default(),
        }
    }

    /// Create a service with validated settings
    pub fn with_config(
        store: Arc<dyn BrickStore>,
        config: SoberConfig,
    ) -> Result<Self, BrickServiceError> {
        config
            .validate()
            .map_err(BrickServiceError::invalid_config)?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &Arc<dyn BrickStore> {
        &self.store
    }

    pub fn config(&self) -> &SoberConfig {
        &self.config
    }

    /// Display name of a brick type in the configured language
    pub fn type_label(&self, brick_type: BrickType) -> &'static str {
        brick_type.localized_name(&self.config.language)
    }

    /// Label of the criterion votes on `brick_type` are judged by, in the configured language
    pub fn vote_criterion_label(&self, brick_type: BrickType) -> &'static str {
        brick_type
            .vote_criterion()
            .localized_label(&self.config.language)
    }

    fn materializer(&self) -> TreeMaterializer<'_> {
        TreeMaterializer::new(self.store.as_ref())
            .with_max_ancestor_hops(self.config.max_ancestor_hops)
    }

    /// Depth used by [`render`](Self::render)
    pub fn default_bound(&self) -> DepthBound {
        DepthBound::Relative(self.config.max_relative_level)
    }

    pub async fn get_brick(&self, id: BrickId) -> Result<Brick, BrickServiceError> {
        self.store
            .get_brick(id)
            .await?
            .ok_or_else(|| BrickServiceError::not_found(id))
    }

    /// Materialize the tree containing `entry_id`
    pub async fn materialize(
        &self,
        entry_id: BrickId,
        bound: DepthBound,
    ) -> Result<BrickTree, BrickServiceError> {
        self.materializer().materialize(entry_id, bound).await
    }

    /// Materialize the tree around `base_id` with the configured default depth
    pub async fn render(&self, base_id: BrickId) -> Result<BrickTree, BrickServiceError> {
        self.materialize(base_id, self.default_bound()).await
    }

    /// Like [`render`](Self::render), but refuses trees the caller may not see
    pub async fn render_for(
        &self,
        base_id: BrickId,
        caller_groups: &BTreeSet<GroupId>,
    ) -> Result<BrickTree, BrickServiceError> {
        let tree = self.render(base_id).await?;
        let visible = tree
            .root()
            .is_some_and(|root| is_visible(&root.brick, caller_groups));
        if !visible {
            return Err(BrickServiceError::permission_denied(base_id));
        }
        Ok(tree)
    }

    /// Groups of the caller (`None` = anonymous)
    pub async fn caller_groups(
        &self,
        user_id: Option<UserId>,
    ) -> Result<BTreeSet<GroupId>, BrickServiceError> {
        resolve_caller_groups(self.store.as_ref(), user_id, &self.config).await
    }

    /// Create a thesis or a response
    ///
    /// Responses take their groups from the root thesis of the parent's tree.
    ///
    /// # Errors
    ///
    /// - `Validation` for field limits or a type/parent mismatch
    /// - `NotFound` if the parent does not exist
    /// - `DataIntegrity` if the parent's tree is broken
    pub async fn create_brick(&self, mut brick: NewBrick) -> Result<Brick, BrickServiceError> {
        brick.validate()?;

        if let Some(parent_id) = brick.parent_id {
            let parent = self
                .store
                .get_brick(parent_id)
                .await?
                .ok_or_else(|| BrickServiceError::not_found(parent_id))?;
            let (root, _) = self.materializer().resolve_root(parent).await?;

            brick.associated_group = root.associated_group;
            brick.additional_groups = root.additional_groups;
        }

        let created = self.store.insert_brick(brick, Utc::now()).await?;
        tracing::debug!("Created {}", created);
        Ok(created)
    }

    /// Create a response from a two-letter type code (`pa`, `ca`, `co`, `qu`, `is`)
    pub async fn create_response(
        &self,
        parent_id: BrickId,
        type_code: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        creator_id: Option<UserId>,
    ) -> Result<Brick, BrickServiceError> {
        let brick_type = BrickType::from_code(type_code)?;
        if brick_type.is_thesis() {
            return Err(ValidationError::ThesisWithParent { parent_id }.into());
        }

        let mut brick = NewBrick::response(brick_type, parent_id, title, content);
        brick.creator_id = creator_id;
        self.create_brick(brick).await
    }

    /// Edit title, content, tags or references and bump `updated_at`
    pub async fn edit_brick(
        &self,
        id: BrickId,
        edit: BrickEdit,
    ) -> Result<Brick, BrickServiceError> {
        edit.validate()?;

        let mut brick = self.get_brick(id).await?;
        edit.apply_to(&mut brick);
        brick.updated_at = Utc::now();

        Ok(self.store.update_brick(brick).await?)
    }

    /// Record a vote and return the brick's new average
    pub async fn record_vote(
        &self,
        brick_id: BrickId,
        voter_id: UserId,
        value: f64,
    ) -> Result<f64, BrickServiceError> {
        vote_aggregator::record_vote(self.store.as_ref(), brick_id, voter_id, value).await
    }

    /// Theses the caller may see, most recently updated first
    ///
    /// Each thesis is materialized at level 0 only, which is enough for the
    /// index to show its title tag and per-type response counts.
    pub async fn list_visible_theses(
        &self,
        caller_groups: &BTreeSet<GroupId>,
    ) -> Result<Vec<MaterializedBrick>, BrickServiceError> {
        let mut theses = self.store.list_theses().await?;
        theses.retain(|t| is_visible(t, caller_groups));
        theses.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let mut listing = Vec::with_capacity(theses.len());
        for thesis in theses {
            let tree = self.materialize(thesis.id, DepthBound::Absolute(0)).await?;
            let root_id = tree.root_id();
            let root = tree
                .into_brick(root_id)
                .ok_or_else(|| BrickServiceError::not_in_tree(root_id))?;
            listing.push(root);
        }

        Ok(listing)
    }

    /// Report every structural problem below `root_id` without repairing anything
    ///
    /// Checks the thesis/parent rule, that responses carry the groups of the
    /// root thesis, and that no brick is reached twice.
    pub async fn check_integrity(
        &self,
        root_id: BrickId,
    ) -> Result<Vec<IntegrityIssue>, BrickServiceError> {
        let root = self.get_brick(root_id).await?;
        let mut issues = Vec::new();
        let mut seen: HashSet<BrickId> = HashSet::new();
        let mut stack = vec![root.clone()];

        while let Some(brick) = stack.pop() {
            if !seen.insert(brick.id) {
                issues.push(IntegrityIssue {
                    brick_id: brick.id,
                    description: format!("brick {} reached more than once", brick.id),
                });
                continue;
            }

            if let Some(violation) = brick.structure_violation() {
                issues.push(IntegrityIssue {
                    brick_id: brick.id,
                    description: violation,
                });
            }

            if brick.id != root.id
                && (brick.associated_group != root.associated_group
                    || brick.additional_groups != root.additional_groups)
            {
                issues.push(IntegrityIssue {
                    brick_id: brick.id,
                    description: format!(
                        "brick {} groups differ from root thesis {}",
                        brick.id, root.id
                    ),
                });
            }

            stack.extend(self.store.get_children(brick.id).await?);
        }

        for issue in &issues {
            tracing::warn!("Integrity issue in tree {}: {}", root_id, issue.description);
        }

        Ok(issues)
    }
}
