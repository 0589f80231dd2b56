//! Brick Tree Tests
//!
//! Materialization and subtree extraction against the in-memory store:
//! typed indices, title tags, depth bounds, indentation, filtering and
//! integrity failures.

#[cfg(test)]
mod brick_tree_tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use sober_core::db::{BrickStore, InMemoryStore};
    use sober_core::models::{Brick, BrickId, BrickType, NewBrick};
    use sober_core::services::{BrickService, BrickServiceError};
    use sober_core::tree::{DepthBound, IncludedIds, TreeMaterializer};
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Arc;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    /// Brick record with fixed id and creation time
    fn brick(id: BrickId, brick_type: BrickType, parent_id: Option<BrickId>, minute: i64) -> Brick {
        Brick {
            id,
            brick_type,
            title: format!("{} {}", brick_type, id),
            content: String::new(),
            tags: None,
            references: None,
            created_at: at(minute),
            updated_at: at(minute),
            parent_id,
            associated_group: "public".to_string(),
            additional_groups: BTreeSet::new(),
            cached_avg_vote: 0.0,
            creator_id: None,
        }
    }

    async fn store_with(bricks: Vec<Brick>) -> InMemoryStore {
        sober_core::logging::init_logging("debug");
        let store = InMemoryStore::new();
        for b in bricks {
            store.insert_raw(b).await;
        }
        store
    }

    /// T1 with P1 (t=1), C1 (t=2), P2 (t=3)
    async fn scenario_store() -> InMemoryStore {
        store_with(vec![
            brick(1, BrickType::Thesis, None, 0),
            brick(2, BrickType::Pro, Some(1), 1),
            brick(3, BrickType::Contra, Some(1), 2),
            brick(4, BrickType::Pro, Some(1), 3),
        ])
        .await
    }

    /// T1 -> P2 -> C3 -> Q4, plus T1 -> Co5
    async fn chain_store() -> InMemoryStore {
        store_with(vec![
            brick(1, BrickType::Thesis, None, 0),
            brick(2, BrickType::Pro, Some(1), 1),
            brick(3, BrickType::Contra, Some(2), 2),
            brick(4, BrickType::Question, Some(3), 3),
            brick(5, BrickType::Comment, Some(1), 4),
        ])
        .await
    }

    // ========================================================================
    // Typed index and title tags
    // ========================================================================

    #[tokio::test]
    async fn test_typed_idx_and_tags_follow_creation_order() {
        let store = scenario_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        let t1 = tree.get(1).unwrap();
        let p1 = tree.get(2).unwrap();
        let c1 = tree.get(3).unwrap();
        let p2 = tree.get(4).unwrap();

        assert_eq!(t1.typed_idx, None);
        assert_eq!(p1.typed_idx, Some(1));
        assert_eq!(p2.typed_idx, Some(2));
        assert_eq!(c1.typed_idx, Some(1));

        assert_eq!(t1.title_tag, "Thesis#1");
        assert_eq!(p1.title_tag, "Thesis#1✓1");
        assert_eq!(c1.title_tag, "Thesis#1⚡1");
        assert_eq!(p2.title_tag, "Thesis#1✓2");

        assert_eq!(t1.child_histogram.count(BrickType::Pro), 2);
        assert_eq!(t1.child_histogram.count(BrickType::Contra), 1);
        assert_eq!(t1.child_histogram.total(), 3);
    }

    #[tokio::test]
    async fn test_typed_idx_ignores_update_time_and_votes() {
        let mut late_pro = brick(2, BrickType::Pro, Some(1), 1);
        late_pro.updated_at = at(100);
        let mut popular_pro = brick(3, BrickType::Pro, Some(1), 2);
        popular_pro.cached_avg_vote = 2.0;
        let store = store_with(vec![brick(1, BrickType::Thesis, None, 0), late_pro, popular_pro]).await;

        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        assert_eq!(tree.get(2).unwrap().typed_idx, Some(1));
        assert_eq!(tree.get(3).unwrap().typed_idx, Some(2));
        // presentation order puts the higher-rated pro first
        let order: Vec<_> = tree.get(1).unwrap().direct_children.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_materialization_is_idempotent() {
        let store = chain_store().await;
        let materializer = TreeMaterializer::new(&store);

        let first = materializer.materialize(1, DepthBound::Unbounded).await.unwrap();
        let second = materializer.materialize(3, DepthBound::Unbounded).await.unwrap();

        assert_eq!(first.len(), second.len());
        for node in first.iter() {
            let other = second.get(node.id()).unwrap();
            assert_eq!(node.typed_idx, other.typed_idx);
            assert_eq!(node.title_tag, other.title_tag);
        }
    }

    #[tokio::test]
    async fn test_title_tags_are_unique() {
        let mut bricks = vec![brick(1, BrickType::Thesis, None, 0)];
        let mut next_id = 2;
        for parent in [1, 2, 3] {
            for brick_type in [BrickType::Pro, BrickType::Contra, BrickType::Pro, BrickType::Question] {
                bricks.push(brick(next_id, brick_type, Some(parent), next_id));
                next_id += 1;
            }
        }
        let store = store_with(bricks).await;

        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();
        let tags: HashSet<&str> = tree.iter().map(|n| n.title_tag.as_str()).collect();

        assert_eq!(tree.len(), 13);
        assert_eq!(tags.len(), tree.len());
    }

    #[tokio::test]
    async fn test_deep_entry_gets_full_tag_path() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(4, DepthBound::Relative(0))
            .await
            .unwrap();

        assert_eq!(tree.root_id(), 1);
        assert_eq!(tree.entry_level(), 3);
        let question = tree.get(4).unwrap();
        assert_eq!(question.absolute_level, 3);
        assert_eq!(question.title_tag, "Thesis#1✓1⚡1?1");
        let ids: Vec<_> = question.tag_path.iter().map(|s| s.brick_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    // ========================================================================
    // Depth bounds
    // ========================================================================

    #[tokio::test]
    async fn test_level_zero_materializes_only_the_thesis() {
        let store = scenario_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Absolute(0))
            .await
            .unwrap();

        assert_eq!(tree.len(), 1);
        assert!(tree.contains(1));

        // children beyond the bound are still counted and listed
        let root = tree.root().unwrap();
        assert_eq!(root.child_histogram.total(), 3);
        assert_eq!(root.direct_children.len(), 3);

        let views = tree.subtree(1, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn test_relative_bound_counts_from_entry() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(2, DepthBound::Relative(1))
            .await
            .unwrap();

        // entry is at level 1, so levels 0..=2 are materialized
        assert!(tree.contains(1));
        assert!(tree.contains(2));
        assert!(tree.contains(3));
        assert!(tree.contains(5));
        assert!(!tree.contains(4));
        assert_eq!(tree.get(3).unwrap().child_histogram.count(BrickType::Question), 1);
    }

    #[tokio::test]
    async fn test_subtree_respects_depth_bound() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        for bound in 0..4 {
            let views = tree
                .subtree(2, DepthBound::Relative(bound), &IncludedIds::All)
                .unwrap();
            assert!(views.iter().all(|v| v.relative_level <= bound));
            assert_eq!(views.len() as u32, (bound + 1).min(3));
        }

        let views = tree
            .subtree(1, DepthBound::Absolute(1), &IncludedIds::All)
            .unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![1, 2, 5]);
    }

    #[tokio::test]
    async fn test_subtree_prunes_unmaterialized_branches() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Absolute(1))
            .await
            .unwrap();

        let views = tree.subtree(1, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![1, 2, 5]);
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    #[tokio::test]
    async fn test_subtree_is_depth_first_in_presentation_order() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        let views = tree.subtree(1, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id()).collect();
        // pro branch first (rank 2), comment last (rank 4)
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_thesis_responses_are_not_indented() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        let views = tree.subtree(1, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        let indent: Vec<_> = views.iter().map(|v| (v.id(), v.relative_level, v.indentation)).collect();
        assert_eq!(
            indent,
            vec![(1, 0, 0), (2, 1, 0), (3, 2, 1), (4, 3, 2), (5, 1, 0)]
        );
        assert_eq!(views[2].indentation_class(), "ml1");
    }

    #[tokio::test]
    async fn test_non_thesis_base_indents_by_relative_level() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap();

        let views = tree.subtree(2, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        let indent: Vec<_> = views.iter().map(|v| (v.id(), v.indentation)).collect();
        assert_eq!(indent, vec![(2, 0), (3, 1), (4, 2)]);
    }

    #[tokio::test]
    async fn test_included_ids_keep_base_and_listed_children() {
        let store = scenario_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Relative(1))
            .await
            .unwrap();

        let views = tree
            .subtree(1, DepthBound::Relative(1), &IncludedIds::only([4]))
            .unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_subtree_of_unknown_base_fails() {
        let store = chain_store().await;
        let tree = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Absolute(0))
            .await
            .unwrap();

        let err = tree
            .subtree(2, DepthBound::Unbounded, &IncludedIds::All)
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::NotInTree { id: 2 }));
    }

    #[tokio::test]
    async fn test_subtree_does_not_read_the_store() {
        let store = Arc::new(chain_store().await);
        let service = BrickService::new(store.clone());
        let tree = service.materialize(1, DepthBound::Unbounded).await.unwrap();

        store
            .insert_brick(NewBrick::response(BrickType::Pro, 1, "late", ""), Utc::now())
            .await
            .unwrap();

        let views = tree.subtree(1, DepthBound::Unbounded, &IncludedIds::All).unwrap();
        assert_eq!(views.len(), 5);
    }

    // ========================================================================
    // Failures
    // ========================================================================

    #[tokio::test]
    async fn test_missing_entry_is_not_found() {
        let store = chain_store().await;
        let err = TreeMaterializer::new(&store)
            .materialize(42, DepthBound::Unbounded)
            .await
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::NotFound { id: 42 }));
    }

    #[tokio::test]
    async fn test_thesis_with_parent_is_integrity_error() {
        let store = store_with(vec![
            brick(1, BrickType::Thesis, None, 0),
            brick(2, BrickType::Thesis, Some(1), 1),
        ])
        .await;

        let err = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn test_orphan_response_is_integrity_error() {
        let store = store_with(vec![brick(1, BrickType::Pro, None, 0)]).await;

        let err = TreeMaterializer::new(&store)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn test_dangling_parent_is_integrity_error() {
        let store = store_with(vec![brick(2, BrickType::Pro, Some(99), 0)]).await;

        let err = TreeMaterializer::new(&store)
            .materialize(2, DepthBound::Unbounded)
            .await
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::DataIntegrity(msg) if msg.contains("99")));
    }

    #[tokio::test]
    async fn test_parent_cycle_is_integrity_error() {
        let store = store_with(vec![
            brick(1, BrickType::Pro, Some(2), 0),
            brick(2, BrickType::Contra, Some(1), 1),
        ])
        .await;

        let err = TreeMaterializer::new(&store)
            .with_max_ancestor_hops(16)
            .materialize(1, DepthBound::Unbounded)
            .await
            .unwrap_err();
        assert!(matches!(err, BrickServiceError::DataIntegrity(msg) if msg.contains("16 hops")));
    }
}
