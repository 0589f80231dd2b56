//! In-memory BrickStore
//!
//! Map-backed implementation of [`BrickStore`] guarded by a single tokio
//! `RwLock`. Vote insertion checks the (voter, brick) index and inserts under
//! the same write lock, which gives the uniqueness guarantee the services rely
//! on. The cached average is recomputed and written under one write lock too.

use crate::db::{BrickStore, StoreError};
use crate::models::{
    average_vote, Brick, BrickId, GroupId, NewBrick, NewVote, UserId, Vote, VoteId,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    bricks: HashMap<BrickId, Brick>,
    votes: HashMap<VoteId, Vote>,
    /// (voter, brick) -> vote id
    vote_index: HashMap<(UserId, BrickId), VoteId>,
    memberships: HashMap<UserId, BTreeSet<GroupId>>,
    next_brick_id: BrickId,
    next_vote_id: VoteId,
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully-formed record as-is, bypassing id assignment
    ///
    /// Used to load fixtures with fixed ids and timestamps. Nothing is
    /// validated, so this can also seed structurally broken data.
    pub async fn insert_raw(&self, brick: Brick) {
        let mut tables = self.tables.write().await;
        tables.next_brick_id = tables.next_brick_id.max(brick.id);
        tables.bricks.insert(brick.id, brick);
    }

    /// Make `user_id` a member of `group`
    pub async fn add_membership(&self, user_id: UserId, group: impl Into<GroupId>) {
        let mut tables = self.tables.write().await;
        tables
            .memberships
            .entry(user_id)
            .or_default()
            .insert(group.into());
    }

    pub async fn brick_count(&self) -> usize {
        self.tables.read().await.bricks.len()
    }

    pub async fn vote_count(&self) -> usize {
        self.tables.read().await.votes.len()
    }
}

#[async_trait]
impl BrickStore for InMemoryStore {
    async fn insert_brick(&self, brick: NewBrick, created_at: DateTime<Utc>) -> Result<Brick> {
        let mut tables = self.tables.write().await;
        tables.next_brick_id += 1;
        let record = Brick {
            id: tables.next_brick_id,
            brick_type: brick.brick_type,
            title: brick.title,
            content: brick.content,
            tags: brick.tags,
            references: brick.references,
            created_at,
            updated_at: created_at,
            parent_id: brick.parent_id,
            associated_group: brick.associated_group,
            additional_groups: brick.additional_groups,
            cached_avg_vote: 0.0,
            creator_id: brick.creator_id,
        };
        tables.bricks.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_brick(&self, id: BrickId) -> Result<Option<Brick>> {
        Ok(self.tables.read().await.bricks.get(&id).cloned())
    }

    async fn get_children(&self, parent_id: BrickId) -> Result<Vec<Brick>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bricks
            .values()
            .filter(|b| b.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn update_brick(&self, brick: Brick) -> Result<Brick> {
        let mut tables = self.tables.write().await;
        match tables.bricks.get_mut(&brick.id) {
            Some(slot) => {
                *slot = brick.clone();
                Ok(brick)
            }
            None => Err(StoreError::brick_not_found(brick.id).into()),
        }
    }

    async fn list_theses(&self) -> Result<Vec<Brick>> {
        let tables = self.tables.read().await;
        Ok(tables
            .bricks
            .values()
            .filter(|b| b.is_thesis())
            .cloned()
            .collect())
    }

    async fn get_vote(&self, brick_id: BrickId, voter_id: UserId) -> Result<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vote_index
            .get(&(voter_id, brick_id))
            .and_then(|id| tables.votes.get(id))
            .cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote> {
        let mut tables = self.tables.write().await;
        let key = (vote.voter_id, vote.brick_id);
        if tables.vote_index.contains_key(&key) {
            return Err(StoreError::duplicate_vote(vote.voter_id, vote.brick_id).into());
        }

        tables.next_vote_id += 1;
        let record = Vote {
            id: tables.next_vote_id,
            voter_id: vote.voter_id,
            brick_id: vote.brick_id,
            value: vote.value,
        };
        tables.vote_index.insert(key, record.id);
        tables.votes.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_vote_value(&self, id: VoteId, value: f64) -> Result<Vote> {
        let mut tables = self.tables.write().await;
        let vote = tables
            .votes
            .get_mut(&id)
            .ok_or_else(|| StoreError::vote_not_found(id))?;
        vote.value = value;
        Ok(vote.clone())
    }

    async fn get_votes(&self, brick_id: BrickId) -> Result<Vec<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .values()
            .filter(|v| v.brick_id == brick_id)
            .cloned()
            .collect())
    }

    async fn recompute_cached_avg_vote(&self, brick_id: BrickId) -> Result<f64> {
        let mut tables = self.tables.write().await;
        let average = average_vote(tables.votes.values().filter(|v| v.brick_id == brick_id));

        let brick = tables
            .bricks
            .get_mut(&brick_id)
            .ok_or_else(|| StoreError::brick_not_found(brick_id))?;
        brick.cached_avg_vote = average;
        Ok(average)
    }

    async fn get_user_groups(&self, user_id: UserId) -> Result<BTreeSet<GroupId>> {
        let tables = self.tables.read().await;
        Ok(tables.memberships.get(&user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BrickType;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let a = store
            .insert_brick(NewBrick::thesis("A", "a", "public"), now)
            .await
            .unwrap();
        let b = store
            .insert_brick(NewBrick::response(BrickType::Pro, a.id, "B", "b"), now)
            .await
            .unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.created_at, b.updated_at);
        assert_eq!(store.brick_count().await, 2);
    }

    #[tokio::test]
    async fn test_children_lookup() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let root = store
            .insert_brick(NewBrick::thesis("A", "a", "public"), now)
            .await
            .unwrap();
        let child = store
            .insert_brick(NewBrick::response(BrickType::Contra, root.id, "C", "c"), now)
            .await
            .unwrap();

        let children = store.get_children(root.id).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
        assert!(store.get_children(child.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_raw_insert_moves_id_sequence_forward() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let fixture = store
            .insert_brick(NewBrick::thesis("A", "a", "public"), now)
            .await
            .unwrap();
        store
            .insert_raw(Brick {
                id: 10,
                ..fixture
            })
            .await;

        let next = store
            .insert_brick(NewBrick::thesis("B", "b", "public"), now)
            .await
            .unwrap();
        assert_eq!(next.id, 11);
    }

    #[tokio::test]
    async fn test_duplicate_vote_is_rejected() {
        let store = InMemoryStore::new();
        let vote = NewVote {
            voter_id: 1,
            brick_id: 1,
            value: 1.0,
        };
        store.insert_vote(vote.clone()).await.unwrap();

        let err = store.insert_vote(vote).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::duplicate_vote(1, 1))
        );
        assert_eq!(store.vote_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_missing_records_fails() {
        let store = InMemoryStore::new();
        assert!(store.update_vote_value(5, 1.0).await.is_err());
        assert!(store.recompute_cached_avg_vote(5).await.is_err());
    }

    #[tokio::test]
    async fn test_recompute_average_from_stored_votes() {
        let store = InMemoryStore::new();
        let brick = store
            .insert_brick(NewBrick::thesis("A", "a", "public"), Utc::now())
            .await
            .unwrap();
        assert_eq!(store.recompute_cached_avg_vote(brick.id).await.unwrap(), 0.0);

        for (voter_id, value) in [(1, 2.0), (2, -1.0), (3, 2.0)] {
            store
                .insert_vote(NewVote {
                    voter_id,
                    brick_id: brick.id,
                    value,
                })
                .await
                .unwrap();
        }
        // votes on other bricks do not count
        store
            .insert_vote(NewVote {
                voter_id: 1,
                brick_id: brick.id + 1,
                value: -2.0,
            })
            .await
            .unwrap();

        let average = store.recompute_cached_avg_vote(brick.id).await.unwrap();
        assert_eq!(average, 1.0);
        assert_eq!(
            store.get_brick(brick.id).await.unwrap().unwrap().cached_avg_vote,
            1.0
        );
    }

    #[tokio::test]
    async fn test_memberships() {
        let store = InMemoryStore::new();
        store.add_membership(1, "staff").await;
        store.add_membership(1, "public").await;

        let groups = store.get_user_groups(1).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains("staff"));
        assert!(store.get_user_groups(2).await.unwrap().is_empty());
    }
}
