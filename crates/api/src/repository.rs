//! Collection repository for PostgreSQL persistence
//!
//! Rows are scoped by owner identity. Title collections and watch history are
//! keyed by `(owner_id, external_id, media_type)`, favorite actors by
//! `(owner_id, actor_id)`. Timestamps are always assigned by the store.

use crate::error::{ApiError, Result};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinehub_core::{
    CollectionItem, CollectionKind, DatabasePool, FavoriteActor, ItemKey, MediaType,
    NewCollectionItem, NewFavoriteActor, NewWatchHistoryEntry, WatchHistoryEntry,
};
use parking_lot::RwLock;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// Persistence operations behind the Synchronization API
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    // Title collections
    async fn list_items(&self, owner_id: &str, kind: CollectionKind) -> Result<Vec<CollectionItem>>;
    async fn add_item(
        &self,
        owner_id: &str,
        kind: CollectionKind,
        item: &NewCollectionItem,
    ) -> Result<CollectionItem>;
    async fn remove_item(&self, owner_id: &str, kind: CollectionKind, key: ItemKey) -> Result<()>;

    // Favorite actors
    async fn list_actors(&self, owner_id: &str) -> Result<Vec<FavoriteActor>>;
    async fn add_actor(&self, owner_id: &str, actor: &NewFavoriteActor) -> Result<FavoriteActor>;
    async fn remove_actor(&self, owner_id: &str, actor_id: i64) -> Result<()>;

    // Watch history, most recent first
    async fn list_history(&self, owner_id: &str) -> Result<Vec<WatchHistoryEntry>>;
    async fn record_watch(
        &self,
        owner_id: &str,
        entry: &NewWatchHistoryEntry,
    ) -> Result<WatchHistoryEntry>;
    async fn remove_history_entry(&self, owner_id: &str, key: ItemKey) -> Result<()>;
    /// Returns the number of entries deleted
    async fn clear_history(&self, owner_id: &str) -> Result<u64>;

    async fn is_healthy(&self) -> bool;
}

/// PostgreSQL implementation of CollectionRepository
pub struct PostgresCollectionRepository {
    db: DatabasePool,
}

impl PostgresCollectionRepository {
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    fn pool(&self) -> &PgPool {
        self.db.pool()
    }

    fn item_from_row(row: &PgRow) -> Result<CollectionItem> {
        let media_type: String = row.try_get("media_type").context("media_type column")?;
        Ok(CollectionItem {
            id: row.try_get("external_id").context("external_id column")?,
            media_type: media_type.parse::<MediaType>()?,
            title: row.try_get("title").context("title column")?,
            poster_path: row.try_get("poster_path").context("poster_path column")?,
            added_at: row
                .try_get::<DateTime<Utc>, _>("added_at")
                .context("added_at column")?,
        })
    }

    fn actor_from_row(row: &PgRow) -> Result<FavoriteActor> {
        Ok(FavoriteActor {
            id: row.try_get::<Uuid, _>("id").context("id column")?,
            actor_id: row.try_get("actor_id").context("actor_id column")?,
            name: row.try_get("name").context("name column")?,
            profile_path: row.try_get("profile_path").context("profile_path column")?,
            added_at: row
                .try_get::<DateTime<Utc>, _>("added_at")
                .context("added_at column")?,
        })
    }

    fn history_from_row(row: &PgRow) -> Result<WatchHistoryEntry> {
        let media_type: String = row.try_get("media_type").context("media_type column")?;
        Ok(WatchHistoryEntry {
            id: row.try_get("external_id").context("external_id column")?,
            media_type: media_type.parse::<MediaType>()?,
            title: row.try_get("title").context("title column")?,
            poster_path: row.try_get("poster_path").context("poster_path column")?,
            resume_position_seconds: row
                .try_get("resume_position_seconds")
                .context("resume_position_seconds column")?,
            last_watched_at: row
                .try_get::<DateTime<Utc>, _>("last_watched_at")
                .context("last_watched_at column")?,
        })
    }
}

#[async_trait]
impl CollectionRepository for PostgresCollectionRepository {
    async fn list_items(&self, owner_id: &str, kind: CollectionKind) -> Result<Vec<CollectionItem>> {
        let sql = format!(
            r#"
            SELECT external_id, media_type, title, poster_path, added_at
            FROM {}
            WHERE owner_id = $1
            ORDER BY added_at ASC, external_id ASC
            "#,
            kind.table_name()
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(self.pool())
            .await
            .with_context(|| format!("Failed to load {}", kind))?;

        rows.iter().map(Self::item_from_row).collect()
    }

    async fn add_item(
        &self,
        owner_id: &str,
        kind: CollectionKind,
        item: &NewCollectionItem,
    ) -> Result<CollectionItem> {
        let sql = format!(
            r#"
            INSERT INTO {} (owner_id, external_id, media_type, title, poster_path)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (owner_id, external_id, media_type) DO NOTHING
            RETURNING external_id, media_type, title, poster_path, added_at
            "#,
            kind.table_name()
        );

        let row = sqlx::query(&sql)
            .bind(owner_id)
            .bind(item.id)
            .bind(item.media_type.as_str())
            .bind(&item.title)
            .bind(&item.poster_path)
            .fetch_optional(self.pool())
            .await
            .with_context(|| format!("Failed to add to {}", kind))?;

        match row {
            Some(row) => Self::item_from_row(&row),
            None => Err(ApiError::Conflict(item.key().to_string())),
        }
    }

    async fn remove_item(&self, owner_id: &str, kind: CollectionKind, key: ItemKey) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE owner_id = $1 AND external_id = $2 AND media_type = $3",
            kind.table_name()
        );

        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(key.id)
            .bind(key.media_type.as_str())
            .execute(self.pool())
            .await
            .with_context(|| format!("Failed to remove from {}", kind))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn list_actors(&self, owner_id: &str) -> Result<Vec<FavoriteActor>> {
        let rows = sqlx::query(
            r#"
            SELECT id, actor_id, name, profile_path, added_at
            FROM favorite_actors
            WHERE owner_id = $1
            ORDER BY added_at ASC, actor_id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .context("Failed to load favorite actors")?;

        rows.iter().map(Self::actor_from_row).collect()
    }

    async fn add_actor(&self, owner_id: &str, actor: &NewFavoriteActor) -> Result<FavoriteActor> {
        let row = sqlx::query(
            r#"
            INSERT INTO favorite_actors (owner_id, actor_id, name, profile_path)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner_id, actor_id) DO NOTHING
            RETURNING id, actor_id, name, profile_path, added_at
            "#,
        )
        .bind(owner_id)
        .bind(actor.actor_id)
        .bind(&actor.name)
        .bind(&actor.profile_path)
        .fetch_optional(self.pool())
        .await
        .context("Failed to add favorite actor")?;

        match row {
            Some(row) => Self::actor_from_row(&row),
            None => Err(ApiError::Conflict(format!("actor {}", actor.actor_id))),
        }
    }

    async fn remove_actor(&self, owner_id: &str, actor_id: i64) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM favorite_actors WHERE owner_id = $1 AND actor_id = $2")
                .bind(owner_id)
                .bind(actor_id)
                .execute(self.pool())
                .await
                .context("Failed to remove favorite actor")?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("actor {}", actor_id)));
        }
        Ok(())
    }

    async fn list_history(&self, owner_id: &str) -> Result<Vec<WatchHistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT external_id, media_type, title, poster_path,
                   resume_position_seconds, last_watched_at
            FROM watch_history
            WHERE owner_id = $1
            ORDER BY last_watched_at DESC, external_id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await
        .context("Failed to load watch history")?;

        rows.iter().map(Self::history_from_row).collect()
    }

    async fn record_watch(
        &self,
        owner_id: &str,
        entry: &NewWatchHistoryEntry,
    ) -> Result<WatchHistoryEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO watch_history (
                owner_id, external_id, media_type, title, poster_path,
                resume_position_seconds, last_watched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (owner_id, external_id, media_type)
            DO UPDATE SET
                title = EXCLUDED.title,
                poster_path = EXCLUDED.poster_path,
                resume_position_seconds = EXCLUDED.resume_position_seconds,
                last_watched_at = NOW()
            RETURNING external_id, media_type, title, poster_path,
                      resume_position_seconds, last_watched_at
            "#,
        )
        .bind(owner_id)
        .bind(entry.id)
        .bind(entry.media_type.as_str())
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .bind(entry.resume_position_seconds)
        .fetch_one(self.pool())
        .await
        .context("Failed to record watch")?;

        Self::history_from_row(&row)
    }

    async fn remove_history_entry(&self, owner_id: &str, key: ItemKey) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM watch_history WHERE owner_id = $1 AND external_id = $2 AND media_type = $3",
        )
        .bind(owner_id)
        .bind(key.id)
        .bind(key.media_type.as_str())
        .execute(self.pool())
        .await
        .context("Failed to remove from watch history")?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn clear_history(&self, owner_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM watch_history WHERE owner_id = $1")
            .bind(owner_id)
            .execute(self.pool())
            .await
            .context("Failed to clear watch history")?;

        Ok(result.rows_affected())
    }

    async fn is_healthy(&self) -> bool {
        self.db.is_healthy().await
    }
}

#[derive(Default)]
struct OwnerCollections {
    items: HashMap<CollectionKind, Vec<CollectionItem>>,
    actors: Vec<FavoriteActor>,
    /// Oldest first
    history: Vec<WatchHistoryEntry>,
}

/// In-process repository for development and tests
#[derive(Default)]
pub struct InMemoryCollectionRepository {
    owners: RwLock<HashMap<String, OwnerCollections>>,
}

impl InMemoryCollectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionRepository for InMemoryCollectionRepository {
    async fn list_items(&self, owner_id: &str, kind: CollectionKind) -> Result<Vec<CollectionItem>> {
        Ok(self
            .owners
            .read()
            .get(owner_id)
            .and_then(|o| o.items.get(&kind))
            .cloned()
            .unwrap_or_default())
    }

    async fn add_item(
        &self,
        owner_id: &str,
        kind: CollectionKind,
        item: &NewCollectionItem,
    ) -> Result<CollectionItem> {
        let mut owners = self.owners.write();
        let items = owners
            .entry(owner_id.to_string())
            .or_default()
            .items
            .entry(kind)
            .or_default();

        let key = item.key();
        if items.iter().any(|i| i.key() == key) {
            return Err(ApiError::Conflict(key.to_string()));
        }

        let stored = item.clone().into_item(Utc::now());
        items.push(stored.clone());
        Ok(stored)
    }

    async fn remove_item(&self, owner_id: &str, kind: CollectionKind, key: ItemKey) -> Result<()> {
        let mut owners = self.owners.write();
        let items = owners
            .get_mut(owner_id)
            .and_then(|o| o.items.get_mut(&kind))
            .ok_or_else(|| ApiError::NotFound(key.to_string()))?;

        let before = items.len();
        items.retain(|i| i.key() != key);
        if items.len() == before {
            return Err(ApiError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn list_actors(&self, owner_id: &str) -> Result<Vec<FavoriteActor>> {
        Ok(self
            .owners
            .read()
            .get(owner_id)
            .map(|o| o.actors.clone())
            .unwrap_or_default())
    }

    async fn add_actor(&self, owner_id: &str, actor: &NewFavoriteActor) -> Result<FavoriteActor> {
        let mut owners = self.owners.write();
        let actors = &mut owners.entry(owner_id.to_string()).or_default().actors;

        if actors.iter().any(|a| a.actor_id == actor.actor_id) {
            return Err(ApiError::Conflict(format!("actor {}", actor.actor_id)));
        }

        let stored = actor.clone().into_actor(Uuid::new_v4(), Utc::now());
        actors.push(stored.clone());
        Ok(stored)
    }

    async fn remove_actor(&self, owner_id: &str, actor_id: i64) -> Result<()> {
        let mut owners = self.owners.write();
        let actors = owners
            .get_mut(owner_id)
            .map(|o| &mut o.actors)
            .ok_or_else(|| ApiError::NotFound(format!("actor {}", actor_id)))?;

        let before = actors.len();
        actors.retain(|a| a.actor_id != actor_id);
        if actors.len() == before {
            return Err(ApiError::NotFound(format!("actor {}", actor_id)));
        }
        Ok(())
    }

    async fn list_history(&self, owner_id: &str) -> Result<Vec<WatchHistoryEntry>> {
        Ok(self
            .owners
            .read()
            .get(owner_id)
            .map(|o| o.history.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn record_watch(
        &self,
        owner_id: &str,
        entry: &NewWatchHistoryEntry,
    ) -> Result<WatchHistoryEntry> {
        let mut owners = self.owners.write();
        let history = &mut owners.entry(owner_id.to_string()).or_default().history;

        let key = entry.key();
        history.retain(|e| e.key() != key);
        let stored = entry.clone().into_entry(Utc::now());
        history.push(stored.clone());
        Ok(stored)
    }

    async fn remove_history_entry(&self, owner_id: &str, key: ItemKey) -> Result<()> {
        let mut owners = self.owners.write();
        let history = owners
            .get_mut(owner_id)
            .map(|o| &mut o.history)
            .ok_or_else(|| ApiError::NotFound(key.to_string()))?;

        let before = history.len();
        history.retain(|e| e.key() != key);
        if history.len() == before {
            return Err(ApiError::NotFound(key.to_string()));
        }
        Ok(())
    }

    async fn clear_history(&self, owner_id: &str) -> Result<u64> {
        let mut owners = self.owners.write();
        let removed = owners
            .get_mut(owner_id)
            .map(|o| std::mem::take(&mut o.history).len())
            .unwrap_or(0);
        Ok(removed as u64)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: i64, media_type: MediaType) -> NewCollectionItem {
        NewCollectionItem {
            id,
            media_type,
            title: format!("Title {}", id),
            poster_path: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_add_list_remove() {
        let repo = InMemoryCollectionRepository::new();
        repo.add_item("alice", CollectionKind::Watchlist, &draft(1, MediaType::Movie))
            .await
            .unwrap();
        repo.add_item("alice", CollectionKind::Watchlist, &draft(1, MediaType::Tv))
            .await
            .unwrap();

        let items = repo.list_items("alice", CollectionKind::Watchlist).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(repo
            .list_items("alice", CollectionKind::Favorites)
            .await
            .unwrap()
            .is_empty());

        repo.remove_item("alice", CollectionKind::Watchlist, ItemKey::movie(1))
            .await
            .unwrap();
        let items = repo.list_items("alice", CollectionKind::Watchlist).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key(), ItemKey::tv(1));
    }

    #[tokio::test]
    async fn test_in_memory_conflict_and_not_found() {
        let repo = InMemoryCollectionRepository::new();
        repo.add_item("alice", CollectionKind::Favorites, &draft(5, MediaType::Movie))
            .await
            .unwrap();

        let dup = repo
            .add_item("alice", CollectionKind::Favorites, &draft(5, MediaType::Movie))
            .await;
        assert!(matches!(dup, Err(ApiError::Conflict(_))));

        let missing = repo
            .remove_item("bob", CollectionKind::Favorites, ItemKey::movie(5))
            .await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_in_memory_actors_scoped_by_owner() {
        let repo = InMemoryCollectionRepository::new();
        let actor = NewFavoriteActor {
            actor_id: 287,
            name: "Brad Pitt".to_string(),
            profile_path: None,
        };
        repo.add_actor("alice", &actor).await.unwrap();
        repo.add_actor("bob", &actor).await.unwrap();

        assert!(matches!(
            repo.add_actor("alice", &actor).await,
            Err(ApiError::Conflict(_))
        ));

        repo.remove_actor("alice", 287).await.unwrap();
        assert!(repo.list_actors("alice").await.unwrap().is_empty());
        assert_eq!(repo.list_actors("bob").await.unwrap().len(), 1);
    }

    fn watched(id: i64, position: i32) -> NewWatchHistoryEntry {
        NewWatchHistoryEntry {
            id,
            media_type: MediaType::Movie,
            title: format!("Title {}", id),
            poster_path: None,
            resume_position_seconds: position,
        }
    }

    #[tokio::test]
    async fn test_in_memory_history_rewatch_moves_to_front() {
        let repo = InMemoryCollectionRepository::new();
        repo.record_watch("alice", &watched(1, 10)).await.unwrap();
        repo.record_watch("alice", &watched(2, 20)).await.unwrap();
        repo.record_watch("alice", &watched(1, 95)).await.unwrap();

        let history = repo.list_history("alice").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].key(), ItemKey::movie(1));
        assert_eq!(history[0].resume_position_seconds, 95);
        assert_eq!(history[1].key(), ItemKey::movie(2));
        assert!(repo.list_history("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_history_remove_and_clear() {
        let repo = InMemoryCollectionRepository::new();
        repo.record_watch("alice", &watched(1, 0)).await.unwrap();
        repo.record_watch("alice", &watched(2, 0)).await.unwrap();

        repo.remove_history_entry("alice", ItemKey::movie(1))
            .await
            .unwrap();
        assert!(matches!(
            repo.remove_history_entry("alice", ItemKey::movie(1)).await,
            Err(ApiError::NotFound(_))
        ));

        assert_eq!(repo.clear_history("alice").await.unwrap(), 1);
        assert_eq!(repo.clear_history("alice").await.unwrap(), 0);
        assert_eq!(repo.clear_history("nobody").await.unwrap(), 0);
    }
}
