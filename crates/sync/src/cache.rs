/// Durable collection cache with SQLite persistence
///
/// Stores the last confirmed snapshot of each collection, keyed by owner
/// identity and collection name. One owner's rows are never returned for
/// another owner, and a signed-out owner's rows can be purged in one call.
use crate::error::CacheError;
use cinehub_core::ClientConfig;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS collection_cache (
        owner TEXT NOT NULL,
        name TEXT NOT NULL,
        payload TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        PRIMARY KEY (owner, name)
    )";

/// Owner-scoped snapshot store
pub struct CollectionCache {
    db: Arc<Mutex<Connection>>,
}

impl CollectionCache {
    /// Open (or create) the cache database at `path`
    ///
    /// # Errors
    /// Returns `CacheError` if the database cannot be opened or initialized
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        let cache = Self::with_connection(conn)?;
        info!("Initialized collection cache database");
        Ok(cache)
    }

    /// Cache at the configured path; `None` when caching is disabled
    pub fn from_config(config: &ClientConfig) -> Result<Option<Self>, CacheError> {
        config.cache_path.as_ref().map(Self::open).transpose()
    }

    /// In-memory cache (for testing)
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Replace the snapshot of `name` for `owner`
    pub fn store<T: Serialize>(&self, owner: &str, name: &str, items: &[T]) -> Result<(), CacheError> {
        let payload = serde_json::to_string(items)?;
        let updated_at = chrono::Utc::now().timestamp_millis();

        let db = self.db.lock();
        db.execute(
            "INSERT INTO collection_cache (owner, name, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (owner, name) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![owner, name, payload, updated_at],
        )?;

        debug!("Cached {} {} items for {}", items.len(), name, owner);
        Ok(())
    }

    /// Last snapshot of `name` for `owner`, if any was stored
    pub fn load<T: DeserializeOwned>(&self, owner: &str, name: &str) -> Result<Option<Vec<T>>, CacheError> {
        let db = self.db.lock();
        let payload: Option<String> = db
            .query_row(
                "SELECT payload FROM collection_cache WHERE owner = ?1 AND name = ?2",
                params![owner, name],
                |row| row.get(0),
            )
            .optional()?;
        drop(db);

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub fn remove(&self, owner: &str, name: &str) -> Result<(), CacheError> {
        let db = self.db.lock();
        db.execute(
            "DELETE FROM collection_cache WHERE owner = ?1 AND name = ?2",
            params![owner, name],
        )?;
        Ok(())
    }

    /// Delete every snapshot of `owner`, returning the number of rows removed
    pub fn purge_owner(&self, owner: &str) -> Result<usize, CacheError> {
        let db = self.db.lock();
        let removed = db.execute(
            "DELETE FROM collection_cache WHERE owner = ?1",
            params![owner],
        )?;

        info!("Purged {} cached collections for {}", removed, owner);
        Ok(removed)
    }

    /// Owners with at least one cached snapshot
    pub fn owners(&self) -> Result<Vec<String>, CacheError> {
        let db = self.db.lock();
        let mut stmt = db.prepare("SELECT DISTINCT owner FROM collection_cache ORDER BY owner")?;
        let owners = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(owners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_load() {
        let cache = CollectionCache::open_in_memory().unwrap();
        cache.store("alice", "watchlist", &["a", "b"]).unwrap();

        let loaded: Vec<String> = cache.load("alice", "watchlist").unwrap().unwrap();
        assert_eq!(loaded, vec!["a", "b"]);
    }

    #[test]
    fn test_store_overwrites() {
        let cache = CollectionCache::open_in_memory().unwrap();
        cache.store("alice", "watchlist", &[1, 2, 3]).unwrap();
        cache.store("alice", "watchlist", &[4]).unwrap();

        let loaded: Vec<i64> = cache.load("alice", "watchlist").unwrap().unwrap();
        assert_eq!(loaded, vec![4]);
    }

    #[test]
    fn test_load_is_owner_scoped() {
        let cache = CollectionCache::open_in_memory().unwrap();
        cache.store("alice", "favorites", &[1]).unwrap();

        assert!(cache.load::<i64>("bob", "favorites").unwrap().is_none());
        assert!(cache.load::<i64>("alice", "watchlist").unwrap().is_none());
    }

    #[test]
    fn test_purge_owner() {
        let cache = CollectionCache::open_in_memory().unwrap();
        cache.store("alice", "watchlist", &[1]).unwrap();
        cache.store("alice", "favorites", &[2]).unwrap();
        cache.store("bob", "watchlist", &[3]).unwrap();

        assert_eq!(cache.purge_owner("alice").unwrap(), 2);
        assert_eq!(cache.owners().unwrap(), vec!["bob".to_string()]);
        assert!(cache.load::<i64>("alice", "watchlist").unwrap().is_none());
    }

    #[test]
    fn test_remove() {
        let cache = CollectionCache::open_in_memory().unwrap();
        cache.store("alice", "watchlist", &[1]).unwrap();
        cache.remove("alice", "watchlist").unwrap();

        assert!(cache.owners().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_without_path_is_disabled() {
        assert!(CollectionCache::from_config(&ClientConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "cinehub-cache-{}.db",
            uuid::Uuid::new_v4()
        ));
        {
            let cache = CollectionCache::open(&path).unwrap();
            cache.store("alice", "watchlist", &[7]).unwrap();
        }

        let cache = CollectionCache::open(&path).unwrap();
        let loaded: Vec<i64> = cache.load("alice", "watchlist").unwrap().unwrap();
        assert_eq!(loaded, vec![7]);

        let _ = std::fs::remove_file(&path);
    }
}
