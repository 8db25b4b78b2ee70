//! Shared test doubles for the sync integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use cinehub_core::{
    CollectionItem, FavoriteActor, ItemKey, MediaType, NewCollectionItem, NewFavoriteActor,
};
use cinehub_sync::{ApiError, CollectionEndpoint, CollectionRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

/// Records the mock server can confirm from a draft
pub trait MockRecord: CollectionRecord {
    fn confirm(draft: &Self::Draft) -> Self;
}

impl MockRecord for CollectionItem {
    fn confirm(draft: &NewCollectionItem) -> Self {
        draft.clone().into_item(Utc::now())
    }
}

impl MockRecord for FavoriteActor {
    fn confirm(draft: &NewFavoriteActor) -> Self {
        draft.clone().into_actor(Uuid::new_v4(), Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Add,
    Remove,
}

/// Holds one request until the test releases it
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Wait until the gated request is in flight
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// In-memory Synchronization API with per-owner storage
pub struct MockEndpoint<R: MockRecord> {
    store: Mutex<HashMap<String, Vec<R>>>,
    failures: Mutex<HashMap<Op, ApiError>>,
    gates: Mutex<HashMap<(String, Op), Arc<Gate>>>,
    list_calls: AtomicUsize,
    add_calls: AtomicUsize,
    remove_calls: AtomicUsize,
}

impl<R: MockRecord> MockEndpoint<R> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            list_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            remove_calls: AtomicUsize::new(0),
        })
    }

    pub fn seed(&self, owner: &str, records: Vec<R>) {
        self.store.lock().insert(owner.to_string(), records);
    }

    pub fn records(&self, owner: &str) -> Vec<R> {
        self.store.lock().get(owner).cloned().unwrap_or_default()
    }

    pub fn fail(&self, op: Op, error: ApiError) {
        self.failures.lock().insert(op, error);
    }

    pub fn succeed(&self, op: Op) {
        self.failures.lock().remove(&op);
    }

    /// Gate the next `op` request of `owner`
    pub fn hold(&self, owner: &str, op: Op) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .insert((owner.to_string(), op), gate.clone());
        gate
    }

    pub fn calls(&self, op: Op) -> usize {
        match op {
            Op::List => self.list_calls.load(Ordering::SeqCst),
            Op::Add => self.add_calls.load(Ordering::SeqCst),
            Op::Remove => self.remove_calls.load(Ordering::SeqCst),
        }
    }

    async fn enter(&self, owner: &str, op: Op) -> Result<(), ApiError> {
        let counter = match op {
            Op::List => &self.list_calls,
            Op::Add => &self.add_calls,
            Op::Remove => &self.remove_calls,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.lock().remove(&(owner.to_string(), op));
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        match self.failures.lock().get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: MockRecord> CollectionEndpoint<R> for MockEndpoint<R> {
    async fn list(&self, owner: &str) -> Result<Vec<R>, ApiError> {
        // Listed when the request arrives; a held response is as old as the hold
        let records = self.records(owner);
        self.enter(owner, Op::List).await?;
        Ok(records)
    }

    async fn add(&self, owner: &str, draft: &R::Draft) -> Result<R, ApiError> {
        self.enter(owner, Op::Add).await?;
        let mut store = self.store.lock();
        let records = store.entry(owner.to_string()).or_default();
        let key = R::draft_key(draft);
        if records.iter().any(|r| r.key() == key) {
            return Err(ApiError::Conflict(format!("{} already exists", key)));
        }
        let record = R::confirm(draft);
        records.push(record.clone());
        Ok(record)
    }

    async fn remove(&self, owner: &str, key: &R::Key) -> Result<(), ApiError> {
        self.enter(owner, Op::Remove).await?;
        let mut store = self.store.lock();
        let records = store.entry(owner.to_string()).or_default();
        let before = records.len();
        records.retain(|r| &r.key() != key);
        if records.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

pub fn movie(id: i64) -> CollectionItem {
    movie_draft(id).into_item(Utc::now())
}

pub fn movie_draft(id: i64) -> NewCollectionItem {
    NewCollectionItem {
        id,
        media_type: MediaType::Movie,
        title: format!("Movie {}", id),
        poster_path: Some(format!("/posters/{}.jpg", id)),
    }
}

pub fn tv_draft(id: i64) -> NewCollectionItem {
    NewCollectionItem {
        id,
        media_type: MediaType::Tv,
        title: format!("Show {}", id),
        poster_path: None,
    }
}

pub fn actor_draft(actor_id: i64) -> NewFavoriteActor {
    NewFavoriteActor {
        actor_id,
        name: format!("Actor {}", actor_id),
        profile_path: None,
    }
}

pub fn keys(items: &[CollectionItem]) -> Vec<ItemKey> {
    items.iter().map(|i| i.key()).collect()
}

/// Let spawned tasks reach their next suspension point
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
