//! Collection state manager
//!
//! Keeps an eventually consistent mirror of one server-side collection for the
//! current owner identity. Adds are server-first, removes are optimistic with
//! rollback. A toggle on a key with a request in flight is queued and sent by
//! the task driving that key. Every completion checks that the owner has not
//! changed since the request was issued and drops stale responses.

use crate::cache::CollectionCache;
use crate::collection::state::{Begin, CollectionEntries, CollectionState, EntryState};
use crate::endpoint::CollectionEndpoint;
use crate::error::ApiError;
use crate::record::CollectionRecord;
use cinehub_core::{CollectionItem, CollectionKind, FavoriteActor};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache name of the favorite actors collection
pub const FAVORITE_ACTORS: &str = "favorite_actors";

/// Watchlist or favorites manager
pub type TitleCollectionManager = CollectionManager<CollectionItem>;

/// Favorite actors manager
pub type FavoriteActorManager = CollectionManager<FavoriteActor>;

/// Request to send for one key
enum Request<R: CollectionRecord> {
    Add(R::Draft),
    /// Carries the record restored on rollback
    Remove(R),
}

/// Client-side mirror of one collection
pub struct CollectionManager<R: CollectionRecord> {
    /// Stable name, also the durable cache key
    name: &'static str,

    /// Human-readable name used in error messages
    label: &'static str,

    endpoint: Arc<dyn CollectionEndpoint<R>>,

    cache: Option<Arc<CollectionCache>>,

    /// Never held across an await
    state: Mutex<CollectionEntries<R>>,
}

impl CollectionManager<CollectionItem> {
    pub fn for_kind(
        kind: CollectionKind,
        endpoint: Arc<dyn CollectionEndpoint<CollectionItem>>,
    ) -> Self {
        Self::new(kind.as_str(), kind.as_str(), endpoint)
    }
}

impl CollectionManager<FavoriteActor> {
    pub fn favorite_actors(endpoint: Arc<dyn CollectionEndpoint<FavoriteActor>>) -> Self {
        Self::new(FAVORITE_ACTORS, "favorite actors", endpoint)
    }
}

impl<R: CollectionRecord> CollectionManager<R> {
    pub fn new(
        name: &'static str,
        label: &'static str,
        endpoint: Arc<dyn CollectionEndpoint<R>>,
    ) -> Self {
        Self {
            name,
            label,
            endpoint,
            cache: None,
            state: Mutex::new(CollectionEntries::new()),
        }
    }

    /// Write confirmed snapshots through to a durable cache
    pub fn with_cache(mut self, cache: Arc<CollectionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Switch owner without fetching
    ///
    /// Clears items, error and loading state before returning, so nothing of the
    /// previous owner stays visible. Returns false if `identity` is already the owner.
    pub fn reset_owner(&self, identity: Option<String>) -> bool {
        let mut state = self.state.lock();
        if state.owner() == identity.as_deref() {
            return false;
        }
        let previous = state.reset(identity);
        info!(
            collection = self.name,
            previous = ?previous,
            owner = ?state.owner(),
            "Collection owner changed"
        );
        true
    }

    /// Switch owner and load the new owner's collection
    pub async fn set_owner(&self, identity: Option<String>) -> Result<(), ApiError> {
        let signed_in = identity.is_some();
        if self.reset_owner(identity) && signed_in {
            self.fetch_all().await
        } else {
            Ok(())
        }
    }

    /// Replace committed items with the server's list for the current owner
    ///
    /// On failure the existing items stay and `error` is set.
    pub async fn fetch_all(&self) -> Result<(), ApiError> {
        let (owner, epoch, since) = {
            let mut state = self.state.lock();
            let Some(owner) = state.owner().map(str::to_string) else {
                return Ok(());
            };
            let since = state.begin_fetch();
            (owner, state.epoch(), since)
        };

        let result = self.endpoint.list(&owner).await;

        let mut state = self.state.lock();
        if !state.is_current(epoch) {
            debug!(
                collection = self.name,
                owner = %owner,
                "Discarding stale fetch response"
            );
            return Ok(());
        }

        let outcome = match result {
            Ok(records) => {
                debug!(
                    collection = self.name,
                    owner = %owner,
                    count = records.len(),
                    "Fetched collection"
                );
                state.replace_committed(records, since);
                self.persist(&owner, &state.items());
                Ok(())
            }
            Err(e) => {
                warn!(collection = self.name, owner = %owner, error = %e, "Failed to fetch collection");
                state.set_error(format!("Failed to load {}", self.label));
                Err(e)
            }
        };
        state.end_fetch();
        outcome
    }

    /// Add a record, committed on the server before it shows up in `items`
    ///
    /// `contains` reports the key as present while the request is in flight.
    /// During an in-flight remove of the same key the add is queued and sent
    /// by that remove once it is confirmed.
    pub async fn add(&self, draft: R::Draft) -> Result<(), ApiError> {
        let key = R::draft_key(&draft);

        let (owner, epoch) = {
            let mut state = self.state.lock();
            let Some(owner) = state.owner().map(str::to_string) else {
                state.set_error(format!("Sign in to add to {}", self.label));
                return Err(ApiError::Unauthorized);
            };
            match state.begin_add(&draft) {
                Begin::Send(()) => (owner, state.epoch()),
                Begin::Queued => {
                    debug!(collection = self.name, key = %key, "Add queued behind pending remove");
                    return Ok(());
                }
                Begin::Noop => {
                    debug!(collection = self.name, key = %key, "Add ignored, key already present");
                    return Ok(());
                }
            }
        };

        self.drive(&owner, epoch, key, Request::Add(draft)).await
    }

    /// Remove a record optimistically, rolling back if the server refuses
    ///
    /// A key that is absent locally is a no-op success. NotFound from the server
    /// counts as success. During an in-flight add of the same key the remove is
    /// queued and sent by that add once it is confirmed.
    pub async fn remove(&self, key: &R::Key) -> Result<(), ApiError> {
        let (owner, epoch, kept) = {
            let mut state = self.state.lock();
            let Some(owner) = state.owner().map(str::to_string) else {
                state.set_error(format!("Sign in to remove from {}", self.label));
                return Err(ApiError::Unauthorized);
            };
            match state.begin_remove(key) {
                Begin::Send(kept) => (owner, state.epoch(), kept),
                Begin::Queued => {
                    debug!(collection = self.name, key = %key, "Remove queued behind pending add");
                    return Ok(());
                }
                Begin::Noop => {
                    debug!(collection = self.name, key = %key, "Remove ignored, key already absent");
                    return Ok(());
                }
            }
        };

        self.drive(&owner, epoch, key.clone(), Request::Remove(kept))
            .await
    }

    /// Send `request` and every request queued behind it on the same key
    async fn drive(
        &self,
        owner: &str,
        epoch: u64,
        key: R::Key,
        mut request: Request<R>,
    ) -> Result<(), ApiError> {
        loop {
            let next = match request {
                Request::Add(draft) => {
                    let result = self.endpoint.add(owner, &draft).await;
                    self.complete_add(owner, epoch, &key, result)?
                }
                Request::Remove(kept) => {
                    let result = self.endpoint.remove(owner, &key).await;
                    self.complete_remove(owner, epoch, &key, kept, result)?
                }
            };

            match next {
                Some(queued) => request = queued,
                None => return Ok(()),
            }
        }
    }

    fn complete_add(
        &self,
        owner: &str,
        epoch: u64,
        key: &R::Key,
        result: Result<R, ApiError>,
    ) -> Result<Option<Request<R>>, ApiError> {
        let mut state = self.state.lock();
        if !state.is_current(epoch) {
            debug!(collection = self.name, key = %key, "Discarding stale add response");
            return Ok(None);
        }

        match result {
            Ok(record) => {
                debug!(collection = self.name, key = %key, "Add confirmed");
                let queued = state.confirm_add(key, record);
                self.persist(owner, &state.items());
                Ok(queued.map(Request::Remove))
            }
            Err(e) => {
                if state.abort_add(key) {
                    debug!(collection = self.name, key = %key, error = %e, "Add failed, queued remove already satisfied");
                    return Ok(None);
                }
                warn!(collection = self.name, key = %key, error = %e, "Add failed");
                let message = match e {
                    ApiError::Conflict(_) => format!("Already in {}", self.label),
                    _ => format!("Failed to add to {}", self.label),
                };
                state.set_error(message);
                Err(e)
            }
        }
    }

    fn complete_remove(
        &self,
        owner: &str,
        epoch: u64,
        key: &R::Key,
        kept: R,
        result: Result<(), ApiError>,
    ) -> Result<Option<Request<R>>, ApiError> {
        let mut state = self.state.lock();
        if !state.is_current(epoch) {
            debug!(collection = self.name, key = %key, "Discarding stale remove response");
            return Ok(None);
        }

        match result {
            Ok(()) | Err(ApiError::NotFound) => {
                debug!(collection = self.name, key = %key, "Remove confirmed");
                let queued = state.confirm_remove(key);
                self.persist(owner, &state.items());
                Ok(queued.map(Request::Add))
            }
            Err(e) => {
                if state.rollback_remove(kept) {
                    debug!(collection = self.name, key = %key, error = %e, "Remove failed, queued add already satisfied");
                    return Ok(None);
                }
                warn!(collection = self.name, key = %key, error = %e, "Remove failed, rolling back");
                state.set_error(format!("Failed to remove from {}", self.label));
                Err(e)
            }
        }
    }

    /// Optimistic membership, used for toggle state
    pub fn contains(&self, key: &R::Key) -> bool {
        self.state.lock().contains(key)
    }

    pub fn entry_state(&self, key: &R::Key) -> Option<EntryState<R>> {
        self.state.lock().state_of(key).cloned()
    }

    /// Committed items in order
    pub fn items(&self) -> Vec<R> {
        self.state.lock().items()
    }

    pub fn owner(&self) -> Option<String> {
        self.state.lock().owner().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error().map(str::to_string)
    }

    /// Dismiss the transient error
    pub fn clear_error(&self) {
        self.state.lock().clear_error();
    }

    pub fn snapshot(&self) -> CollectionState<R> {
        self.state.lock().snapshot()
    }

    /// Last persisted snapshot of the current owner, for offline display
    pub fn cached_items(&self) -> Option<Vec<R>> {
        let cache = self.cache.as_ref()?;
        let owner = self.owner()?;
        match cache.load(&owner, self.name) {
            Ok(items) => items,
            Err(e) => {
                warn!(collection = self.name, error = %e, "Failed to read collection cache");
                None
            }
        }
    }

    /// Called with the state lock held so a logout purge cannot be overtaken
    fn persist(&self, owner: &str, items: &[R]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(owner, self.name, items) {
                warn!(collection = self.name, error = %e, "Failed to write collection cache");
            }
        }
    }
}
