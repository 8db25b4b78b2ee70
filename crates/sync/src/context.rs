//! Explicit session context holding the three collection managers

use crate::cache::CollectionCache;
use crate::client::{HttpCollectionEndpoint, HttpFavoriteActorEndpoint, HttpSyncClient};
use crate::collection::{FavoriteActorManager, TitleCollectionManager};
use crate::endpoint::CollectionEndpoint;
use crate::error::ApiError;
use cinehub_core::{CollectionItem, CollectionKind, FavoriteActor};
use std::sync::Arc;
use tracing::warn;

/// Watchlist, favorites and favorite actors of the local session
///
/// Passed to UI code and the reconciler instead of a global store.
pub struct SessionContext {
    pub watchlist: Arc<TitleCollectionManager>,
    pub favorites: Arc<TitleCollectionManager>,
    pub favorite_actors: Arc<FavoriteActorManager>,
}

impl SessionContext {
    pub fn new(
        watchlist: TitleCollectionManager,
        favorites: TitleCollectionManager,
        favorite_actors: FavoriteActorManager,
    ) -> Self {
        Self {
            watchlist: Arc::new(watchlist),
            favorites: Arc::new(favorites),
            favorite_actors: Arc::new(favorite_actors),
        }
    }

    /// Managers backed by arbitrary endpoints, optionally caching snapshots
    pub fn with_endpoints(
        watchlist: Arc<dyn CollectionEndpoint<CollectionItem>>,
        favorites: Arc<dyn CollectionEndpoint<CollectionItem>>,
        favorite_actors: Arc<dyn CollectionEndpoint<FavoriteActor>>,
        cache: Option<Arc<CollectionCache>>,
    ) -> Self {
        let mut watchlist = TitleCollectionManager::for_kind(CollectionKind::Watchlist, watchlist);
        let mut favorites = TitleCollectionManager::for_kind(CollectionKind::Favorites, favorites);
        let mut favorite_actors = FavoriteActorManager::favorite_actors(favorite_actors);

        if let Some(cache) = cache {
            watchlist = watchlist.with_cache(cache.clone());
            favorites = favorites.with_cache(cache.clone());
            favorite_actors = favorite_actors.with_cache(cache);
        }

        Self::new(watchlist, favorites, favorite_actors)
    }

    /// Managers talking to the Synchronization API over HTTP
    pub fn connect(client: Arc<HttpSyncClient>, cache: Option<Arc<CollectionCache>>) -> Self {
        Self::with_endpoints(
            Arc::new(HttpCollectionEndpoint::new(
                client.clone(),
                CollectionKind::Watchlist,
            )),
            Arc::new(HttpCollectionEndpoint::new(
                client.clone(),
                CollectionKind::Favorites,
            )),
            Arc::new(HttpFavoriteActorEndpoint::new(client)),
            cache,
        )
    }

    pub fn collection(&self, kind: CollectionKind) -> &Arc<TitleCollectionManager> {
        match kind {
            CollectionKind::Watchlist => &self.watchlist,
            CollectionKind::Favorites => &self.favorites,
        }
    }

    /// Owner shared by the managers, taken from the watchlist
    pub fn owner(&self) -> Option<String> {
        self.watchlist.owner()
    }

    /// Clear every manager and point it at `identity` without fetching
    ///
    /// Returns true if any manager changed owner.
    pub fn reset_owner(&self, identity: Option<String>) -> bool {
        let watchlist = self.watchlist.reset_owner(identity.clone());
        let favorites = self.favorites.reset_owner(identity.clone());
        let actors = self.favorite_actors.reset_owner(identity);
        watchlist || favorites || actors
    }

    /// Refresh all three collections concurrently
    ///
    /// Failures are recorded on the individual managers; the first one is returned.
    pub async fn fetch_all(&self) -> Result<(), ApiError> {
        let (watchlist, favorites, actors) = futures::join!(
            self.watchlist.fetch_all(),
            self.favorites.fetch_all(),
            self.favorite_actors.fetch_all(),
        );

        let mut first_error = None;
        for (name, result) in [
            ("watchlist", watchlist),
            ("favorites", favorites),
            ("favorite_actors", actors),
        ] {
            if let Err(e) = result {
                warn!(collection = name, error = %e, "Collection refresh failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
