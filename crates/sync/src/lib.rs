/// CineHub collection sync client
///
/// Client-side mirrors of a user's watchlist, favorites and favorite actors,
/// kept consistent with the Synchronization API.
///
/// Features:
/// - Optimistic remove with rollback, server-first add
/// - Toggles on an in-flight key are queued, not dropped
/// - Owner-epoch checks that drop responses issued for a previous identity
/// - Identity reconciliation driven by a watch channel
/// - Owner-scoped SQLite cache of confirmed snapshots
pub mod cache;
pub mod client;
pub mod collection;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod identity;
pub mod reconcile;
pub mod record;

pub use cache::CollectionCache;
pub use client::{HttpCollectionEndpoint, HttpFavoriteActorEndpoint, HttpSyncClient};
pub use collection::{
    CollectionManager, CollectionState, EntryState, FavoriteActorManager,
    TitleCollectionManager, FAVORITE_ACTORS,
};
pub use context::SessionContext;
pub use endpoint::CollectionEndpoint;
pub use error::{ApiError, CacheError};
pub use identity::{IdentityProvider, Session, TokenSource};
pub use reconcile::IdentityReconciler;
pub use record::CollectionRecord;
