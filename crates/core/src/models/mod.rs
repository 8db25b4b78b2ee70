//! Domain models for user-owned collections

pub mod actor;
pub mod collection;
pub mod history;

pub use actor::{FavoriteActor, NewFavoriteActor};
pub use collection::{CollectionItem, CollectionKind, ItemKey, MediaType, NewCollectionItem};
pub use history::{NewWatchHistoryEntry, WatchHistoryEntry};

use serde::{Deserialize, Serialize};

/// `{ "items": [...] }` list response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsEnvelope<T> {
    pub items: Vec<T>,
}

/// `{ "item": {...} }` single-record response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemEnvelope<T> {
    pub item: T,
}
