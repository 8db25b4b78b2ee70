//! Records that can live in a client-side collection

use cinehub_core::{CollectionItem, FavoriteActor, ItemKey, NewCollectionItem, NewFavoriteActor};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A server-confirmed record with a stable identity key
///
/// `Draft` is what the client sends to create a record; the server answers
/// with the confirmed record.
pub trait CollectionRecord:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Key: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;
    type Draft: Clone + Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn draft_key(draft: &Self::Draft) -> Self::Key;
}

impl CollectionRecord for CollectionItem {
    type Key = ItemKey;
    type Draft = NewCollectionItem;

    fn key(&self) -> ItemKey {
        CollectionItem::key(self)
    }

    fn draft_key(draft: &NewCollectionItem) -> ItemKey {
        draft.key()
    }
}

/// Favorite actors are unique by external person id
impl CollectionRecord for FavoriteActor {
    type Key = i64;
    type Draft = NewFavoriteActor;

    fn key(&self) -> i64 {
        self.actor_id
    }

    fn draft_key(draft: &NewFavoriteActor) -> i64 {
        draft.actor_id
    }
}
