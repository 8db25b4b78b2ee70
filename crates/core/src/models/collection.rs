//! Watchlist and favorites models
//!
//! A collection holds references to titles of the external metadata catalog.
//! Items are identified by the pair of catalog id and media type, since the
//! catalog numbers movies and TV shows independently.

use crate::error::CineHubError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Kind of catalog title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = CineHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            other => Err(CineHubError::UnknownVariant {
                kind: "media type",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity key of a collection item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemKey {
    pub id: i64,
    pub media_type: MediaType,
}

impl ItemKey {
    pub fn new(id: i64, media_type: MediaType) -> Self {
        Self { id, media_type }
    }

    pub fn movie(id: i64) -> Self {
        Self::new(id, MediaType::Movie)
    }

    pub fn tv(id: i64) -> Self {
        Self::new(id, MediaType::Tv)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.media_type, self.id)
    }
}

/// A title stored in a user's watchlist or favorites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    /// External catalog id
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    /// Assigned by the server when the row is inserted
    pub added_at: DateTime<Utc>,
}

impl CollectionItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }
}

/// Request body for adding a title to a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCollectionItem {
    #[validate(range(min = 1))]
    pub id: i64,

    pub media_type: MediaType,

    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(max = 500))]
    pub poster_path: Option<String>,
}

impl NewCollectionItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }

    /// Confirm the draft into a stored item
    pub fn into_item(self, added_at: DateTime<Utc>) -> CollectionItem {
        CollectionItem {
            id: self.id,
            media_type: self.media_type,
            title: self.title,
            poster_path: self.poster_path,
            added_at,
        }
    }
}

/// The per-user title collections backed by the Synchronization API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Watchlist,
    Favorites,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Watchlist, CollectionKind::Favorites];

    /// URL segment and cache name
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Watchlist => "watchlist",
            CollectionKind::Favorites => "favorites",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            CollectionKind::Watchlist => "watchlist",
            CollectionKind::Favorites => "favorites",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = CineHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchlist" => Ok(CollectionKind::Watchlist),
            "favorites" => Ok(CollectionKind::Favorites),
            other => Err(CineHubError::UnknownVariant {
                kind: "collection",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: i64, title: &str) -> NewCollectionItem {
        NewCollectionItem {
            id,
            media_type: MediaType::Movie,
            title: title.to_string(),
            poster_path: Some("/poster.jpg".to_string()),
        }
    }

    #[test]
    fn test_item_wire_format_is_camel_case() {
        let item = draft(5, "Heat").into_item(Utc::now());
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], 5);
        assert_eq!(json["mediaType"], "movie");
        assert_eq!(json["posterPath"], "/poster.jpg");
        assert!(json.get("addedAt").is_some());
    }

    #[test]
    fn test_key_distinguishes_media_type() {
        assert_ne!(ItemKey::movie(5), ItemKey::tv(5));
        assert_eq!(draft(5, "Heat").key(), ItemKey::movie(5));
        assert_eq!(ItemKey::tv(1399).to_string(), "tv/1399");
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!("tv".parse::<MediaType>().unwrap(), MediaType::Tv);
        assert!("person".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_collection_kind_parse() {
        assert_eq!(
            "favorites".parse::<CollectionKind>().unwrap(),
            CollectionKind::Favorites
        );
        assert!("ratings".parse::<CollectionKind>().is_err());
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft(5, "Heat").validate().is_ok());
        assert!(draft(0, "Heat").validate().is_err());
        assert!(draft(5, "").validate().is_err());
    }

    #[test]
    fn test_draft_missing_title_is_rejected_by_serde() {
        let result: Result<NewCollectionItem, _> =
            serde_json::from_str(r#"{"id": 5, "mediaType": "movie"}"#);
        assert!(result.is_err());
    }
}
