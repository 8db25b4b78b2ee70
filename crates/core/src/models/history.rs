//! Watch history models
//!
//! One entry per title and user. Watching a title again moves the entry to the
//! front and overwrites the resume position.

use crate::models::collection::{ItemKey, MediaType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A title the user has watched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    /// External catalog id
    pub id: i64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub resume_position_seconds: i32,
    /// Assigned by the server on every recorded watch
    pub last_watched_at: DateTime<Utc>,
}

impl WatchHistoryEntry {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }
}

/// Request body for recording a watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchHistoryEntry {
    #[validate(range(min = 1))]
    pub id: i64,

    pub media_type: MediaType,

    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(max = 500))]
    pub poster_path: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub resume_position_seconds: i32,
}

impl NewWatchHistoryEntry {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id, self.media_type)
    }

    pub fn into_entry(self, last_watched_at: DateTime<Utc>) -> WatchHistoryEntry {
        WatchHistoryEntry {
            id: self.id,
            media_type: self.media_type,
            title: self.title,
            poster_path: self.poster_path,
            resume_position_seconds: self.resume_position_seconds,
            last_watched_at,
        }
    }
}
