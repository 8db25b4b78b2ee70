//! Favorite actor models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A person the user marked as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteActor {
    /// Surrogate id assigned by the server
    pub id: Uuid,
    /// External catalog person id, unique per user
    pub actor_id: i64,
    pub name: String,
    pub profile_path: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Request body for favoriting an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewFavoriteActor {
    #[validate(range(min = 1))]
    pub actor_id: i64,

    #[validate(length(min = 1, max = 300))]
    pub name: String,

    #[validate(length(max = 500))]
    pub profile_path: Option<String>,
}

impl NewFavoriteActor {
    pub fn into_actor(self, id: Uuid, added_at: DateTime<Utc>) -> FavoriteActor {
        FavoriteActor {
            id,
            actor_id: self.actor_id,
            name: self.name,
            profile_path: self.profile_path,
            added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_wire_format_is_snake_case() {
        let actor = NewFavoriteActor {
            actor_id: 287,
            name: "Brad Pitt".to_string(),
            profile_path: None,
        }
        .into_actor(Uuid::new_v4(), Utc::now());

        let json = serde_json::to_value(&actor).unwrap();
        assert_eq!(json["actor_id"], 287);
        assert!(json["profile_path"].is_null());
        assert!(json.get("added_at").is_some());
    }

    #[test]
    fn test_new_actor_validation() {
        let valid = NewFavoriteActor {
            actor_id: 287,
            name: "Brad Pitt".to_string(),
            profile_path: None,
        };
        assert!(valid.validate().is_ok());

        let nameless = NewFavoriteActor {
            name: String::new(),
            ..valid
        };
        assert!(nameless.validate().is_err());
    }
}
