//! Per-owner collection mirrors
//!
//! - `state`: entry state machine and snapshot type
//! - `manager`: async operations against a `CollectionEndpoint`
pub mod manager;
pub mod state;

pub use manager::{CollectionManager, FavoriteActorManager, TitleCollectionManager, FAVORITE_ACTORS};
pub use state::{CollectionState, EntryState};
