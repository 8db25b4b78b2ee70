//! # CineHub Core
//!
//! Shared building blocks for the CineHub services and clients.
//!
//! ## Modules
//!
//! - `models`: Collection items, favorite actors, watch history and their request bodies
//! - `error`: Error types and handling
//! - `config`: Configuration loading and validation
//! - `database`: Shared PostgreSQL connection pool
//! - `observability`: Tracing subscriber initialization

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod observability;

// Re-export commonly used types
pub use config::{
    load_dotenv, AuthConfig, ClientConfig, ConfigLoader, DatabaseConfig, ServiceConfig,
};
pub use database::DatabasePool;
pub use error::CineHubError;
pub use models::{
    CollectionItem, CollectionKind, FavoriteActor, ItemEnvelope, ItemKey, ItemsEnvelope,
    MediaType, NewCollectionItem, NewFavoriteActor, NewWatchHistoryEntry, WatchHistoryEntry,
};
pub use observability::{init_tracing, LogFormat};

/// Result type alias for CineHub operations
pub type Result<T> = std::result::Result<T, CineHubError>;
