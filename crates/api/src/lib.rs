//! CineHub Synchronization API
//!
//! Durable per-user watchlist, favorites, favorite actors and watch history
//! behind a JWT protected REST interface.

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod server;

pub use auth::{AuthenticatedUser, Claims, JwtVerifier};
pub use error::{ApiError, Result};
pub use repository::{
    CollectionRepository, InMemoryCollectionRepository, PostgresCollectionRepository,
};
pub use server::{configure, start_server, AppState};
