//! Client-side contract of the Synchronization API

use crate::error::ApiError;
use crate::record::CollectionRecord;
use async_trait::async_trait;

/// List/add/remove operations for one collection, scoped to an owner identity
///
/// Implementations must not fall back to another identity's credentials when
/// `owner` is not the signed-in user.
#[async_trait]
pub trait CollectionEndpoint<R: CollectionRecord>: Send + Sync {
    /// Full collection of `owner`, in server order
    async fn list(&self, owner: &str) -> Result<Vec<R>, ApiError>;

    /// Create a record; the server answers with the confirmed row
    async fn add(&self, owner: &str, draft: &R::Draft) -> Result<R, ApiError>;

    /// Delete by key. An absent record yields `ApiError::NotFound`.
    async fn remove(&self, owner: &str, key: &R::Key) -> Result<(), ApiError>;
}
