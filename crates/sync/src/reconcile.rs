//! Identity-change reconciliation
//!
//! Binds the collection managers to the authenticated identity. Owners are
//! switched synchronously with each observed change; fetches for the new owner
//! run afterwards. On logout the previous owner's cached snapshots are purged.

use crate::cache::CollectionCache;
use crate::context::SessionContext;
use crate::identity::Session;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct IdentityReconciler {
    context: Arc<SessionContext>,
    cache: Option<Arc<CollectionCache>>,
}

impl IdentityReconciler {
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self {
            context,
            cache: None,
        }
    }

    /// Purge this cache on logout
    pub fn with_cache(mut self, cache: Arc<CollectionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Point every manager at `identity` without fetching
    ///
    /// Returns true if the owner changed.
    pub fn apply_identity(&self, identity: Option<String>) -> bool {
        let previous = self.context.owner();
        let signed_out = identity.is_none();

        if !self.context.reset_owner(identity) {
            return false;
        }

        if signed_out {
            if let (Some(previous), Some(cache)) = (previous, &self.cache) {
                match cache.purge_owner(&previous) {
                    Ok(removed) => info!(owner = %previous, removed, "Purged cache after logout"),
                    Err(e) => warn!(owner = %previous, error = %e, "Failed to purge cache after logout"),
                }
            }
        }

        true
    }

    /// Apply `identity` and wait for the new owner's collections to load
    pub async fn reconcile(&self, identity: Option<String>) {
        if self.apply_identity(identity) && self.context.owner().is_some() {
            // Failures are recorded on the managers
            let _ = self.context.fetch_all().await;
        }
    }

    /// Follow the identity stream until the provider is dropped
    ///
    /// The current value is applied first. Fetches are spawned so a slow
    /// response never delays the reset for the next identity.
    pub async fn run(self, mut identities: watch::Receiver<Option<Session>>) {
        loop {
            let identity = identities
                .borrow_and_update()
                .as_ref()
                .map(|s| s.identity.clone());

            if self.apply_identity(identity.clone()) && identity.is_some() {
                let context = self.context.clone();
                tokio::spawn(async move {
                    let _ = context.fetch_all().await;
                });
            }

            if identities.changed().await.is_err() {
                debug!("Identity provider closed, stopping reconciler");
                break;
            }
        }
    }

    /// Run on the tokio runtime
    pub fn spawn(self, identities: watch::Receiver<Option<Session>>) -> JoinHandle<()> {
        tokio::spawn(self.run(identities))
    }
}
