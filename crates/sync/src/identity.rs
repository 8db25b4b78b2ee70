//! Authenticated identity of the local session
//!
//! The provider publishes the signed-in session through a watch channel so the
//! reconciler observes logins, logouts and account switches.
use std::fmt;
use tokio::sync::watch;
use tracing::info;

/// Signed-in user and the bearer token for the Synchronization API
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: String,
    pub access_token: String,
}

impl Session {
    pub fn new(identity: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Hands out credentials for an owner identity
pub trait TokenSource: Send + Sync {
    /// Bearer token for `owner`, only while `owner` is the signed-in identity
    fn bearer_token(&self, owner: &str) -> Option<String>;
}

/// Source of truth for the current session
pub struct IdentityProvider {
    tx: watch::Sender<Option<Session>>,
}

impl IdentityProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn login(&self, session: Session) {
        info!("Identity signed in: {}", session.identity);
        self.tx.send_replace(Some(session));
    }

    pub fn logout(&self) {
        if let Some(previous) = self.tx.send_replace(None) {
            info!("Identity signed out: {}", previous.identity);
        }
    }

    pub fn current_identity(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.identity.clone())
    }

    /// Change stream; the receiver sees the current value first
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for IdentityProvider {
    fn bearer_token(&self, owner: &str) -> Option<String> {
        self.tx
            .borrow()
            .as_ref()
            .filter(|s| s.identity == owner)
            .map(|s| s.access_token.clone())
    }
}
