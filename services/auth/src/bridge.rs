//! Auth Bridge contract. The rest of the system reads identity through this
//! trait and never mutates the session directly.

use async_trait::async_trait;
use docsmith_models::{AuthSession, OtpKind};
use docsmith_utils::{Listener, ListenerId, ListenerRegistry};
use std::sync::{Arc, Weak};

use crate::error::AuthResult;

/// Receives the new session, or `None` after sign-out.
pub type SessionListener = Listener<Option<AuthSession>>;

pub type SessionListeners = ListenerRegistry<Option<AuthSession>>;

#[async_trait]
pub trait AuthBridge: Send + Sync {
    async fn current_session(&self) -> AuthResult<Option<AuthSession>>;

    fn on_session_change(&self, listener: SessionListener) -> SessionSubscription;

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<AuthSession>;

    async fn verify_one_time_code(
        &self,
        token_hash: &str,
        kind: OtpKind,
        email: Option<&str>,
    ) -> AuthResult<AuthSession>;

    async fn exchange_code(&self, code: &str) -> AuthResult<AuthSession>;

    /// Asks the provider to email a sign-in link that returns to `redirect_to`.
    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> AuthResult<()>;

    async fn sign_out(&self) -> AuthResult<()>;
}

/// Handle for a session-change listener. Dropping it unsubscribes.
#[must_use = "dropping the subscription removes the listener"]
pub struct SessionSubscription {
    registry: Weak<SessionListeners>,
    id: Option<ListenerId>,
}

impl SessionSubscription {
    pub fn new(registry: &Arc<SessionListeners>, id: ListenerId) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            id: Some(id),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let (Some(registry), Some(id)) = (self.registry.upgrade(), self.id.take()) {
            registry.remove(id);
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Registers `listener` on `registry` and wraps the id in a subscription.
pub fn subscribe(registry: &Arc<SessionListeners>, listener: SessionListener) -> SessionSubscription {
    let id = registry.add(listener);
    SessionSubscription::new(registry, id)
}
