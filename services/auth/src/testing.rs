//! Recording bridge double used by the flow tests.

use async_trait::async_trait;
use docsmith_models::{AuthSession, OtpKind, TokenPair};
use docsmith_utils::ListenerRegistry;
use std::sync::{Arc, Mutex};

use crate::bridge::{subscribe, AuthBridge, SessionListener, SessionListeners, SessionSubscription};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    SetSession(String, String),
    VerifyOneTimeCode(String, OtpKind, Option<String>),
    ExchangeCode(String),
    SendMagicLink(String, String),
    SignOut,
}

#[derive(Default)]
pub struct RecordingBridge {
    calls: Mutex<Vec<BridgeCall>>,
    session: Mutex<Option<AuthSession>>,
    fail_set_session: Option<String>,
    fail_verify: Option<String>,
    fail_exchange: Option<String>,
    fail_send: Option<String>,
    listeners: Arc<SessionListeners>,
}

pub fn session_for(email: &str) -> AuthSession {
    AuthSession {
        user_id: Some("user-1".to_string()),
        email: Some(email.to_string()),
        tokens: TokenPair {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        },
        expires_at: None,
    }
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(ListenerRegistry::new()),
            ..Self::default()
        }
    }

    pub fn failing_set_session(mut self, message: &str) -> Self {
        self.fail_set_session = Some(message.to_string());
        self
    }

    pub fn failing_verify(mut self, message: &str) -> Self {
        self.fail_verify = Some(message.to_string());
        self
    }

    pub fn failing_exchange(mut self, message: &str) -> Self {
        self.fail_exchange = Some(message.to_string());
        self
    }

    pub fn failing_send(mut self, message: &str) -> Self {
        self.fail_send = Some(message.to_string());
        self
    }

    pub fn signed_in_as(self, email: &str) -> Self {
        *self.session.lock().unwrap() = Some(session_for(email));
        self
    }

    pub fn calls(&self) -> Vec<BridgeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BridgeCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn adopt(&self, failure: &Option<String>, email: &str) -> AuthResult<AuthSession> {
        if let Some(message) = failure {
            return Err(AuthError::Provider {
                status: 400,
                message: message.clone(),
            });
        }
        let session = session_for(email);
        *self.session.lock().unwrap() = Some(session.clone());
        self.listeners.emit(&Some(session.clone()));
        Ok(session)
    }
}

#[async_trait]
impl AuthBridge for RecordingBridge {
    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn on_session_change(&self, listener: SessionListener) -> SessionSubscription {
        subscribe(&self.listeners, listener)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<AuthSession> {
        self.record(BridgeCall::SetSession(access_token.to_string(), refresh_token.to_string()));
        self.adopt(&self.fail_set_session, "fragment@example.com")
    }

    async fn verify_one_time_code(
        &self,
        token_hash: &str,
        kind: OtpKind,
        email: Option<&str>,
    ) -> AuthResult<AuthSession> {
        self.record(BridgeCall::VerifyOneTimeCode(
            token_hash.to_string(),
            kind,
            email.map(str::to_string),
        ));
        self.adopt(&self.fail_verify, email.unwrap_or("otp@example.com"))
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<AuthSession> {
        self.record(BridgeCall::ExchangeCode(code.to_string()));
        self.adopt(&self.fail_exchange, "pkce@example.com")
    }

    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> AuthResult<()> {
        self.record(BridgeCall::SendMagicLink(email.to_string(), redirect_to.to_string()));
        match &self.fail_send {
            Some(message) => Err(AuthError::Provider {
                status: 429,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.record(BridgeCall::SignOut);
        *self.session.lock().unwrap() = None;
        self.listeners.emit(&None);
        Ok(())
    }
}
