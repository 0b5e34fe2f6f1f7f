//! Supabase Auth Client
//!
//! [`AuthBridge`] implementation over the GoTrue REST API. Magic links are
//! requested with an S256 PKCE challenge; the matching verifier is kept in
//! [`AuthStorage`] until the code is exchanged.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, TimeZone, Utc};
use docsmith_models::{AuthSession, OtpKind, TokenPair};
use docsmith_utils::{AuthConfig, ListenerRegistry};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bridge::{subscribe, AuthBridge, SessionListener, SessionListeners, SessionSubscription};
use crate::error::{AuthError, AuthResult};
use crate::storage::{AuthStorage, CODE_VERIFIER_KEY, SESSION_KEY};

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<UserResponse>,
}

impl SessionResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)));

        AuthSession {
            user_id: self.user.as_ref().map(|user| user.id.clone()),
            email: self.user.and_then(|user| user.email),
            tokens: TokenPair {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
            },
            expires_at,
        }
    }
}

pub struct SupabaseAuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
    storage: Arc<dyn AuthStorage>,
    listeners: Arc<SessionListeners>,
}

impl SupabaseAuthClient {
    pub fn new(base_url: &str, anon_key: &str, storage: Arc<dyn AuthStorage>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            storage,
            listeners: Arc::new(ListenerRegistry::new()),
        }
    }

    pub fn from_config(config: &AuthConfig, storage: Arc<dyn AuthStorage>) -> AuthResult<Self> {
        if !config.is_configured() {
            return Err(AuthError::NotConfigured(
                "DOCSMITH__AUTH__SUPABASE_URL and DOCSMITH__AUTH__SUPABASE_ANON_KEY are required".to_string(),
            ));
        }
        Ok(Self::new(&config.supabase_url, &config.supabase_anon_key, storage))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn authorized(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    async fn read_session(&self, response: Response) -> AuthResult<AuthSession> {
        let response = ensure_success(response).await?;
        let body: SessionResponse = response.json().await?;
        Ok(body.into_session())
    }

    fn adopt(&self, session: AuthSession) -> AuthResult<AuthSession> {
        let serialized = serde_json::to_string(&session)?;
        self.storage.set(SESSION_KEY, &serialized)?;
        self.listeners.emit(&Some(session.clone()));
        Ok(session)
    }

    fn clear(&self) {
        if let Err(error) = self.storage.remove(SESSION_KEY) {
            warn!(error = %error, "could not clear stored session");
        }
        self.listeners.emit(&None);
    }

    fn stored_session(&self) -> AuthResult<Option<AuthSession>> {
        match self.storage.get(SESSION_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        let response = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let session = self.read_session(response).await?;
        self.adopt(session)
    }
}

#[async_trait]
impl AuthBridge for SupabaseAuthClient {
    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        let session = match self.stored_session()? {
            Some(session) => session,
            None => return Ok(None),
        };

        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        debug!("stored session expired, refreshing");
        match self.refresh(&session.tokens.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                warn!(error = %error, "session refresh failed, signing out locally");
                self.clear();
                Ok(None)
            }
        }
    }

    fn on_session_change(&self, listener: SessionListener) -> SessionSubscription {
        subscribe(&self.listeners, listener)
    }

    async fn set_session(&self, access_token: &str, refresh_token: &str) -> AuthResult<AuthSession> {
        let response = self.authorized(Method::GET, "user", access_token).send().await?;
        let response = ensure_success(response).await?;
        let user: UserResponse = response.json().await?;

        self.adopt(AuthSession {
            user_id: Some(user.id),
            email: user.email,
            tokens: TokenPair {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
            },
            expires_at: None,
        })
    }

    async fn verify_one_time_code(
        &self,
        token_hash: &str,
        kind: OtpKind,
        email: Option<&str>,
    ) -> AuthResult<AuthSession> {
        let mut body = json!({ "type": kind.as_str(), "token_hash": token_hash });
        if let Some(email) = email {
            body["email"] = Value::String(email.to_string());
        }

        let response = self.request(Method::POST, "verify").json(&body).send().await?;
        let session = self.read_session(response).await?;
        info!(kind = %kind, "one-time code verified");
        self.adopt(session)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<AuthSession> {
        let verifier = self
            .storage
            .get(CODE_VERIFIER_KEY)?
            .ok_or_else(|| AuthError::flow("PKCE code verifier not found in storage."))?;

        let response = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "pkce")])
            .json(&json!({ "auth_code": code, "code_verifier": verifier }))
            .send()
            .await?;
        let session = self.read_session(response).await?;

        if let Err(error) = self.storage.remove(CODE_VERIFIER_KEY) {
            warn!(error = %error, "could not clear code verifier");
        }
        self.adopt(session)
    }

    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> AuthResult<()> {
        let verifier = generate_code_verifier();
        self.storage.set(CODE_VERIFIER_KEY, &verifier)?;

        let response = self
            .request(Method::POST, "otp")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": email,
                "create_user": true,
                "code_challenge": code_challenge(&verifier),
                "code_challenge_method": "s256",
            }))
            .send()
            .await?;
        ensure_success(response).await?;

        debug!("magic link requested from provider");
        Ok(())
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if let Some(session) = self.stored_session()? {
            let result = self
                .authorized(Method::POST, "logout", &session.tokens.access_token)
                .send()
                .await;

            match result {
                Ok(response) => {
                    if let Err(error) = ensure_success(response).await {
                        debug!(error = %error, "provider rejected logout, clearing local session anyway");
                    }
                }
                Err(error) => warn!(error = %error, "logout request failed, clearing local session anyway"),
            }
        }

        self.clear();
        info!("signed out");
        Ok(())
    }
}

/// 64 hex characters, inside the 43..=128 range PKCE allows.
pub fn generate_code_verifier() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

async fn ensure_success(response: Response) -> AuthResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Provider {
        status: status.as_u16(),
        message: provider_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
    })
}

/// GoTrue reports errors under several keys depending on the endpoint.
fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
