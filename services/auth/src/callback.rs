//! Redirect completion
//!
//! A sign-in redirect carries one of three shapes, handled in fixed order:
//! session tokens in the fragment, a `token_hash` + `type` pair in the
//! query, or a PKCE `code` in the query. A failing fragment falls through to
//! the query shapes; a failing query shape ends the flow.

use docsmith_models::OtpKind;
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::AuthBridge;
use crate::error::{AuthError, AuthResult};
use crate::storage::{AuthStorage, PENDING_EMAIL_KEY};

pub const MISSING_PARAMETERS_MESSAGE: &str = "Missing auth parameters in callback URL.";
pub const VERIFY_FAILED_MESSAGE: &str = "Failed to verify magic link.";
pub const EXCHANGE_FAILED_MESSAGE: &str = "Failed to complete sign-in.";
pub const SIGNED_IN_MESSAGE: &str = "Signed in successfully.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_hash: Option<String>,
    pub otp_type: Option<String>,
    pub code: Option<String>,
    /// The URL with its fragment removed.
    pub clean_url: String,
}

impl RedirectParams {
    pub fn parse(raw: &str) -> AuthResult<Self> {
        let url = Url::parse(raw).map_err(|e| AuthError::flow(format!("Invalid callback URL: {}", e)))?;
        let mut params = Self::default();

        if let Some(fragment) = url.fragment() {
            for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
                match key.as_ref() {
                    "access_token" => params.access_token = non_empty(value.into_owned()),
                    "refresh_token" => params.refresh_token = non_empty(value.into_owned()),
                    _ => {}
                }
            }
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "token_hash" => params.token_hash = non_empty(value.into_owned()),
                "type" => params.otp_type = non_empty(value.into_owned()),
                "code" => params.code = non_empty(value.into_owned()),
                _ => {}
            }
        }

        let mut clean = url;
        clean.set_fragment(None);
        params.clean_url = clean.to_string();

        Ok(params)
    }

    pub fn fragment_tokens(&self) -> Option<(&str, &str)> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some((access.as_str(), refresh.as_str())),
            _ => None,
        }
    }

    /// Only `magiclink` and `recovery` qualify.
    pub fn one_time_code(&self) -> Option<(&str, OtpKind)> {
        let hash = self.token_hash.as_deref()?;
        let kind = self.otp_type.as_deref()?.parse::<OtpKind>().ok()?;
        Some((hash, kind))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMethod {
    Fragment,
    OneTimeCode,
    CodeExchange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub method: CompletionMethod,
    pub email: Option<String>,
    /// Set when the fragment carried the tokens and should be dropped.
    pub clean_url: Option<String>,
}

pub async fn complete_sign_in(
    bridge: &dyn AuthBridge,
    storage: &dyn AuthStorage,
    url: &str,
) -> AuthResult<CallbackOutcome> {
    let params = RedirectParams::parse(url)?;

    if let Some((access_token, refresh_token)) = params.fragment_tokens() {
        match bridge.set_session(access_token, refresh_token).await {
            Ok(session) => {
                info!("signed in from fragment tokens");
                return Ok(CallbackOutcome {
                    method: CompletionMethod::Fragment,
                    email: session.email,
                    clean_url: Some(params.clean_url.clone()),
                });
            }
            Err(error) => debug!(error = %error, "fragment session rejected, trying query parameters"),
        }
    }

    if let Some((token_hash, kind)) = params.one_time_code() {
        let pending_email = storage.get(PENDING_EMAIL_KEY).unwrap_or_else(|error| {
            warn!(error = %error, "could not read pending email");
            None
        });

        let session = bridge
            .verify_one_time_code(token_hash, kind, pending_email.as_deref())
            .await
            .map_err(|error| AuthError::flow_from(error, VERIFY_FAILED_MESSAGE))?;

        if let Err(error) = storage.remove(PENDING_EMAIL_KEY) {
            warn!(error = %error, "could not clear pending email");
        }

        info!(kind = %kind, "signed in with one-time code");
        return Ok(CallbackOutcome {
            method: CompletionMethod::OneTimeCode,
            email: session.email,
            clean_url: None,
        });
    }

    if let Some(code) = params.code.as_deref() {
        let session = bridge
            .exchange_code(code)
            .await
            .map_err(|error| AuthError::flow_from(error, EXCHANGE_FAILED_MESSAGE))?;

        info!("signed in with code exchange");
        return Ok(CallbackOutcome {
            method: CompletionMethod::CodeExchange,
            email: session.email,
            clean_url: None,
        });
    }

    Err(AuthError::flow(MISSING_PARAMETERS_MESSAGE))
}

/// Email of the signed-in user, if any. When `url` carries fragment tokens
/// they are adopted first on a best-effort basis.
pub async fn current_identity(bridge: &dyn AuthBridge, url: Option<&str>) -> AuthResult<Option<String>> {
    if let Some(url) = url {
        match RedirectParams::parse(url) {
            Ok(params) => {
                if let Some((access_token, refresh_token)) = params.fragment_tokens() {
                    if let Err(error) = bridge.set_session(access_token, refresh_token).await {
                        debug!(error = %error, "ignoring fragment tokens");
                    }
                }
            }
            Err(error) => debug!(error = %error, "ignoring unparsable URL"),
        }
    }

    Ok(bridge.current_session().await?.and_then(|session| session.email))
}
