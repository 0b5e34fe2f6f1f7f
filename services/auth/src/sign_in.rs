use docsmith_utils::validate_model;
use tracing::{info, warn};
use validator::Validate;

use crate::bridge::AuthBridge;
use crate::error::{AuthError, AuthResult};
use crate::storage::{AuthStorage, PENDING_EMAIL_KEY};

pub const EMPTY_EMAIL_MESSAGE: &str = "Please enter an email.";
pub const LINK_SENT_MESSAGE: &str = "Magic link sent. Check your email to sign in.";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send magic link.";

#[derive(Debug, Validate)]
struct MagicLinkRequest {
    #[validate(email)]
    email: String,
    #[validate(url)]
    redirect_to: String,
}

/// Sends a sign-in link and remembers the address for the verification step.
pub async fn request_magic_link(
    bridge: &dyn AuthBridge,
    storage: &dyn AuthStorage,
    email: &str,
    redirect_to: &str,
) -> AuthResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation(EMPTY_EMAIL_MESSAGE.to_string()));
    }

    let request = MagicLinkRequest {
        email: email.to_string(),
        redirect_to: redirect_to.to_string(),
    };
    validate_model(&request)
        .map_err(|error| AuthError::Validation(error.user_message()))?;

    if let Err(error) = storage.set(PENDING_EMAIL_KEY, email) {
        warn!(error = %error, "could not store pending email");
    }

    bridge
        .send_magic_link(email, redirect_to)
        .await
        .map_err(|error| AuthError::flow_from(error, SEND_FAILED_MESSAGE))?;

    info!("magic link requested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::testing::{BridgeCall, RecordingBridge};

    const REDIRECT: &str = "http://localhost:3000/auth/callback";

    #[tokio::test]
    async fn test_empty_email_rejected_without_calls() {
        let bridge = RecordingBridge::new();
        let storage = MemoryStorage::new();

        let error = request_magic_link(&bridge, &storage, "  ", REDIRECT).await.unwrap_err();
        assert_eq!(error.to_string(), EMPTY_EMAIL_MESSAGE);
        assert!(bridge.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let bridge = RecordingBridge::new();
        let storage = MemoryStorage::new();

        let error = request_magic_link(&bridge, &storage, "reader-at-example", REDIRECT)
            .await
            .unwrap_err();
        assert!(matches!(error, AuthError::Validation(_)));
        assert_eq!(storage.get(PENDING_EMAIL_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_link_sent_and_email_remembered() {
        let bridge = RecordingBridge::new();
        let storage = MemoryStorage::new();

        request_magic_link(&bridge, &storage, " reader@example.com ", REDIRECT)
            .await
            .unwrap();

        assert_eq!(
            bridge.calls(),
            vec![BridgeCall::SendMagicLink("reader@example.com".into(), REDIRECT.into())]
        );
        assert_eq!(
            storage.get(PENDING_EMAIL_KEY).unwrap().as_deref(),
            Some("reader@example.com")
        );
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_message() {
        let bridge = RecordingBridge::new().failing_send("For security purposes, you can only request this after 60 seconds.");
        let storage = MemoryStorage::new();

        let error = request_magic_link(&bridge, &storage, "reader@example.com", REDIRECT)
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "For security purposes, you can only request this after 60 seconds."
        );
    }
}
