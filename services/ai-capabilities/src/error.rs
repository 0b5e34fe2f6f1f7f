use docsmith_models::CapabilityKind;
use docsmith_utils::DocSmithError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("On-device {0} API is not supported in this environment.")]
    Unsupported(CapabilityKind),

    #[error("{} unavailable. Enable on-device AI or install the model runtime.", display_name(.0))]
    Unavailable(CapabilityKind),

    #[error("{0}")]
    Validation(String),

    /// Creation or operation failure reported by the surface, passed through
    /// untouched.
    #[error(transparent)]
    Surface(#[from] anyhow::Error),
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

fn display_name(kind: &CapabilityKind) -> &'static str {
    match kind {
        CapabilityKind::Summarizer => "Summarizer",
        CapabilityKind::Translator => "Translator",
    }
}

impl From<CapabilityError> for DocSmithError {
    fn from(error: CapabilityError) -> Self {
        match error {
            CapabilityError::Unsupported(kind) => DocSmithError::capability_unsupported(kind.as_str()),
            CapabilityError::Unavailable(kind) => DocSmithError::capability_unavailable(display_name(&kind)),
            CapabilityError::Validation(message) => DocSmithError::validation("text", message),
            CapabilityError::Surface(error) => DocSmithError::external_service("on-device model", error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_application_taxonomy() {
        let local = CapabilityError::Unavailable(CapabilityKind::Translator);
        let message = local.to_string();
        let app: DocSmithError = local.into();

        assert_eq!(app.error_code(), "CAPABILITY_UNAVAILABLE");
        assert_eq!(app.to_string(), message);

        let local = CapabilityError::Unsupported(CapabilityKind::Summarizer);
        let message = local.to_string();
        let app: DocSmithError = local.into();
        assert_eq!(app.user_message(), message);
    }

    #[test]
    fn test_surface_error_is_transparent() {
        let error = CapabilityError::from(anyhow::anyhow!("model crashed"));
        assert_eq!(error.to_string(), "model crashed");

        let app: DocSmithError = error.into();
        assert_eq!(app.user_message(), "model crashed");
    }
}
