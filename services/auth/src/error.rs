use docsmith_utils::DocSmithError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// A redirect-completion step failed.
    #[error("{0}")]
    Flow(String),

    /// Error body returned by the auth provider.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Auth is not configured: {0}")]
    NotConfigured(String),

    #[error("Auth storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn flow(message: impl Into<String>) -> Self {
        Self::Flow(message.into())
    }

    /// Flow failure carrying the underlying message, or `fallback` when the
    /// underlying error has none.
    pub fn flow_from(error: AuthError, fallback: &str) -> Self {
        let message = error.to_string();
        if message.trim().is_empty() {
            Self::Flow(fallback.to_string())
        } else {
            Self::Flow(message)
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<AuthError> for DocSmithError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(message) => DocSmithError::validation("email", message),
            AuthError::NotConfigured(message) => DocSmithError::configuration(message),
            other => DocSmithError::auth_flow(other.to_string()),
        }
    }
}
