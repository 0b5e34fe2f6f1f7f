use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level error taxonomy. Crate-local errors convert into this
/// at the point where a user action reports its outcome.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum DocSmithError {
    #[error("On-device {capability} API is not supported in this environment.")]
    CapabilityUnsupported { capability: String },

    #[error("{capability} unavailable. Enable on-device AI or install the model runtime.")]
    CapabilityUnavailable { capability: String },

    #[error("Extraction error: {message}")]
    Extraction { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Authentication error: {message}")]
    AuthFlow { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DocSmithError {
    pub fn capability_unsupported(capability: impl Into<String>) -> Self {
        Self::CapabilityUnsupported {
            capability: capability.into(),
        }
    }

    pub fn capability_unavailable(capability: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability: capability.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn auth_flow(message: impl Into<String>) -> Self {
        Self::AuthFlow {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CapabilityUnsupported { .. } => "CAPABILITY_UNSUPPORTED",
            Self::CapabilityUnavailable { .. } => "CAPABILITY_UNAVAILABLE",
            Self::Extraction { .. } => "EXTRACTION_FAILURE",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::AuthFlow { .. } => "AUTH_FLOW_FAILURE",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. }
            | Self::Extraction { message }
            | Self::AuthFlow { message }
            | Self::ExternalService { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type DocSmithResult<T> = Result<T, DocSmithError>;

impl From<std::io::Error> for DocSmithError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<::config::ConfigError> for DocSmithError {
    fn from(error: ::config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
