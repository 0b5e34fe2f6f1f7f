use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity of the current user. Owned by the auth bridge; the rest of the
/// system only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub tokens: TokenPair,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }
}

/// Kinds of one-time codes accepted by the token-hash redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    MagicLink,
    Recovery,
}

impl OtpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MagicLink => "magiclink",
            Self::Recovery => "recovery",
        }
    }
}

impl FromStr for OtpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magiclink" => Ok(Self::MagicLink),
            "recovery" => Ok(Self::Recovery),
            other => Err(format!("unsupported one-time code type '{}'", other)),
        }
    }
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_otp_kind_parsing() {
        assert_eq!("magiclink".parse::<OtpKind>(), Ok(OtpKind::MagicLink));
        assert_eq!("recovery".parse::<OtpKind>(), Ok(OtpKind::Recovery));
        assert!("signup".parse::<OtpKind>().is_err());
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = AuthSession {
            user_id: None,
            email: Some("reader@example.com".to_string()),
            tokens: TokenPair {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            },
            expires_at: Some(now - Duration::seconds(1)),
        };
        assert!(session.is_expired(now));
        assert!(!AuthSession { expires_at: None, ..session }.is_expired(now));
    }
}
