use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which on-device model feature is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Summarizer,
    Translator,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarizer => "summarizer",
            Self::Translator => "translator",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state readiness of an on-device model.
///
/// Recomputed on demand and never cached beyond a single check: a download
/// may complete between two queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Downloadable,
    Unavailable,
}

impl Availability {
    /// Maps the vocabulary of the modern surface (`readily`, `after-download`).
    /// Anything else, including non-string values, is `Unavailable`.
    pub fn from_modern_signal(signal: &Value) -> Self {
        match signal.as_str() {
            Some("readily") => Self::Available,
            Some("after-download") => Self::Downloadable,
            _ => Self::Unavailable,
        }
    }

    /// Maps the vocabulary of the legacy surface (`available`, `downloadable`).
    pub fn from_legacy_signal(signal: &Value) -> Self {
        match signal.as_str() {
            Some("available") => Self::Available,
            Some("downloadable") => Self::Downloadable,
            _ => Self::Unavailable,
        }
    }

    /// The raw value a surface of the given shape would report for this state.
    pub fn to_signal(&self, shape: SurfaceShape) -> &'static str {
        match (shape, self) {
            (SurfaceShape::Modern, Self::Available) => "readily",
            (SurfaceShape::Modern, Self::Downloadable) => "after-download",
            (SurfaceShape::Modern, Self::Unavailable) => "no",
            (SurfaceShape::Legacy, Self::Available) => "available",
            (SurfaceShape::Legacy, Self::Downloadable) => "downloadable",
            (SurfaceShape::Legacy, Self::Unavailable) => "unavailable",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Downloadable => "downloadable",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two mutually exclusive entry points a host may expose for the same
/// capability. Probed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceShape {
    Modern,
    Legacy,
}

impl SurfaceShape {
    pub const PRIORITY: [SurfaceShape; 2] = [SurfaceShape::Modern, SurfaceShape::Legacy];

    pub fn map_signal(&self, signal: &Value) -> Availability {
        match self {
            Self::Modern => Availability::from_modern_signal(signal),
            Self::Legacy => Availability::from_legacy_signal(signal),
        }
    }
}

impl fmt::Display for SurfaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modern => f.write_str("modern"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// Language pair passed to a translator availability query.
///
/// `None` on both sides means "no arguments"; legacy surfaces that require
/// an explicit pair may reject such a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
}

impl LanguagePair {
    pub fn new(target: Option<&str>, source: Option<&str>) -> Self {
        Self {
            source_language: source.filter(|s| !s.is_empty()).map(str::to_string),
            target_language: target.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    pub fn target_only(target: &str) -> Self {
        Self::new(Some(target), None)
    }

    pub fn is_empty(&self) -> bool {
        self.source_language.is_none() && self.target_language.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_modern_signal_mapping() {
        assert_eq!(Availability::from_modern_signal(&json!("readily")), Availability::Available);
        assert_eq!(
            Availability::from_modern_signal(&json!("after-download")),
            Availability::Downloadable
        );
        assert_eq!(Availability::from_modern_signal(&json!("no")), Availability::Unavailable);
        // The legacy vocabulary means nothing to the modern surface
        assert_eq!(Availability::from_modern_signal(&json!("available")), Availability::Unavailable);
        assert_eq!(Availability::from_modern_signal(&Value::Null), Availability::Unavailable);
    }

    #[test]
    fn test_legacy_signal_mapping() {
        assert_eq!(Availability::from_legacy_signal(&json!("available")), Availability::Available);
        assert_eq!(
            Availability::from_legacy_signal(&json!("downloadable")),
            Availability::Downloadable
        );
        assert_eq!(Availability::from_legacy_signal(&json!("downloading")), Availability::Unavailable);
        assert_eq!(Availability::from_legacy_signal(&json!(1)), Availability::Unavailable);
    }

    #[test]
    fn test_signal_round_trip_per_shape() {
        for shape in SurfaceShape::PRIORITY {
            for state in [Availability::Available, Availability::Downloadable, Availability::Unavailable] {
                let raw = json!(state.to_signal(shape));
                assert_eq!(shape.map_signal(&raw), state);
            }
        }
    }

    #[test]
    fn test_language_pair_drops_empty_codes() {
        let pair = LanguagePair::new(Some(""), Some("en"));
        assert_eq!(pair.target_language, None);
        assert_eq!(pair.source_language.as_deref(), Some("en"));
        assert!(LanguagePair::new(None, None).is_empty());
    }

    #[test]
    fn test_language_pair_serializes_camel_case() {
        let pair = LanguagePair::new(Some("es"), Some("en"));
        let value = serde_json::to_value(&pair).unwrap();
        assert_eq!(value, json!({"sourceLanguage": "en", "targetLanguage": "es"}));
    }
}
