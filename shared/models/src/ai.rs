use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{CapabilityKind, LanguagePair};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryType {
    #[serde(rename = "tl;dr")]
    TlDr,
    #[serde(rename = "key-points")]
    KeyPoints,
    #[serde(rename = "teaser")]
    Teaser,
    #[serde(rename = "headline")]
    Headline,
}

impl SummaryType {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::TlDr => "a short tl;dr overview",
            Self::KeyPoints => "a list of the key points",
            Self::Teaser => "an engaging teaser",
            Self::Headline => "a single headline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Markdown,
    PlainText,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plain-text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

/// Creation options for a summarizer instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizerOptions {
    #[serde(rename = "type")]
    pub summary_type: SummaryType,
    pub format: OutputFormat,
    pub length: SummaryLength,
    pub language: String,
    pub output_language: String,
}

impl Default for SummarizerOptions {
    fn default() -> Self {
        Self {
            summary_type: SummaryType::KeyPoints,
            format: OutputFormat::Markdown,
            length: SummaryLength::Medium,
            language: "en".to_string(),
            output_language: "en".to_string(),
        }
    }
}

/// Creation options for a translator instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorOptions {
    pub source_language: String,
    pub target_language: String,
    pub format: OutputFormat,
}

/// Capability-specific options handed to a surface when creating an
/// operational instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionOptions {
    Summarizer(SummarizerOptions),
    Translator(TranslatorOptions),
}

impl SessionOptions {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Summarizer(_) => CapabilityKind::Summarizer,
            Self::Translator(_) => CapabilityKind::Translator,
        }
    }

    /// The pair used for availability probes. Summarizer sessions carry none.
    pub fn language_pair(&self) -> Option<LanguagePair> {
        match self {
            Self::Summarizer(_) => None,
            Self::Translator(options) => Some(LanguagePair::new(
                Some(&options.target_language),
                Some(&options.source_language),
            )),
        }
    }
}

/// One download-progress sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub loaded: f64,
    pub total: f64,
}

impl ProgressEvent {
    pub fn new(loaded: f64, total: f64) -> Self {
        Self { loaded, total }
    }

    /// Normalizes a raw event payload. Fields may sit at the top level or
    /// under a `detail` wrapper; top-level wins when present. Missing or
    /// non-numeric fields become zero.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            loaded: numeric_field(payload, "loaded"),
            total: numeric_field(payload, "total"),
        }
    }

    /// Whole percentage clamped to 100, or `None` while the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total > 0.0 {
            let pct = ((self.loaded / self.total) * 100.0).round().clamp(0.0, 100.0);
            Some(pct as u8)
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0.0 && self.loaded >= self.total
    }
}

fn numeric_field(payload: &Value, field: &str) -> f64 {
    let raw = match payload.get(field) {
        Some(v) if !v.is_null() => Some(v),
        _ => payload.get("detail").and_then(|d| d.get(field)),
    };

    let number = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    number.filter(|n| n.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResult {
    pub summary: String,
    pub first_time_download: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}
