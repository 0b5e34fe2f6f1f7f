//! Ollama Surface
//!
//! A [`FeatureSurface`] backed by a local Ollama runtime, serving one
//! capability with one model. It answers availability in whichever shape's
//! vocabulary it is installed as: a locally present model is ready, a
//! reachable runtime without the model is downloadable.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use docsmith_models::{
    language_label, Availability, CapabilityKind, LanguagePair, OutputFormat, SessionOptions, SummarizerOptions,
    SummaryLength, SurfaceShape, TranslatorOptions, AUTO_DETECT,
};
use docsmith_utils::{ListenerId, ListenerRegistry, OllamaConfig};
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::surface::{EventHandler, EventTarget, FeatureSurface, ModelInstance};

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
    #[serde(default)]
    model: Option<String>,
}

/// One NDJSON line of a `/api/pull` stream.
#[derive(Debug, Clone, PartialEq)]
enum PullLine {
    /// Byte counts for one layer; lines without a digest share one slot.
    Progress { digest: String, completed: u64, total: u64 },
    Status(String),
    Failed(String),
}

/// Byte counts of one pull, summed across layer digests. Ollama streams a
/// separate `completed`/`total` series per layer, so the per-line numbers
/// restart at zero whenever a new layer begins.
#[derive(Debug, Default)]
struct PullProgress {
    layers: HashMap<String, (u64, u64)>,
    last_emitted: Option<(u64, u64)>,
}

impl PullProgress {
    /// Records one layer sample. Returns the combined `{loaded, total}`
    /// payload only when the overall fraction moved forward.
    fn record(&mut self, digest: &str, completed: u64, total: u64) -> Option<Value> {
        let layer = self.layers.entry(digest.to_string()).or_insert((0, 0));
        layer.0 = layer.0.max(completed);
        layer.1 = layer.1.max(total);

        let (loaded, total) = self
            .layers
            .values()
            .fold((0u64, 0u64), |(loaded, total), (done, size)| {
                (loaded.saturating_add(*done), total.saturating_add(*size))
            });
        if total == 0 {
            return None;
        }

        if let Some((last_loaded, last_total)) = self.last_emitted {
            // loaded / total <= last_loaded / last_total
            if (loaded as u128) * (last_total as u128) <= (last_loaded as u128) * (total as u128) {
                return None;
            }
        }

        self.last_emitted = Some((loaded, total));
        Some(json!({ "loaded": loaded, "total": total }))
    }
}

pub struct OllamaSurface {
    client: Client,
    endpoint: String,
    model: String,
    kind: CapabilityKind,
    shape: SurfaceShape,
    probe_timeout: Duration,
    pull_timeout: Duration,
    generate_timeout: Duration,
    events: ListenerRegistry<Value>,
}

impl OllamaSurface {
    pub fn new(kind: CapabilityKind, config: &OllamaConfig) -> Self {
        let (model, shape) = match kind {
            CapabilityKind::Summarizer => (&config.summarizer_model, config.summarizer_shape),
            CapabilityKind::Translator => (&config.translator_model, config.translator_shape),
        };

        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: model.clone(),
            kind,
            shape,
            probe_timeout: Duration::from_secs(config.probe_timeout_seconds),
            pull_timeout: Duration::from_secs(config.pull_timeout_seconds),
            generate_timeout: Duration::from_secs(config.generate_timeout_seconds),
            events: ListenerRegistry::new(),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// Slot this surface should be installed in.
    pub fn shape(&self) -> SurfaceShape {
        self.shape
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn installed_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.endpoint);

        let response = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .with_context(|| format!("Cannot connect to Ollama at {}", self.endpoint))?;

        if !response.status().is_success() {
            bail!("Ollama server returned HTTP {}", response.status());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse Ollama model list")?;

        Ok(tags
            .models
            .into_iter()
            .flat_map(|m| std::iter::once(m.name).chain(m.model))
            .collect())
    }

    async fn is_installed(&self) -> Result<bool> {
        let installed = self.installed_models().await?;
        Ok(installed.iter().any(|name| model_matches(name, &self.model)))
    }

    /// Pulls the model, re-emitting byte counts as `downloadprogress`
    /// payloads.
    async fn pull(&self) -> Result<()> {
        let url = format!("{}/api/pull", self.endpoint);
        info!(model = %self.model, "pulling model");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": self.model, "stream": true }))
            .timeout(self.pull_timeout)
            .send()
            .await
            .with_context(|| format!("Failed to download model {}", self.model))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Failed to pull model (HTTP {}): {}", status, body);
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut progress = PullProgress::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read model download stream")?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line: String = buffer.drain(..=newline).collect();
                self.handle_pull_line(&line, &mut progress)?;
            }
        }

        if !buffer.trim().is_empty() {
            self.handle_pull_line(&buffer, &mut progress)?;
        }

        info!(model = %self.model, "model pulled");
        Ok(())
    }

    fn handle_pull_line(&self, line: &str, progress: &mut PullProgress) -> Result<()> {
        match parse_pull_line(line) {
            Some(PullLine::Progress { digest, completed, total }) => {
                if let Some(payload) = progress.record(&digest, completed, total) {
                    self.events.emit(&payload);
                }
            }
            Some(PullLine::Status(status)) => debug!(model = %self.model, status = %status, "pull status"),
            Some(PullLine::Failed(message)) => bail!("Failed to pull model {}: {}", self.model, message),
            None => {}
        }
        Ok(())
    }
}

#[async_trait]
impl FeatureSurface for OllamaSurface {
    async fn availability(&self, languages: Option<&LanguagePair>) -> Result<Value> {
        if let Some(pair) = languages {
            debug!(?pair, "language pair does not affect Ollama availability");
        }

        let availability = if self.is_installed().await? {
            Availability::Available
        } else {
            Availability::Downloadable
        };

        Ok(json!(availability.to_signal(self.shape)))
    }

    async fn create(&self, options: &SessionOptions) -> Result<Box<dyn ModelInstance>> {
        if options.kind() != self.kind {
            bail!("This surface serves the {} capability, not {}", self.kind, options.kind());
        }

        if !self.is_installed().await? {
            self.pull().await?;
        }

        Ok(Box::new(OllamaSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            options: options.clone(),
            timeout: self.generate_timeout,
        }))
    }

    fn event_target(&self) -> Option<&dyn EventTarget> {
        Some(self)
    }
}

impl EventTarget for OllamaSurface {
    fn add_event_listener(&self, _event: &str, handler: EventHandler) -> Result<ListenerId> {
        Ok(self.events.add(handler))
    }

    fn remove_event_listener(&self, _event: &str, id: ListenerId) -> Result<()> {
        self.events.remove(id);
        Ok(())
    }
}

struct OllamaSession {
    client: Client,
    endpoint: String,
    model: String,
    options: SessionOptions,
    timeout: Duration,
}

#[async_trait]
impl ModelInstance for OllamaSession {
    async fn run(&self, input: &str) -> Result<Value> {
        let url = format!("{}/api/generate", self.endpoint);
        let prompt = match &self.options {
            SessionOptions::Summarizer(options) => summarize_prompt(options, input),
            SessionOptions::Translator(options) => translate_prompt(options, input),
        };

        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": prompt, "stream": false }))
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to reach Ollama generate endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Ollama generate failed (HTTP {}): {}", status, body);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse Ollama generate response")?;

        if let Some(message) = body.get("error").and_then(Value::as_str) {
            bail!("{}", message);
        }

        Ok(body.get("response").cloned().unwrap_or(Value::Null))
    }
}

/// Ollama treats an untagged name as `:latest`.
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted || (!wanted.contains(':') && installed == format!("{}:latest", wanted))
}

fn parse_pull_line(line: &str) -> Option<PullLine> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(error) => {
            debug!(error = %error, "skipping malformed pull line");
            return None;
        }
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Some(PullLine::Failed(message.to_string()));
    }

    match (
        value.get("completed").and_then(Value::as_u64),
        value.get("total").and_then(Value::as_u64),
    ) {
        (Some(completed), Some(total)) => Some(PullLine::Progress {
            digest: value
                .get("digest")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            completed,
            total,
        }),
        _ => value
            .get("status")
            .and_then(Value::as_str)
            .map(|status| PullLine::Status(status.to_string())),
    }
}

fn language_name(code: &str) -> String {
    language_label(code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

fn format_instruction(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Markdown => "Format the answer as Markdown.",
        OutputFormat::PlainText => "Answer in plain text without Markdown.",
    }
}

fn summarize_prompt(options: &SummarizerOptions, text: &str) -> String {
    let length = match options.length {
        SummaryLength::Short => "Keep it brief.",
        SummaryLength::Medium => "Keep it moderately detailed.",
        SummaryLength::Long => "Be thorough.",
    };

    format!(
        "Summarize the following {} document as {}. {} Write the summary in {}. {} Reply with the summary only.\n\n{}",
        language_name(&options.language),
        options.summary_type.describe(),
        length,
        language_name(&options.output_language),
        format_instruction(options.format),
        text
    )
}

fn translate_prompt(options: &TranslatorOptions, text: &str) -> String {
    let target = language_name(&options.target_language);
    let direction = if options.source_language == AUTO_DETECT {
        format!("Detect the language of the following text and translate it to {}.", target)
    } else {
        format!(
            "Translate the following text from {} to {}.",
            language_name(&options.source_language),
            target
        )
    };

    format!(
        "{} Preserve the original structure. {} Reply with the translation only.\n\n{}",
        direction,
        format_instruction(options.format),
        text
    )
}
