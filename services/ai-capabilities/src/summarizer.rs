//! Summarization Facade

use docsmith_models::{Availability, CapabilityKind, SessionOptions, SummarizeResult, SummarizerOptions};
use std::sync::Mutex;
use tracing::debug;

use crate::detector::CapabilityDetector;
use crate::error::{CapabilityError, CapabilityResult};
use crate::negotiator::SessionNegotiator;
use crate::progress::ProgressCallback;

#[derive(Debug, Default, Clone, Copy)]
struct ReadyState {
    initialized: bool,
    first_time: bool,
}

/// Long-lived summarizer wrapper. Holds no per-call state beyond the
/// first-time flag from its most recent readiness check.
#[derive(Debug)]
pub struct LocalSummarizer {
    negotiator: SessionNegotiator,
    options: SummarizerOptions,
    ready: Mutex<ReadyState>,
}

impl LocalSummarizer {
    pub fn new(detector: CapabilityDetector) -> Self {
        Self {
            negotiator: SessionNegotiator::new(detector),
            options: SummarizerOptions::default(),
            ready: Mutex::new(ReadyState::default()),
        }
    }

    pub fn with_options(mut self, options: SummarizerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SummarizerOptions {
        &self.options
    }

    pub async fn check_availability(&self) -> Availability {
        self.negotiator
            .detector()
            .get_availability(CapabilityKind::Summarizer, None)
            .await
    }

    /// Confirms a surface exists and is not unavailable. Returns whether the
    /// next run may trigger a first-time download.
    pub async fn ensure_ready(&self) -> CapabilityResult<bool> {
        if self.negotiator.detector().select(CapabilityKind::Summarizer).is_none() {
            return Err(CapabilityError::Unsupported(CapabilityKind::Summarizer));
        }

        let availability = self.check_availability().await;
        if availability == Availability::Unavailable {
            return Err(CapabilityError::Unavailable(CapabilityKind::Summarizer));
        }

        let first_time = availability == Availability::Downloadable;
        self.set_ready(first_time);
        Ok(first_time)
    }

    /// `first_time_download` is true exactly when the availability seen at
    /// the start of this call was `Downloadable`.
    pub async fn run(&self, text: &str, on_progress: Option<ProgressCallback>) -> CapabilityResult<SummarizeResult> {
        if text.trim().is_empty() {
            return Err(CapabilityError::Validation(
                "Nothing to summarize: the input text is empty.".to_string(),
            ));
        }

        let checked_first_time = if self.is_initialized() {
            None
        } else {
            Some(self.ensure_ready().await?)
        };

        let options = SessionOptions::Summarizer(self.options.clone());
        let outcome = self.negotiator.run(&options, text, on_progress).await?;

        let first_time_download =
            checked_first_time.unwrap_or(outcome.availability == Availability::Downloadable);
        self.set_ready(first_time_download);
        debug!(first_time_download, shape = %outcome.shape, "summary produced");

        Ok(SummarizeResult {
            summary: outcome.output,
            first_time_download,
        })
    }

    fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    fn set_ready(&self, first_time: bool) {
        *self.lock() = ReadyState {
            initialized: true,
            first_time,
        };
    }

    /// First-time flag from the latest readiness check or run.
    pub fn first_time(&self) -> bool {
        self.lock().first_time
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReadyState> {
        self.ready.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
