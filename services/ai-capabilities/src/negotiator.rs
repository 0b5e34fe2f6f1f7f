//! Session Negotiator
//!
//! Runs one operation end to end: pick the surface, confirm it is not
//! unavailable, subscribe to progress, create the instance, run it, and
//! coerce the result to text. The availability check and the creation are
//! not atomic; a surface may change state in between.

use docsmith_models::{Availability, SessionOptions, SurfaceShape};
use serde_json::Value;
use tracing::{debug, info};

use crate::detector::CapabilityDetector;
use crate::error::{CapabilityError, CapabilityResult};
use crate::progress::{ProgressCallback, ProgressSubscription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub output: String,
    /// Availability observed at the start of the call.
    pub availability: Availability,
    pub shape: SurfaceShape,
}

#[derive(Debug, Clone)]
pub struct SessionNegotiator {
    detector: CapabilityDetector,
}

impl SessionNegotiator {
    pub fn new(detector: CapabilityDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &CapabilityDetector {
        &self.detector
    }

    pub async fn run(
        &self,
        options: &SessionOptions,
        input: &str,
        on_progress: Option<ProgressCallback>,
    ) -> CapabilityResult<SessionOutcome> {
        let kind = options.kind();
        let adapter = self
            .detector
            .select(kind)
            .ok_or(CapabilityError::Unsupported(kind))?;

        let languages = options.language_pair();
        let availability = self.detector.get_availability(kind, languages.as_ref()).await;
        if availability == Availability::Unavailable {
            return Err(CapabilityError::Unavailable(kind));
        }

        debug!(capability = %kind, shape = %adapter.shape(), availability = %availability, "creating session");

        let raw = {
            let _subscription = ProgressSubscription::attach(adapter.event_target(), on_progress);
            let instance = adapter.create_session(options).await?;
            instance.run(input).await?
        };

        let output = coerce_output(raw);
        info!(capability = %kind, shape = %adapter.shape(), chars = output.len(), "operation completed");

        Ok(SessionOutcome {
            output,
            availability,
            shape: adapter.shape(),
        })
    }
}

/// Strings pass through, null becomes empty, anything else is serialized.
pub fn coerce_output(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
