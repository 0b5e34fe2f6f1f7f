//! Contracts for the host-provided model surfaces.
//!
//! A surface is the entry point a host exposes for one capability. Its
//! availability answer is a raw vendor signal (`"readily"`, `"downloadable"`,
//! ...), normalized later by the adapter for the slot it was installed in.

use async_trait::async_trait;
use docsmith_models::{LanguagePair, SessionOptions};
use docsmith_utils::ListenerId;
use serde_json::Value;
use std::sync::Arc;

/// Event name surfaces use for first-time model download progress.
pub const DOWNLOAD_PROGRESS_EVENT: &str = "downloadprogress";

pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Subscription side of a surface that emits events.
pub trait EventTarget: Send + Sync {
    fn add_event_listener(&self, event: &str, handler: EventHandler) -> anyhow::Result<ListenerId>;

    fn remove_event_listener(&self, event: &str, id: ListenerId) -> anyhow::Result<()>;
}

#[async_trait]
pub trait FeatureSurface: Send + Sync {
    /// Whether the surface answers availability queries at all. A surface
    /// that does not is skipped by detection.
    fn exposes_availability(&self) -> bool {
        true
    }

    /// Raw availability signal. `None` means "called with no arguments".
    async fn availability(&self, languages: Option<&LanguagePair>) -> anyhow::Result<Value>;

    async fn create(&self, options: &SessionOptions) -> anyhow::Result<Box<dyn ModelInstance>>;

    fn event_target(&self) -> Option<&dyn EventTarget> {
        None
    }
}

/// A live operational instance. `run` is `summarize` or `translate`
/// depending on how the instance was created.
#[async_trait]
pub trait ModelInstance: Send + Sync {
    async fn run(&self, input: &str) -> anyhow::Result<Value>;
}
