//! Download-progress plumbing between a surface's event stream and a
//! caller-supplied callback.

use docsmith_models::ProgressEvent;
use docsmith_utils::ListenerId;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::surface::{EventHandler, EventTarget, DOWNLOAD_PROGRESS_EVENT};

/// Called synchronously from the surface's event dispatch. Must not block.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Scoped `downloadprogress` listener. Removed when dropped, on every exit
/// path of the operation it wraps.
pub struct ProgressSubscription<'a> {
    target: Option<&'a dyn EventTarget>,
    id: Option<ListenerId>,
}

impl<'a> ProgressSubscription<'a> {
    /// Registers `callback` on `target` when both exist. Registration
    /// failures are logged and otherwise ignored.
    pub fn attach(target: Option<&'a dyn EventTarget>, callback: Option<ProgressCallback>) -> Self {
        let (target, callback) = match (target, callback) {
            (Some(target), Some(callback)) => (target, callback),
            _ => return Self::inactive(),
        };

        let handler: EventHandler = Arc::new(move |payload: &Value| callback(ProgressEvent::from_payload(payload)));

        match target.add_event_listener(DOWNLOAD_PROGRESS_EVENT, handler) {
            Ok(id) => Self {
                target: Some(target),
                id: Some(id),
            },
            Err(error) => {
                warn!(error = %error, "could not subscribe to download progress");
                Self::inactive()
            }
        }
    }

    fn inactive() -> Self {
        Self { target: None, id: None }
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }
}

impl Drop for ProgressSubscription<'_> {
    fn drop(&mut self) {
        if let (Some(target), Some(id)) = (self.target, self.id.take()) {
            if let Err(error) = target.remove_event_listener(DOWNLOAD_PROGRESS_EVENT, id) {
                warn!(error = %error, "could not unsubscribe from download progress");
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TrackerState {
    latest: Option<ProgressEvent>,
    events: usize,
}

/// Observable counters for one download, fed by [`ProgressTracker::callback`].
#[derive(Debug, Default, Clone)]
pub struct ProgressTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> ProgressCallback {
        let state = Arc::clone(&self.state);
        Arc::new(move |event: ProgressEvent| {
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            state.latest = Some(event);
            state.events += 1;
        })
    }

    pub fn latest(&self) -> Option<ProgressEvent> {
        self.snapshot().latest
    }

    pub fn event_count(&self) -> usize {
        self.snapshot().events
    }

    /// `"50%"` style label, or an ellipsis while the total is unknown.
    pub fn label(&self) -> Option<String> {
        self.latest().map(|event| match event.percent() {
            Some(percent) => format!("{}%", percent),
            None => "…".to_string(),
        })
    }

    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = TrackerState::default();
    }

    fn snapshot(&self) -> TrackerState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSurface;
    use docsmith_models::{Availability, SurfaceShape};
    use serde_json::json;

    #[test]
    fn test_subscription_removed_on_drop() {
        let surface = FakeSurface::new(SurfaceShape::Legacy, Availability::Available);
        let tracker = ProgressTracker::new();

        {
            let subscription = ProgressSubscription::attach(surface.event_target_ref(), Some(tracker.callback()));
            assert!(subscription.is_active());
            surface.emit_progress(&json!({ "loaded": 5, "total": 10 }));
        }

        surface.emit_progress(&json!({ "loaded": 10, "total": 10 }));
        assert_eq!(surface.listeners_added(), 1);
        assert_eq!(surface.listeners_removed(), 1);
        assert_eq!(tracker.event_count(), 1);
        assert_eq!(tracker.label().as_deref(), Some("50%"));
    }

    #[test]
    fn test_no_callback_means_no_listener() {
        let surface = FakeSurface::new(SurfaceShape::Legacy, Availability::Available);
        let subscription = ProgressSubscription::attach(surface.event_target_ref(), None);

        assert!(!subscription.is_active());
        drop(subscription);
        assert_eq!(surface.listeners_added(), 0);
        assert_eq!(surface.listeners_removed(), 0);
    }

    #[test]
    fn test_failed_registration_is_ignored() {
        let surface = FakeSurface::new(SurfaceShape::Legacy, Availability::Available).failing_listener_add();
        let tracker = ProgressTracker::new();

        let subscription = ProgressSubscription::attach(surface.event_target_ref(), Some(tracker.callback()));
        assert!(!subscription.is_active());
        drop(subscription);
        assert_eq!(surface.listeners_removed(), 0);
    }

    #[test]
    fn test_tracker_label_and_reset() {
        let tracker = ProgressTracker::new();
        assert_eq!(tracker.label(), None);

        let callback = tracker.callback();
        callback(ProgressEvent::new(0.0, 0.0));
        assert_eq!(tracker.label().as_deref(), Some("…"));

        callback(ProgressEvent::new(150.0, 100.0));
        assert_eq!(tracker.label().as_deref(), Some("100%"));
        assert_eq!(tracker.event_count(), 2);

        tracker.reset();
        assert_eq!(tracker.latest(), None);
        assert_eq!(tracker.event_count(), 0);
    }

    #[test]
    fn test_nested_detail_payload_normalized() {
        let surface = FakeSurface::new(SurfaceShape::Legacy, Availability::Available);
        let tracker = ProgressTracker::new();
        let _subscription = ProgressSubscription::attach(surface.event_target_ref(), Some(tracker.callback()));

        surface.emit_progress(&json!({ "detail": { "loaded": 1, "total": 4 } }));
        assert_eq!(tracker.latest(), Some(ProgressEvent::new(1.0, 4.0)));
        assert_eq!(tracker.label().as_deref(), Some("25%"));
    }
}
