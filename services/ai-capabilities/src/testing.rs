//! Scriptable in-memory surface for tests.

use anyhow::anyhow;
use async_trait::async_trait;
use docsmith_models::{Availability, LanguagePair, SessionOptions, SurfaceShape};
use docsmith_utils::{ListenerId, ListenerRegistry};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::surface::{EventHandler, EventTarget, FeatureSurface, ModelInstance};

struct FakeState {
    availability: Availability,
    raw_signal: Option<Value>,
    degrade_to: Option<Availability>,
    availability_calls: usize,
    create_calls: usize,
    listeners_added: usize,
    listeners_removed: usize,
    last_probe: Option<Option<LanguagePair>>,
    last_options: Option<SessionOptions>,
    last_input: Option<String>,
}

impl FakeState {
    fn new(availability: Availability) -> Self {
        Self {
            availability,
            raw_signal: None,
            degrade_to: None,
            availability_calls: 0,
            create_calls: 0,
            listeners_added: 0,
            listeners_removed: 0,
            last_probe: None,
            last_options: None,
            last_input: None,
        }
    }
}

/// Surface double. Speaks the vocabulary of `shape`, installs its model on
/// creation (`Downloadable` becomes `Available`), emits the scripted
/// progress payloads during creation, and counts every interaction.
pub struct FakeSurface {
    shape: SurfaceShape,
    state: Arc<Mutex<FakeState>>,
    events: Arc<ListenerRegistry<Value>>,
    progress: Vec<Value>,
    output: Value,
    exposes_availability: bool,
    emits_events: bool,
    requires_pair: bool,
    availability_error: Option<String>,
    create_error: Option<String>,
    run_error: Option<String>,
    listener_add_error: bool,
}

impl FakeSurface {
    pub fn new(shape: SurfaceShape, availability: Availability) -> Self {
        Self {
            shape,
            state: Arc::new(Mutex::new(FakeState::new(availability))),
            events: Arc::new(ListenerRegistry::new()),
            progress: Vec::new(),
            output: json!("Result"),
            exposes_availability: true,
            emits_events: true,
            requires_pair: false,
            availability_error: None,
            create_error: None,
            run_error: None,
            listener_add_error: false,
        }
    }

    pub fn with_progress(mut self, payloads: Vec<Value>) -> Self {
        self.progress = payloads;
        self
    }

    pub fn with_output(mut self, output: Value) -> Self {
        self.output = output;
        self
    }

    /// Answer availability queries with this exact signal instead of the
    /// shape's word for the current state.
    pub fn with_raw_signal(self, signal: Value) -> Self {
        self.lock().raw_signal = Some(signal);
        self
    }

    pub fn without_availability_query(mut self) -> Self {
        self.exposes_availability = false;
        self
    }

    pub fn without_events(mut self) -> Self {
        self.emits_events = false;
        self
    }

    /// Reject argument-less availability queries.
    pub fn requiring_language_pair(mut self) -> Self {
        self.requires_pair = true;
        self
    }

    pub fn failing_availability(mut self, message: &str) -> Self {
        self.availability_error = Some(message.to_string());
        self
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn failing_run(mut self, message: &str) -> Self {
        self.run_error = Some(message.to_string());
        self
    }

    pub fn failing_listener_add(mut self) -> Self {
        self.listener_add_error = true;
        self
    }

    /// Switch to `availability` right after the next probe answers, to
    /// exercise the gap between checking and creating.
    pub fn degrade_after_next_probe(&self, availability: Availability) {
        self.lock().degrade_to = Some(availability);
    }

    pub fn emit_progress(&self, payload: &Value) {
        self.events.emit(payload);
    }

    pub fn event_target_ref(&self) -> Option<&dyn EventTarget> {
        self.event_target()
    }

    pub fn availability_calls(&self) -> usize {
        self.lock().availability_calls
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn listeners_added(&self) -> usize {
        self.lock().listeners_added
    }

    pub fn listeners_removed(&self) -> usize {
        self.lock().listeners_removed
    }

    pub fn active_listeners(&self) -> usize {
        self.events.len()
    }

    /// `None` before any probe; `Some(None)` for an argument-less probe.
    pub fn last_probe_languages(&self) -> Option<Option<LanguagePair>> {
        self.lock().last_probe.clone()
    }

    pub fn last_created_options(&self) -> Option<SessionOptions> {
        self.lock().last_options.clone()
    }

    pub fn last_input(&self) -> Option<String> {
        self.lock().last_input.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FeatureSurface for FakeSurface {
    fn exposes_availability(&self) -> bool {
        self.exposes_availability
    }

    async fn availability(&self, languages: Option<&LanguagePair>) -> anyhow::Result<Value> {
        let mut state = self.lock();
        state.availability_calls += 1;
        state.last_probe = Some(languages.cloned());

        if let Some(message) = &self.availability_error {
            return Err(anyhow!(message.clone()));
        }
        if self.requires_pair && languages.is_none() {
            return Err(anyhow!("An explicit language pair is required."));
        }

        let signal = match &state.raw_signal {
            Some(raw) => raw.clone(),
            None => json!(state.availability.to_signal(self.shape)),
        };

        if let Some(next) = state.degrade_to.take() {
            state.availability = next;
        }

        Ok(signal)
    }

    async fn create(&self, options: &SessionOptions) -> anyhow::Result<Box<dyn ModelInstance>> {
        let availability = {
            let mut state = self.lock();
            state.create_calls += 1;
            state.last_options = Some(options.clone());
            state.availability
        };

        if let Some(message) = &self.create_error {
            return Err(anyhow!(message.clone()));
        }
        if availability == Availability::Unavailable {
            return Err(anyhow!("The model is not available on this device."));
        }

        for payload in &self.progress {
            self.events.emit(payload);
        }
        self.lock().availability = Availability::Available;

        Ok(Box::new(FakeInstance {
            output: self.output.clone(),
            error: self.run_error.clone(),
            state: Arc::clone(&self.state),
        }))
    }

    fn event_target(&self) -> Option<&dyn EventTarget> {
        if self.emits_events {
            Some(self)
        } else {
            None
        }
    }
}

impl EventTarget for FakeSurface {
    fn add_event_listener(&self, _event: &str, handler: EventHandler) -> anyhow::Result<ListenerId> {
        if self.listener_add_error {
            return Err(anyhow!("addEventListener is not supported"));
        }
        self.lock().listeners_added += 1;
        Ok(self.events.add(handler))
    }

    fn remove_event_listener(&self, _event: &str, id: ListenerId) -> anyhow::Result<()> {
        if self.events.remove(id) {
            self.lock().listeners_removed += 1;
        }
        Ok(())
    }
}

struct FakeInstance {
    output: Value,
    error: Option<String>,
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl ModelInstance for FakeInstance {
    async fn run(&self, input: &str) -> anyhow::Result<Value> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last_input = Some(input.to_string());

        match &self.error {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(self.output.clone()),
        }
    }
}
