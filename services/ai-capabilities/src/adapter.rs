//! The two surface adapters. Each one knows its shape's availability
//! vocabulary and probing quirks; both expose the same contract.

use async_trait::async_trait;
use docsmith_models::{Availability, CapabilityKind, LanguagePair, SessionOptions, SurfaceShape};
use std::sync::Arc;
use tracing::debug;

use crate::surface::{EventTarget, FeatureSurface, ModelInstance};

/// Language a legacy translator probe falls back to when the surface refuses
/// an argument-less query.
pub const FALLBACK_TARGET_LANGUAGE: &str = "en";

#[async_trait]
pub trait CapabilityAdapter: Send + Sync {
    fn shape(&self) -> SurfaceShape;

    fn kind(&self) -> CapabilityKind;

    fn exposes_availability(&self) -> bool;

    async fn check_availability(&self, languages: Option<&LanguagePair>) -> anyhow::Result<Availability>;

    async fn create_session(&self, options: &SessionOptions) -> anyhow::Result<Box<dyn ModelInstance>>;

    fn event_target(&self) -> Option<&dyn EventTarget>;
}

pub struct ModernCapabilityAdapter {
    kind: CapabilityKind,
    surface: Arc<dyn FeatureSurface>,
}

impl ModernCapabilityAdapter {
    pub fn new(kind: CapabilityKind, surface: Arc<dyn FeatureSurface>) -> Self {
        Self { kind, surface }
    }
}

#[async_trait]
impl CapabilityAdapter for ModernCapabilityAdapter {
    fn shape(&self) -> SurfaceShape {
        SurfaceShape::Modern
    }

    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    fn exposes_availability(&self) -> bool {
        self.surface.exposes_availability()
    }

    async fn check_availability(&self, languages: Option<&LanguagePair>) -> anyhow::Result<Availability> {
        let languages = languages.filter(|pair| !pair.is_empty());
        let signal = self.surface.availability(languages).await?;
        Ok(Availability::from_modern_signal(&signal))
    }

    async fn create_session(&self, options: &SessionOptions) -> anyhow::Result<Box<dyn ModelInstance>> {
        self.surface.create(options).await
    }

    fn event_target(&self) -> Option<&dyn EventTarget> {
        self.surface.event_target()
    }
}

pub struct LegacyCapabilityAdapter {
    kind: CapabilityKind,
    surface: Arc<dyn FeatureSurface>,
}

impl LegacyCapabilityAdapter {
    pub fn new(kind: CapabilityKind, surface: Arc<dyn FeatureSurface>) -> Self {
        Self { kind, surface }
    }

    /// Legacy translators may insist on an explicit pair: try without
    /// arguments, then with an English target, then give up.
    async fn probe_translator_without_pair(&self) -> Availability {
        match self.surface.availability(None).await {
            Ok(signal) => return Availability::from_legacy_signal(&signal),
            Err(error) => debug!(error = %error, "argument-less translator probe rejected"),
        }

        let fallback = LanguagePair::target_only(FALLBACK_TARGET_LANGUAGE);
        match self.surface.availability(Some(&fallback)).await {
            Ok(signal) => Availability::from_legacy_signal(&signal),
            Err(error) => {
                debug!(error = %error, "fallback translator probe rejected");
                Availability::Unavailable
            }
        }
    }
}

#[async_trait]
impl CapabilityAdapter for LegacyCapabilityAdapter {
    fn shape(&self) -> SurfaceShape {
        SurfaceShape::Legacy
    }

    fn kind(&self) -> CapabilityKind {
        self.kind
    }

    fn exposes_availability(&self) -> bool {
        self.surface.exposes_availability()
    }

    async fn check_availability(&self, languages: Option<&LanguagePair>) -> anyhow::Result<Availability> {
        let languages = languages.filter(|pair| !pair.is_empty());

        match (self.kind, languages) {
            (CapabilityKind::Translator, None) => Ok(self.probe_translator_without_pair().await),
            (_, languages) => {
                let signal = self.surface.availability(languages).await?;
                Ok(Availability::from_legacy_signal(&signal))
            }
        }
    }

    async fn create_session(&self, options: &SessionOptions) -> anyhow::Result<Box<dyn ModelInstance>> {
        self.surface.create(options).await
    }

    fn event_target(&self) -> Option<&dyn EventTarget> {
        self.surface.event_target()
    }
}

pub fn adapter_for(
    kind: CapabilityKind,
    shape: SurfaceShape,
    surface: Arc<dyn FeatureSurface>,
) -> Box<dyn CapabilityAdapter> {
    match shape {
        SurfaceShape::Modern => Box::new(ModernCapabilityAdapter::new(kind, surface)),
        SurfaceShape::Legacy => Box::new(LegacyCapabilityAdapter::new(kind, surface)),
    }
}
