use crate::surface::FeatureSurface;
use docsmith_models::{CapabilityKind, SurfaceShape};
use std::sync::Arc;

/// The modern and legacy entry points for one capability. Either, both or
/// neither may be present.
#[derive(Clone, Default)]
pub struct SurfaceSlots {
    pub modern: Option<Arc<dyn FeatureSurface>>,
    pub legacy: Option<Arc<dyn FeatureSurface>>,
}

impl SurfaceSlots {
    pub fn get(&self, shape: SurfaceShape) -> Option<&Arc<dyn FeatureSurface>> {
        match shape {
            SurfaceShape::Modern => self.modern.as_ref(),
            SurfaceShape::Legacy => self.legacy.as_ref(),
        }
    }

    pub fn set(&mut self, shape: SurfaceShape, surface: Arc<dyn FeatureSurface>) {
        match shape {
            SurfaceShape::Modern => self.modern = Some(surface),
            SurfaceShape::Legacy => self.legacy = Some(surface),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modern.is_none() && self.legacy.is_none()
    }
}

/// Injected stand-in for the host's global feature objects.
#[derive(Clone, Default)]
pub struct CapabilityEnvironment {
    summarizer: SurfaceSlots,
    translator: SurfaceSlots,
}

impl CapabilityEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_surface(
        mut self,
        kind: CapabilityKind,
        shape: SurfaceShape,
        surface: Arc<dyn FeatureSurface>,
    ) -> Self {
        self.slots_mut(kind).set(shape, surface);
        self
    }

    pub fn with_modern(self, kind: CapabilityKind, surface: Arc<dyn FeatureSurface>) -> Self {
        self.with_surface(kind, SurfaceShape::Modern, surface)
    }

    pub fn with_legacy(self, kind: CapabilityKind, surface: Arc<dyn FeatureSurface>) -> Self {
        self.with_surface(kind, SurfaceShape::Legacy, surface)
    }

    pub fn slots(&self, kind: CapabilityKind) -> &SurfaceSlots {
        match kind {
            CapabilityKind::Summarizer => &self.summarizer,
            CapabilityKind::Translator => &self.translator,
        }
    }

    fn slots_mut(&mut self, kind: CapabilityKind) -> &mut SurfaceSlots {
        match kind {
            CapabilityKind::Summarizer => &mut self.summarizer,
            CapabilityKind::Translator => &mut self.translator,
        }
    }

    pub fn surface(&self, kind: CapabilityKind, shape: SurfaceShape) -> Option<Arc<dyn FeatureSurface>> {
        self.slots(kind).get(shape).cloned()
    }
}

impl std::fmt::Debug for CapabilityEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let describe = |slots: &SurfaceSlots| {
            SurfaceShape::PRIORITY
                .iter()
                .filter(|shape| slots.get(**shape).is_some())
                .map(|shape| shape.to_string())
                .collect::<Vec<_>>()
        };
        f.debug_struct("CapabilityEnvironment")
            .field("summarizer", &describe(&self.summarizer))
            .field("translator", &describe(&self.translator))
            .finish()
    }
}
