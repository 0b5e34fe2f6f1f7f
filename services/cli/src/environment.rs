//! Surface wiring for the command line.

use docsmith_ai::{CapabilityEnvironment, OllamaSurface};
use docsmith_models::CapabilityKind;
use docsmith_utils::OllamaConfig;
use std::sync::Arc;
use tracing::{debug, info};

/// One Ollama-backed surface per capability, each installed in the slot
/// matching its configured shape. Disabled config yields an empty
/// environment, so both capabilities report unsupported.
pub fn build_environment(config: &OllamaConfig) -> CapabilityEnvironment {
    if !config.enabled {
        info!("on-device runtime disabled; no surfaces installed");
        return CapabilityEnvironment::new();
    }

    [CapabilityKind::Summarizer, CapabilityKind::Translator]
        .into_iter()
        .fold(CapabilityEnvironment::new(), |environment, kind| {
            let surface = OllamaSurface::new(kind, config);
            debug!(%kind, shape = %surface.shape(), model = surface.model(), "installing surface");
            let shape = surface.shape();
            environment.with_surface(kind, shape, Arc::new(surface))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_models::SurfaceShape;

    #[test]
    fn test_surfaces_follow_configured_shape() {
        let config = OllamaConfig {
            translator_shape: SurfaceShape::Modern,
            ..OllamaConfig::default()
        };
        let environment = build_environment(&config);

        assert!(environment.surface(CapabilityKind::Summarizer, SurfaceShape::Legacy).is_some());
        assert!(environment.surface(CapabilityKind::Summarizer, SurfaceShape::Modern).is_none());
        assert!(environment.surface(CapabilityKind::Translator, SurfaceShape::Modern).is_some());
        assert!(environment.surface(CapabilityKind::Translator, SurfaceShape::Legacy).is_none());
    }

    #[test]
    fn test_disabled_runtime_installs_nothing() {
        let config = OllamaConfig {
            enabled: false,
            ..OllamaConfig::default()
        };
        let environment = build_environment(&config);

        assert!(environment.slots(CapabilityKind::Summarizer).is_empty());
        assert!(environment.slots(CapabilityKind::Translator).is_empty());
    }
}
