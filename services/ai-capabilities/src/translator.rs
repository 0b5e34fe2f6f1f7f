//! Translation Facade

use docsmith_models::{
    Availability, CapabilityKind, LanguagePair, OutputFormat, SessionOptions, TranslatorOptions, AUTO_DETECT,
};
use tracing::debug;

use crate::detector::CapabilityDetector;
use crate::error::{CapabilityError, CapabilityResult};
use crate::negotiator::SessionNegotiator;
use crate::progress::ProgressCallback;

/// Third positional argument of the older call shape: either a source
/// language or the progress callback itself.
pub enum TranslateArg {
    Source(String),
    Progress(ProgressCallback),
}

impl From<&str> for TranslateArg {
    fn from(source: &str) -> Self {
        Self::Source(source.to_string())
    }
}

impl From<ProgressCallback> for TranslateArg {
    fn from(callback: ProgressCallback) -> Self {
        Self::Progress(callback)
    }
}

#[derive(Debug, Clone)]
pub struct LocalTranslator {
    negotiator: SessionNegotiator,
    format: OutputFormat,
}

impl LocalTranslator {
    pub fn new(detector: CapabilityDetector) -> Self {
        Self {
            negotiator: SessionNegotiator::new(detector),
            format: OutputFormat::Markdown,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub async fn check_availability(&self, target_language: &str, source_language: Option<&str>) -> Availability {
        let pair = LanguagePair::new(Some(target_language), source_language);
        self.negotiator
            .detector()
            .get_availability(CapabilityKind::Translator, Some(&pair))
            .await
    }

    /// Translates `text`. A missing source language means auto-detection.
    pub async fn run(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
        on_progress: Option<ProgressCallback>,
    ) -> CapabilityResult<String> {
        if text.trim().is_empty() {
            return Err(CapabilityError::Validation(
                "Nothing to translate: the input text is empty.".to_string(),
            ));
        }

        let source_language = source_language
            .filter(|source| !source.is_empty())
            .unwrap_or(AUTO_DETECT);

        let options = SessionOptions::Translator(TranslatorOptions {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            format: self.format,
        });

        let outcome = self.negotiator.run(&options, text, on_progress).await?;
        debug!(source_language, target_language, shape = %outcome.shape, "translation produced");

        Ok(outcome.output)
    }

    /// Older call shape: the third argument is either the source language or
    /// the progress callback. A trailing callback is used only when the third
    /// argument was a source language.
    pub async fn run_with(
        &self,
        text: &str,
        target_language: &str,
        arg: Option<TranslateArg>,
        trailing_progress: Option<ProgressCallback>,
    ) -> CapabilityResult<String> {
        match arg {
            Some(TranslateArg::Progress(callback)) => {
                self.run(text, target_language, None, Some(callback)).await
            }
            Some(TranslateArg::Source(source)) => {
                self.run(text, target_language, Some(&source), trailing_progress)
                    .await
            }
            None => self.run(text, target_language, None, trailing_progress).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::CapabilityEnvironment;
    use crate::progress::ProgressTracker;
    use crate::testing::FakeSurface;
    use docsmith_models::SurfaceShape;
    use serde_json::json;
    use std::sync::Arc;

    fn translator_with(surface: Arc<FakeSurface>, shape: SurfaceShape) -> LocalTranslator {
        let environment = CapabilityEnvironment::new().with_surface(CapabilityKind::Translator, shape, surface);
        LocalTranslator::new(CapabilityDetector::new(environment))
    }

    fn created_source(surface: &FakeSurface) -> Option<String> {
        match surface.last_created_options() {
            Some(SessionOptions::Translator(options)) => Some(options.source_language),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_empty_text_rejected_before_any_probe() {
        let surface = Arc::new(FakeSurface::new(SurfaceShape::Legacy, Availability::Available));
        let translator = translator_with(surface.clone(), SurfaceShape::Legacy);

        let error = translator.run("", "es", None, None).await.unwrap_err();
        assert!(matches!(error, CapabilityError::Validation(_)));
        assert_eq!(surface.availability_calls(), 0);
        assert_eq!(surface.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_source_defaults_to_auto() {
        let surface = Arc::new(FakeSurface::new(SurfaceShape::Modern, Availability::Available).with_output(json!("Hola")));
        let translator = translator_with(surface.clone(), SurfaceShape::Modern);

        let output = translator.run("Hello", "es", None, None).await.unwrap();
        assert_eq!(output, "Hola");
        assert_eq!(created_source(&surface).as_deref(), Some("auto"));
    }

    #[tokio::test]
    async fn test_check_availability_passes_pair() {
        let surface = Arc::new(FakeSurface::new(SurfaceShape::Legacy, Availability::Downloadable));
        let translator = translator_with(surface.clone(), SurfaceShape::Legacy);

        assert_eq!(
            translator.check_availability("fr", Some("en")).await,
            Availability::Downloadable
        );
        assert_eq!(
            surface.last_probe_languages(),
            Some(Some(LanguagePair::new(Some("fr"), Some("en"))))
        );
    }

    #[tokio::test]
    async fn test_progress_as_third_argument() {
        let surface = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Downloadable)
                .with_progress(vec![json!({ "detail": { "loaded": 3, "total": 4 } })]),
        );
        let translator = translator_with(surface.clone(), SurfaceShape::Legacy);
        let tracker = ProgressTracker::new();

        translator
            .run_with("Hello", "de", Some(TranslateArg::from(tracker.callback())), None)
            .await
            .unwrap();

        assert_eq!(tracker.label().as_deref(), Some("75%"));
        assert_eq!(created_source(&surface).as_deref(), Some("auto"));
        assert_eq!(surface.listeners_added(), surface.listeners_removed());
    }

    #[tokio::test]
    async fn test_source_as_third_argument_with_trailing_progress() {
        let surface = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Downloadable)
                .with_progress(vec![json!({ "loaded": 10, "total": 10 })]),
        );
        let translator = translator_with(surface.clone(), SurfaceShape::Legacy);
        let tracker = ProgressTracker::new();

        translator
            .run_with("Hello", "it", Some(TranslateArg::from("en")), Some(tracker.callback()))
            .await
            .unwrap();

        assert_eq!(created_source(&surface).as_deref(), Some("en"));
        assert_eq!(tracker.label().as_deref(), Some("100%"));
    }

    #[tokio::test]
    async fn test_unavailable_pair_rejected() {
        let surface = Arc::new(FakeSurface::new(SurfaceShape::Legacy, Availability::Unavailable));
        let translator = translator_with(surface.clone(), SurfaceShape::Legacy);

        let error = translator.run("Hello", "xx", Some("en"), None).await.unwrap_err();
        assert!(matches!(error, CapabilityError::Unavailable(CapabilityKind::Translator)));
        assert_eq!(surface.create_calls(), 0);
    }
}
