//! Document Workflow
//!
//! Per-action orchestration for one loaded document: extraction, then an
//! availability check, then the capability call with a progress tracker,
//! then an availability re-check. State from an earlier action is cleared
//! when a new file is loaded.

use clap::ValueEnum;
use docsmith_ai::{CapabilityDetector, CapabilityEnvironment, LocalSummarizer, LocalTranslator, ProgressCallback, ProgressTracker};
use docsmith_document_processing::DocumentExtractor;
use docsmith_models::{
    Availability, CapabilityKind, ExtractedDocument, OutputFormat, ProgressEvent, SummarizeResult,
    SummarizerOptions, Translation,
};
use docsmith_utils::{validate_language_code, AppConfig, DocSmithError, DocSmithResult, Listener};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub const NO_TEXT_EXTRACTED_MESSAGE: &str = "No text could be extracted from the document.";
pub const NOTHING_TO_SUMMARIZE_MESSAGE: &str = "Nothing to summarize. Please upload and parse a document first.";
pub const NOTHING_TO_TRANSLATE_MESSAGE: &str =
    "Nothing to translate. Create a summary or upload and parse a document first.";
pub const FIRST_TIME_BANNER: &str =
    "First-time: the on-device model may need to download. This can take a moment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TranslateSource {
    /// The summary when one exists, otherwise the extracted text.
    #[default]
    Summary,
    Extracted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    FirstTimeDownload(&'static str),
    DownloadProgress { capability: CapabilityKind, event: ProgressEvent },
}

pub struct DocumentWorkflow {
    extractor: DocumentExtractor,
    detector: CapabilityDetector,
    summarizer_options: SummarizerOptions,
    summarizer: Option<LocalSummarizer>,
    translator: LocalTranslator,
    source_language: String,
    observer: Option<Listener<WorkflowEvent>>,

    document: Option<ExtractedDocument>,
    summary: Option<String>,
    translation: Option<Translation>,
    summarizer_availability: Option<Availability>,
    translator_availability: Option<Availability>,
    first_time_banner: Option<&'static str>,
    summarize_progress: ProgressTracker,
    translate_progress: ProgressTracker,
}

impl DocumentWorkflow {
    pub fn new(extractor: DocumentExtractor, environment: CapabilityEnvironment) -> Self {
        let detector = CapabilityDetector::new(environment);
        Self {
            extractor,
            translator: LocalTranslator::new(detector.clone()),
            detector,
            summarizer_options: SummarizerOptions::default(),
            summarizer: None,
            source_language: "en".to_string(),
            observer: None,
            document: None,
            summary: None,
            translation: None,
            summarizer_availability: None,
            translator_availability: None,
            first_time_banner: None,
            summarize_progress: ProgressTracker::new(),
            translate_progress: ProgressTracker::new(),
        }
    }

    pub fn from_config(config: &AppConfig, environment: CapabilityEnvironment) -> Self {
        Self::new(DocumentExtractor::from_config(&config.upload), environment)
            .with_summarizer_options(config.summarizer.session_options())
            .with_translation_format(config.translator.format)
            .with_source_language(&config.translator.default_source_language)
    }

    pub fn with_summarizer_options(mut self, options: SummarizerOptions) -> Self {
        self.summarizer_options = options;
        self.summarizer = None;
        self
    }

    pub fn with_translation_format(mut self, format: OutputFormat) -> Self {
        self.translator = LocalTranslator::new(self.detector.clone()).with_format(format);
        self
    }

    pub fn with_source_language(mut self, source_language: &str) -> Self {
        self.source_language = source_language.to_string();
        self
    }

    pub fn with_observer(mut self, observer: Listener<WorkflowEvent>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn document(&self) -> Option<&ExtractedDocument> {
        self.document.as_ref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.as_ref()
    }

    pub fn summarizer_availability(&self) -> Option<Availability> {
        self.summarizer_availability
    }

    pub fn translator_availability(&self) -> Option<Availability> {
        self.translator_availability
    }

    pub fn first_time_banner(&self) -> Option<&'static str> {
        self.first_time_banner
    }

    pub fn summarize_progress(&self) -> &ProgressTracker {
        &self.summarize_progress
    }

    pub fn translate_progress(&self) -> &ProgressTracker {
        &self.translate_progress
    }

    pub async fn check_summarizer(&mut self) -> Availability {
        let availability = self.detector.get_availability(CapabilityKind::Summarizer, None).await;
        self.summarizer_availability = Some(availability);
        availability
    }

    pub async fn check_translator(&mut self, target_language: &str) -> Availability {
        let availability = self
            .translator
            .check_availability(target_language, Some(self.source_language.as_str()))
            .await;
        self.translator_availability = Some(availability);
        availability
    }

    pub async fn load_file(&mut self, path: &Path) -> DocSmithResult<&ExtractedDocument> {
        self.document = None;
        self.summary = None;
        self.translation = None;
        self.first_time_banner = None;

        let document = self.extractor.load_file(path).await?;
        if document.is_empty() {
            return Err(DocSmithError::extraction(NO_TEXT_EXTRACTED_MESSAGE));
        }

        info!(file = %document.file_name, chars = document.text.len(), "document loaded");
        Ok(self.document.insert(document))
    }

    pub async fn summarize(&mut self) -> DocSmithResult<SummarizeResult> {
        self.summary = None;
        self.summarize_progress.reset();

        let text = match self.document.as_ref().filter(|document| !document.is_empty()) {
            Some(document) => document.text.clone(),
            None => return Err(DocSmithError::validation("text", NOTHING_TO_SUMMARIZE_MESSAGE)),
        };

        let summarizer = self.summarizer.get_or_insert_with(|| {
            LocalSummarizer::new(self.detector.clone()).with_options(self.summarizer_options.clone())
        });

        let availability = summarizer.check_availability().await;
        self.summarizer_availability = Some(availability);
        if availability == Availability::Downloadable {
            self.first_time_banner = Some(FIRST_TIME_BANNER);
            notify(&self.observer, WorkflowEvent::FirstTimeDownload(FIRST_TIME_BANNER));
        } else {
            self.first_time_banner = None;
        }

        let callback = progress_callback(
            &self.summarize_progress,
            self.observer.clone(),
            CapabilityKind::Summarizer,
        );
        let result = summarizer.run(&text, Some(callback)).await;

        if let Ok(result) = &result {
            if !result.first_time_download {
                self.first_time_banner = None;
            }
        }

        self.summarizer_availability = Some(summarizer.check_availability().await);
        self.summarize_progress.reset();

        let result = result?;
        self.summary = Some(result.summary.clone());
        Ok(result)
    }

    pub async fn translate(&mut self, target_language: &str, from: TranslateSource) -> DocSmithResult<Translation> {
        self.translation = None;
        self.translate_progress.reset();
        validate_language_code(target_language)?;

        let text = self.pick_source_text(from);
        if text.is_empty() {
            return Err(DocSmithError::validation("text", NOTHING_TO_TRANSLATE_MESSAGE));
        }

        self.check_translator(target_language).await;

        let callback = progress_callback(
            &self.translate_progress,
            self.observer.clone(),
            CapabilityKind::Translator,
        );
        let result = self
            .translator
            .run(&text, target_language, Some(self.source_language.as_str()), Some(callback))
            .await;

        self.check_translator(target_language).await;

        let translation = Translation {
            text: result?,
            source_language: self.source_language.clone(),
            target_language: target_language.to_string(),
        };
        debug!(target_language, "translation stored");
        Ok(self.translation.insert(translation).clone())
    }

    fn pick_source_text(&self, from: TranslateSource) -> String {
        if from == TranslateSource::Summary {
            if let Some(summary) = self.summary.as_ref().filter(|summary| !summary.is_empty()) {
                return summary.clone();
            }
        }
        self.document
            .as_ref()
            .map(|document| document.text.clone())
            .unwrap_or_default()
    }
}

fn notify(observer: &Option<Listener<WorkflowEvent>>, event: WorkflowEvent) {
    if let Some(observer) = observer {
        observer(&event);
    }
}

fn progress_callback(
    tracker: &ProgressTracker,
    observer: Option<Listener<WorkflowEvent>>,
    capability: CapabilityKind,
) -> ProgressCallback {
    let record = tracker.callback();
    Arc::new(move |event: ProgressEvent| {
        record(event);
        notify(&observer, WorkflowEvent::DownloadProgress { capability, event });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_ai::testing::FakeSurface;
    use docsmith_models::{SessionOptions, SurfaceShape};
    use docx_rs::{Docx, Paragraph, Run};
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn write_docx(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        let mut docx = Docx::new();
        if !text.is_empty() {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)));
        }
        docx.build().pack(file).unwrap();
        path
    }

    fn workflow_with(summarizer: Arc<FakeSurface>, translator: Arc<FakeSurface>) -> DocumentWorkflow {
        let environment = CapabilityEnvironment::new()
            .with_legacy(CapabilityKind::Summarizer, summarizer)
            .with_legacy(CapabilityKind::Translator, translator);
        DocumentWorkflow::new(DocumentExtractor::new(10 * 1024 * 1024), environment)
    }

    fn available() -> Arc<FakeSurface> {
        Arc::new(FakeSurface::new(SurfaceShape::Legacy, Availability::Available))
    }

    #[tokio::test]
    async fn test_summarize_reports_first_download_and_progress() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "report.docx", "Quarterly results were strong.");
        let summarizer = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Downloadable)
                .with_progress(vec![
                    json!({ "loaded": 50, "total": 100 }),
                    json!({ "loaded": 100, "total": 100 }),
                ])
                .with_output(json!("Result")),
        );

        let events: Arc<Mutex<Vec<WorkflowEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let mut workflow = workflow_with(summarizer.clone(), available()).with_observer(Arc::new(
            move |event: &WorkflowEvent| sink.lock().unwrap().push(event.clone()),
        ));

        workflow.load_file(&path).await.unwrap();
        let result = workflow.summarize().await.unwrap();

        assert_eq!(result.summary, "Result");
        assert!(result.first_time_download);
        assert_eq!(workflow.summary(), Some("Result"));
        assert_eq!(workflow.first_time_banner(), Some(FIRST_TIME_BANNER));
        assert_eq!(workflow.summarizer_availability(), Some(Availability::Available));
        assert_eq!(workflow.summarize_progress().event_count(), 0);
        assert_eq!(summarizer.last_input().as_deref(), Some("Quarterly results were strong."));

        let events = events.lock().unwrap();
        assert_eq!(events[0], WorkflowEvent::FirstTimeDownload(FIRST_TIME_BANNER));
        let percents: Vec<u8> = events
            .iter()
            .filter_map(|event| match event {
                WorkflowEvent::DownloadProgress { event, .. } => event.percent(),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![50, 100]);
    }

    #[tokio::test]
    async fn test_summarize_without_document() {
        let mut workflow = workflow_with(available(), available());

        let error = workflow.summarize().await.unwrap_err();
        assert_eq!(error.user_message(), NOTHING_TO_SUMMARIZE_MESSAGE);
        assert_eq!(workflow.summarizer_availability(), None);
    }

    #[tokio::test]
    async fn test_failed_summary_still_rechecks_availability() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "notes.docx", "Some notes");
        let summarizer = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Available).failing_run("model crashed"),
        );
        let mut workflow = workflow_with(summarizer.clone(), available());

        workflow.load_file(&path).await.unwrap();
        let calls_before = summarizer.availability_calls();
        let error = workflow.summarize().await.unwrap_err();

        assert!(error.user_message().contains("model crashed"));
        assert_eq!(workflow.summary(), None);
        assert_eq!(workflow.summarizer_availability(), Some(Availability::Available));
        assert!(summarizer.availability_calls() >= calls_before + 2);
    }

    #[tokio::test]
    async fn test_translate_prefers_summary_with_english_source() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "doc.docx", "Full extracted text");
        let summarizer = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Available).with_output(json!("Short summary")),
        );
        let translator = Arc::new(
            FakeSurface::new(SurfaceShape::Legacy, Availability::Available).with_output(json!("Resumen corto")),
        );
        let mut workflow = workflow_with(summarizer, translator.clone());

        workflow.load_file(&path).await.unwrap();
        workflow.summarize().await.unwrap();

        let translation = workflow.translate("es", TranslateSource::Summary).await.unwrap();
        assert_eq!(translation.text, "Resumen corto");
        assert_eq!(translation.source_language, "en");
        assert_eq!(translator.last_input().as_deref(), Some("Short summary"));
        match translator.last_created_options() {
            Some(SessionOptions::Translator(options)) => {
                assert_eq!(options.source_language, "en");
                assert_eq!(options.target_language, "es");
            }
            other => panic!("unexpected options: {:?}", other),
        }

        workflow.translate("fr", TranslateSource::Extracted).await.unwrap();
        assert_eq!(translator.last_input().as_deref(), Some("Full extracted text"));
        assert_eq!(workflow.translator_availability(), Some(Availability::Available));
    }

    #[tokio::test]
    async fn test_translate_falls_back_to_extracted_text() {
        let dir = TempDir::new().unwrap();
        let path = write_docx(&dir, "doc.docx", "Only extracted");
        let translator = available();
        let mut workflow = workflow_with(available(), translator.clone());

        workflow.load_file(&path).await.unwrap();
        workflow.translate("de", TranslateSource::Summary).await.unwrap();

        assert_eq!(translator.last_input().as_deref(), Some("Only extracted"));
    }

    #[tokio::test]
    async fn test_translate_rejections() {
        let translator = available();
        let mut workflow = workflow_with(available(), translator.clone());

        let error = workflow.translate("es", TranslateSource::Summary).await.unwrap_err();
        assert_eq!(error.user_message(), NOTHING_TO_TRANSLATE_MESSAGE);

        let error = workflow.translate("xx", TranslateSource::Summary).await.unwrap_err();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(translator.availability_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_file_rejections_clear_state() {
        let dir = TempDir::new().unwrap();
        let good = write_docx(&dir, "good.docx", "Kept text");
        let empty = write_docx(&dir, "empty.docx", "");
        let unsupported = dir.path().join("notes.txt");
        std::fs::write(&unsupported, "plain text").unwrap();

        let mut workflow = workflow_with(available(), available());
        workflow.load_file(&good).await.unwrap();
        workflow.summarize().await.unwrap();

        let error = workflow.load_file(&unsupported).await.unwrap_err();
        assert_eq!(
            error.user_message(),
            "Unsupported file type. Please upload a .pdf or .docx file."
        );
        assert!(workflow.document().is_none());
        assert!(workflow.summary().is_none());

        let error = workflow.load_file(&empty).await.unwrap_err();
        assert_eq!(error.user_message(), NO_TEXT_EXTRACTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.pdf");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let environment = CapabilityEnvironment::new();
        let mut workflow = DocumentWorkflow::new(DocumentExtractor::new(1024), environment);

        let error = workflow.load_file(&path).await.unwrap_err();
        assert!(error.user_message().starts_with("File exceeds"));
        assert!(error.user_message().contains("2.0 KB"));
    }
}
