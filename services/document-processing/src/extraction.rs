//! Document Extraction Service
//!
//! Routes an upload to the PDF or DOCX processor after enforcing the size and
//! type policy. Parsing runs on the blocking pool.

use docsmith_models::{DocumentFormat, ExtractedDocument, UploadedFile};
use docsmith_utils::{file_too_large_message, DocSmithError, UploadConfig, UNSUPPORTED_FILE_TYPE_MESSAGE};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::docx_processor::DocxProcessor;
use crate::pdf_processor::PdfProcessor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{message}")]
    FileTooLarge { size: u64, limit: u64, message: String },

    #[error("{}", UNSUPPORTED_FILE_TYPE_MESSAGE)]
    UnsupportedFormat { file_name: String },

    /// Parser error text, unchanged.
    #[error("{0}")]
    Pdf(String),

    #[error("{0}")]
    Docx(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl ExtractionError {
    pub fn file_too_large(size: u64, limit: u64) -> Self {
        Self::FileTooLarge {
            size,
            limit,
            message: file_too_large_message(size, limit),
        }
    }

    /// Rejected by policy before any parsing started.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::FileTooLarge { .. } | Self::UnsupportedFormat { .. })
    }
}

impl From<ExtractionError> for DocSmithError {
    fn from(error: ExtractionError) -> Self {
        if error.is_validation() {
            DocSmithError::validation("file", error.to_string())
        } else {
            DocSmithError::extraction(error.to_string())
        }
    }
}

/// Document extractor service
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    pdf_processor: Arc<PdfProcessor>,
    docx_processor: Arc<DocxProcessor>,
    max_file_size_bytes: u64,
}

impl DocumentExtractor {
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            pdf_processor: Arc::new(PdfProcessor::new()),
            docx_processor: Arc::new(DocxProcessor::new()),
            max_file_size_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_file_size_bytes)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    pub fn check_size(&self, size: u64) -> Result<(), ExtractionError> {
        if size > self.max_file_size_bytes {
            return Err(ExtractionError::file_too_large(size, self.max_file_size_bytes));
        }
        Ok(())
    }

    pub fn detect_format(&self, file_name: &str, mime_type: Option<&str>) -> Result<DocumentFormat, ExtractionError> {
        DocumentFormat::detect(file_name, mime_type).ok_or_else(|| ExtractionError::UnsupportedFormat {
            file_name: file_name.to_string(),
        })
    }

    /// Size first, then type, then parse. The stored text is trimmed.
    pub async fn extract(&self, file: UploadedFile) -> Result<ExtractedDocument, ExtractionError> {
        let size = file.size();
        self.check_size(size)?;
        let format = self.detect_format(&file.name, file.mime_type.as_deref())?;

        debug!(file = %file.name, %format, size, "extracting document");

        let (text, page_count) = match format {
            DocumentFormat::Pdf => {
                let processor = Arc::clone(&self.pdf_processor);
                let data = file.data;
                let content = tokio::task::spawn_blocking(move || processor.extract(&data))
                    .await
                    .map_err(|e| ExtractionError::Task(e.to_string()))?
                    .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
                let page_count = content.page_count();
                (content.text, Some(page_count))
            }
            DocumentFormat::Docx => {
                let processor = Arc::clone(&self.docx_processor);
                let data = file.data;
                let text = tokio::task::spawn_blocking(move || processor.extract(&data))
                    .await
                    .map_err(|e| ExtractionError::Task(e.to_string()))?
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                (text, None)
            }
        };

        let mut document = ExtractedDocument::new(file.name, format, size, text.trim().to_string());
        if let Some(pages) = page_count {
            document = document.with_page_count(pages);
        }

        info!(
            file = %document.file_name,
            format = %document.format,
            chars = document.text.len(),
            "document extracted"
        );
        Ok(document)
    }

    /// Reads a file from disk. Size and type are checked before the contents
    /// are read.
    pub async fn load_file(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let metadata = tokio::fs::metadata(path).await?;
        self.check_size(metadata.len())?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = DocumentFormat::mime_for_path(&file_name);
        self.detect_format(&file_name, mime_type)?;

        let data = tokio::fs::read(path).await?;
        self.extract(UploadedFile::new(file_name, mime_type.map(str::to_string), data))
            .await
    }
}
