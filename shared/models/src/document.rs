use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Detects the format from the file name extension (case-insensitive) or
    /// the declared MIME type. PDF is checked before DOCX.
    pub fn detect(file_name: &str, mime_type: Option<&str>) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") || mime_type == Some(PDF_MIME_TYPE) {
            Some(Self::Pdf)
        } else if lower.ends_with(".docx") || mime_type == Some(DOCX_MIME_TYPE) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    /// MIME type implied by a file extension, for files read from disk.
    pub fn mime_for_path(file_name: &str) -> Option<&'static str> {
        Self::detect(file_name, None).map(|format| format.mime_type())
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME_TYPE,
            Self::Docx => DOCX_MIME_TYPE,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("PDF"),
            Self::Docx => f.write_str("DOCX"),
        }
    }
}

/// A binary file handed over by the user.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::detect(&self.name, self.mime_type.as_deref())
    }
}

/// Plain text derived from one successful extraction. Superseded by the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub format: DocumentFormat,
    pub size_bytes: u64,
    pub text: String,
    pub page_count: Option<usize>,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedDocument {
    pub fn new(file_name: impl Into<String>, format: DocumentFormat, size_bytes: u64, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            format,
            size_bytes,
            text,
            page_count: None,
            extracted_at: Utc::now(),
        }
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
