//! Document processing
//!
//! PDF and DOCX text extraction behind the upload size and type policy.

pub mod docx_processor;
pub mod extraction;
pub mod pdf_processor;

pub use docx_processor::DocxProcessor;
pub use extraction::{DocumentExtractor, ExtractionError};
pub use pdf_processor::{assemble_pages, PageContent, PdfContent, PdfProcessor};
