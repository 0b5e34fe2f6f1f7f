//! PDF Processor
//!
//! Extracts text from PDF documents page by page.

/// PDF processing result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfContent {
    pub text: String,
    pub pages: Vec<PageContent>,
}

/// Single page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub page_number: usize,
    pub text: String,
}

impl PdfContent {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// PDF processor
#[derive(Debug, Default)]
pub struct PdfProcessor;

impl PdfProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from PDF bytes. Library errors are returned as-is.
    pub fn extract(&self, data: &[u8]) -> Result<PdfContent, pdf_extract::OutputError> {
        let page_texts = pdf_extract::extract_text_from_mem_by_pages(data)?;
        Ok(Self::from_page_texts(page_texts))
    }

    /// Builds the document from per-page strings in page order.
    pub fn from_page_texts(page_texts: Vec<String>) -> PdfContent {
        let pages: Vec<PageContent> = page_texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PageContent {
                page_number: index + 1,
                text: text.trim().to_string(),
            })
            .collect();

        let text = assemble_pages(pages.iter().map(|page| page.text.as_str()));
        PdfContent { text, pages }
    }
}

/// Joins page texts with one blank line between pages.
pub fn assemble_pages<'a>(pages: impl IntoIterator<Item = &'a str>) -> String {
    pages.into_iter().collect::<Vec<_>>().join("\n\n")
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_assembly_preserves_page_order(pages in prop::collection::vec("[a-zA-Z0-9][a-zA-Z0-9 .,]{0,40}[a-zA-Z0-9]", 1..8)) {
            let content = PdfProcessor::from_page_texts(pages.clone());
            let split: Vec<&str> = content.text.split("\n\n").collect();

            prop_assert_eq!(split.len(), pages.len());
            for (original, assembled) in pages.iter().zip(split) {
                prop_assert_eq!(original.as_str(), assembled);
            }
        }
    }
}
