//! DOCX Processor
//!
//! Extracts raw paragraph text from Word documents, including paragraphs
//! nested in tables.

use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild,
};

#[derive(Debug, Default)]
pub struct DocxProcessor;

impl DocxProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Paragraphs are separated by a blank line. A document without text
    /// yields an empty string.
    pub fn extract(&self, data: &[u8]) -> Result<String, docx_rs::ReaderError> {
        let docx = read_docx(data)?;
        let mut paragraphs = Vec::new();

        for child in docx.document.children.iter() {
            match child {
                DocumentChild::Paragraph(paragraph) => paragraphs.push(paragraph_text(paragraph)),
                DocumentChild::Table(table) => {
                    for row in table.rows.iter() {
                        #[allow(irrefutable_let_patterns)]
                        let TableChild::TableRow(row) = row else { continue };
                        for cell in row.cells.iter() {
                            #[allow(irrefutable_let_patterns)]
                            let TableRowChild::TableCell(cell) = cell else { continue };
                            for content in cell.children.iter() {
                                if let TableCellContent::Paragraph(paragraph) = content {
                                    paragraphs.push(paragraph_text(paragraph));
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let text = paragraphs
            .into_iter()
            .filter(|paragraph| !paragraph.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(text)
    }
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    collect_children(&paragraph.children, &mut text);
    text
}

fn collect_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in run.children.iter() {
                    match run_child {
                        RunChild::Text(t) => out.push_str(&t.text),
                        RunChild::Tab(_) => out.push('\t'),
                        RunChild::Break(_) => out.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_children(&link.children, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, Table, TableCell, TableRow};
    use std::io::Cursor;

    fn pack(docx: Docx) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let bytes = pack(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Quarterly ").add_text("report")))
                .add_paragraph(Paragraph::new())
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Revenue").add_tab().add_text("up"))),
        );

        let text = DocxProcessor::new().extract(&bytes).unwrap();
        assert_eq!(text, "Quarterly report\n\nRevenue\tup");
    }

    #[test]
    fn test_table_cells_included() {
        let table = Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Cell A"))),
            TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Cell B"))),
        ])]);
        let bytes = pack(
            Docx::new()
                .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Intro")))
                .add_table(table),
        );

        let text = DocxProcessor::new().extract(&bytes).unwrap();
        assert_eq!(text, "Intro\n\nCell A\n\nCell B");
    }

    #[test]
    fn test_empty_document_yields_empty_string() {
        let bytes = pack(Docx::new());
        assert_eq!(DocxProcessor::new().extract(&bytes).unwrap(), "");
    }

    #[test]
    fn test_not_a_zip_fails() {
        assert!(DocxProcessor::new().extract(b"plain text").is_err());
    }
}
