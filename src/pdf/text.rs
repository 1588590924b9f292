use super::PdfDocument;
use crate::error::{Error, Result};
use std::io::Write;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub page: u32,
    pub text: String,
}

/// Plain text of every page, in document order
fn page_texts(doc: &PdfDocument) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(&doc.bytes)
        .map_err(|e| Error::TextExtraction(format!("{}: {}", doc.path.display(), e)))
}

/// Extract text from specific pages of a PDF.
///
/// Pages outside the document are reported on `diag` and skipped; the
/// remaining pages are returned in the order they were requested.
pub fn extract_pages<W: Write + ?Sized>(
    doc: &PdfDocument,
    pages: &[u32],
    diag: &mut W,
) -> Result<Vec<ExtractedPage>> {
    let total_pages = doc.page_count();
    let mut texts: Option<Vec<String>> = None;
    let mut results = Vec::with_capacity(pages.len());

    for &page in pages {
        if !doc.contains_page(page) {
            warn!(page, total_pages, "requested page is out of range");
            writeln!(diag, "Page {} not found in the PDF.", page)?;
            continue;
        }

        // Only run the text extractor once something valid was requested
        if texts.is_none() {
            texts = Some(page_texts(doc)?);
        }

        let text = texts
            .as_ref()
            .and_then(|texts| texts.get((page - 1) as usize))
            .cloned()
            .unwrap_or_default();
        results.push(ExtractedPage { page, text });
    }

    debug!(requested = pages.len(), extracted = results.len(), "extracted page text");
    Ok(results)
}

/// Extract text from all pages of a PDF, concatenated without separators
pub fn extract_all_text(doc: &PdfDocument) -> Result<String> {
    Ok(page_texts(doc)?.concat())
}
