//! Page-text producers for the pipeline.
//!
//! PDF layout analysis proper lives upstream; this module only satisfies
//! the pipeline's input contract: an ordered list of `{page, text}`
//! entries. PDFs go through `pdf-extract`, splitting on the form feeds it
//! inserts between pages; plain text is either form-feed paginated or
//! treated as a single page.

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::pipeline::model::PageText;

/// Errors from page-text ingestion.
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("PDF extraction failed: {message}")]
    #[diagnostic(
        code(courseforge::ingest::pdf),
        help("The file could not be read as a PDF. Verify it is valid and not encrypted.")
    )]
    Pdf { message: String },

    #[error("empty document: no text extracted from \"{origin}\"")]
    #[diagnostic(
        code(courseforge::ingest::empty_document),
        help(
            "No text content was found. Scanned/image-only PDFs need OCR \
             before they can be ingested."
        )
    )]
    EmptyDocument { origin: String },

    #[error("I/O error: {source}")]
    #[diagnostic(
        code(courseforge::ingest::io),
        help("A filesystem operation failed. Check file paths and permissions.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for ingestion results.
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Extract page texts from PDF bytes.
///
/// `pdf-extract` returns all pages as one string with form feeds (`\x0C`)
/// between pages; pages that extract to nothing are kept out of the list
/// but still count toward page numbering.
pub fn pages_from_pdf_bytes(data: &[u8]) -> IngestResult<Vec<PageText>> {
    let text = pdf_extract::extract_text_from_mem(data).map_err(|e| IngestError::Pdf {
        message: e.to_string(),
    })?;

    let pages = paginate(&text);
    if pages.is_empty() {
        return Err(IngestError::EmptyDocument {
            origin: "(pdf)".into(),
        });
    }
    Ok(pages)
}

/// Build page texts from already extracted text.
///
/// Form feeds are honored as page breaks; otherwise the whole text is one
/// page, which also fits table-of-contents input.
pub fn pages_from_text(text: &str) -> IngestResult<Vec<PageText>> {
    let pages = paginate(text);
    if pages.is_empty() {
        return Err(IngestError::EmptyDocument {
            origin: "(text)".into(),
        });
    }
    Ok(pages)
}

/// Ingest a file by extension: `.pdf` via the PDF extractor, anything else
/// as plain text.
pub fn pages_from_file(path: &Path) -> IngestResult<Vec<PageText>> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let data = std::fs::read(path).map_err(|e| IngestError::Io { source: e })?;
        pages_from_pdf_bytes(&data)
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io { source: e })?;
        pages_from_text(&text)
    }
}

fn paginate(text: &str) -> Vec<PageText> {
    let raw_pages: Vec<&str> = if text.contains('\x0C') {
        text.split('\x0C').collect()
    } else {
        vec![text]
    };

    raw_pages
        .iter()
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(idx, page)| PageText {
            page: idx + 1,
            text: page.trim().to_string(),
        })
        .collect()
}
