//! PDF text extraction
//!
//! The pipeline treats PDF text recovery as an opaque capability: bytes in,
//! optional per-page text out. The default backend uses the pure-Rust
//! `pdf-extract` crate.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::extract::error::ExtractError;
use crate::extract::fetch::looks_like_pdf;

/// Recover the text layer of a PDF, one string per page
pub trait PdfTextExtractor: Send + Sync {
    /// `None` when the document cannot be read at all
    fn extract_pages(&self, bytes: &[u8]) -> Option<Vec<String>>;
}

/// `pdf-extract` backed implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractBackend;

impl PdfTextExtractor for PdfExtractBackend {
    fn extract_pages(&self, bytes: &[u8]) -> Option<Vec<String>> {
        if !looks_like_pdf(bytes) {
            debug!("Skipping PDF extraction: missing %PDF- header");
            return None;
        }

        // pdf-extract panics on some malformed documents
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));
        match result {
            Ok(Ok(pages)) => Some(pages),
            Ok(Err(e)) => {
                warn!("PDF text extraction failed: {:?}", e);
                None
            }
            Err(_) => {
                warn!("PDF text extraction panicked");
                None
            }
        }
    }
}

/// Join the non-empty page texts with blank lines.
///
/// A document with no text layer (scanned or encrypted) is a failure, not an
/// empty success.
pub fn pdf_to_text(extractor: &dyn PdfTextExtractor, bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = extractor
        .extract_pages(bytes)
        .ok_or(ExtractError::PdfExtractionFailed)?;

    let text = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if text.is_empty() {
        Err(ExtractError::PdfExtractionFailed)
    } else {
        debug!("Extracted {} chars from {} PDF pages", text.len(), pages.len());
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Returns fixed pages regardless of input
    pub(crate) struct FixedPages(pub Option<Vec<&'static str>>);

    impl PdfTextExtractor for FixedPages {
        fn extract_pages(&self, _bytes: &[u8]) -> Option<Vec<String>> {
            self.0
                .as_ref()
                .map(|pages| pages.iter().map(|p| p.to_string()).collect())
        }
    }

    #[test]
    fn test_pages_joined_with_blank_lines() {
        let extractor = FixedPages(Some(vec!["Page one text\n", "", "  Page two text"]));
        assert_eq!(
            pdf_to_text(&extractor, b"%PDF-1.4").unwrap(),
            "Page one text\n\nPage two text"
        );
    }

    #[test]
    fn test_empty_text_is_failure() {
        let extractor = FixedPages(Some(vec!["", "   "]));
        assert_eq!(
            pdf_to_text(&extractor, b"%PDF-1.4"),
            Err(ExtractError::PdfExtractionFailed)
        );
        assert_eq!(
            pdf_to_text(&FixedPages(None), b"%PDF-1.4"),
            Err(ExtractError::PdfExtractionFailed)
        );
    }

    #[test]
    fn test_backend_rejects_non_pdf_bytes() {
        assert!(PdfExtractBackend.extract_pages(b"<html>not a pdf</html>").is_none());
    }

    #[test]
    fn test_backend_survives_garbage_pdf() {
        let garbage = b"%PDF-1.4\nthis is not really a pdf\n%%EOF";
        assert!(pdf_to_text(&PdfExtractBackend, garbage).is_err());
    }
}
