//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is synchronous and
//! CPU-bound. [`extract_text`] moves the work onto tokio's blocking pool so a
//! large upload never stalls the async worker threads serving other requests.
//!
//! The library is located through `pdfium-auto`: `PDFIUM_LIB_PATH` if set,
//! otherwise the per-user cache (downloaded on first use).

use crate::error::SummarizerError;
use crate::output::{count_words, ExtractResult};
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Produces the text of every page of an in-memory PDF, in page order.
///
/// Implementations are blocking; callers go through [`extract_text`].
pub trait PdfTextExtractor: Send + Sync {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, SummarizerError>;
}

/// [`PdfTextExtractor`] backed by pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumExtractor;

impl PdfTextExtractor for PdfiumExtractor {
    fn page_texts(&self, bytes: &[u8]) -> Result<Vec<String>, SummarizerError> {
        let pdfium = pdfium_auto::bind_pdfium_silent().map_err(|e| {
            SummarizerError::PdfExtractionFailed {
                detail: format!("pdfium unavailable: {e}"),
            }
        })?;

        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            SummarizerError::PdfExtractionFailed {
                detail: format!("{:?}", e),
            }
        })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| SummarizerError::PdfExtractionFailed {
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?
                .all();
            debug!("Page {}: {} chars", idx + 1, text.chars().count());
            texts.push(text);
        }

        Ok(texts)
    }
}

/// Extract and assemble the text of `bytes` on the blocking pool.
pub async fn extract_text(
    extractor: Arc<dyn PdfTextExtractor>,
    bytes: Vec<u8>,
) -> Result<ExtractResult, SummarizerError> {
    let pages = tokio::task::spawn_blocking(move || extractor.page_texts(&bytes))
        .await
        .map_err(|e| SummarizerError::Internal(format!("Extraction task panicked: {}", e)))??;

    assemble_pages(&pages)
}

/// Join page texts into an [`ExtractResult`].
///
/// Pages with empty text are skipped; every other page is followed by a
/// newline. `text` is the trimmed result, while `character_count` and
/// `word_count` are measured before trimming. `pages` counts every page.
pub fn assemble_pages(pages: &[String]) -> Result<ExtractResult, SummarizerError> {
    let mut content = String::new();
    for page in pages.iter().filter(|p| !p.is_empty()) {
        content.push_str(page);
        content.push('\n');
    }

    let text = content.trim();
    if text.is_empty() {
        return Err(SummarizerError::NoTextInPdf);
    }

    Ok(ExtractResult {
        text: text.to_string(),
        pages: pages.len(),
        character_count: content.chars().count(),
        word_count: count_words(&content),
    })
}

/// `true` when `filename` ends in `.pdf`, ignoring case.
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf")
}
