//! Text extraction: PDF bytes → plain text, in page order.
//!
//! Parsing is done by `lopdf` directly from the in-memory upload, inside
//! `spawn_blocking` since it is CPU-bound. Blank or undecodable pages are
//! skipped with a warning; only a document with no text at all is an error.

use crate::error::ExtractError;
use crate::pipeline::input::has_pdf_magic;
use async_trait::async_trait;
use bytes::Bytes;
use lopdf::Document;
use tracing::{debug, info, warn};

/// Extracts the text content of a paginated document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Concatenate the text of every page, in page order.
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractError>;
}

/// [`TextExtractor`] backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

#[async_trait]
impl TextExtractor for LopdfExtractor {
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractError> {
        tokio::task::spawn_blocking(move || extract_text_blocking(&pdf)).await?
    }
}

/// Blocking implementation of text extraction.
pub fn extract_text_blocking(pdf: &[u8]) -> Result<String, ExtractError> {
    if !has_pdf_magic(pdf) {
        let shown = &pdf[..pdf.len().min(4)];
        return Err(ExtractError::Parse {
            detail: format!("missing %PDF header (first bytes: {shown:?})"),
        });
    }

    let document = Document::load_mem(pdf).map_err(|e| ExtractError::Parse {
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    let total_pages = pages.len();
    info!("PDF loaded: {} pages", total_pages);

    let mut content = String::new();
    for &page_num in pages.keys() {
        match document.extract_text(&[page_num]) {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Page {}: {} chars", page_num, text.len());
                content.push_str(&text);
                if !text.ends_with('\n') {
                    content.push('\n');
                }
            }
            Ok(_) => warn!("No text extracted from page {}", page_num),
            Err(e) => warn!("No text extracted from page {}: {}", page_num, e),
        }
    }

    if content.trim().is_empty() {
        return Err(ExtractError::Empty { pages: total_pages });
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render::write_pdf;
    use lopdf::{dictionary, Object, Stream};

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_pages_in_order_skipping_blank_pages() {
        let pdf = write_pdf(&[
            lines(&["Question 1: What is the capital of France?"]),
            vec![],
            lines(&["Question 2: Name a prime number."]),
        ])
        .unwrap();

        let text = extract_text_blocking(&pdf).unwrap();
        let q1 = text.find("Question 1").expect("page 1 text");
        let q2 = text.find("Question 2").expect("page 3 text");
        assert!(q1 < q2, "pages out of order: {text:?}");
    }

    #[test]
    fn undecodable_page_is_skipped() {
        let pdf = write_pdf(&[
            lines(&["Question 1: first page"]),
            lines(&["Question 2: lost page"]),
            lines(&["Question 3: last page"]),
        ])
        .unwrap();

        // `Tf` with a number instead of a font name makes page 2 fail.
        let mut doc = Document::load_mem(&pdf).unwrap();
        let page_two = doc.get_pages()[&2];
        let content_id = doc
            .get_dictionary(page_two)
            .unwrap()
            .get(b"Contents")
            .and_then(Object::as_reference)
            .unwrap();
        doc.objects.insert(
            content_id,
            Object::Stream(Stream::new(
                dictionary! {},
                b"BT 12 Tf (Question 2: lost page) Tj ET".to_vec(),
            )),
        );
        let mut broken = Vec::new();
        doc.save_to(&mut broken).unwrap();

        let text = extract_text_blocking(&broken).unwrap();
        assert!(text.contains("Question 1: first page"), "got {text:?}");
        assert!(text.contains("Question 3: last page"), "got {text:?}");
        assert!(!text.contains("lost page"), "got {text:?}");
    }

    #[test]
    fn all_blank_pages_is_empty_not_parse_error() {
        let pdf = write_pdf(&[vec![], vec![]]).unwrap();
        assert_eq!(
            extract_text_blocking(&pdf),
            Err(ExtractError::Empty { pages: 2 })
        );
    }

    #[test]
    fn whitespace_only_page_counts_as_blank() {
        let pdf = write_pdf(&[lines(&["   "])]).unwrap();
        assert_eq!(
            extract_text_blocking(&pdf),
            Err(ExtractError::Empty { pages: 1 })
        );
    }

    #[test]
    fn non_pdf_is_parse_error() {
        let err = extract_text_blocking(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn truncated_pdf_is_parse_error() {
        let err = extract_text_blocking(b"%PDF-1.5\n%garbage").unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn async_extractor_runs_off_the_runtime() {
        let pdf = write_pdf(&[lines(&["Hello from page one"])]).unwrap();
        let text = LopdfExtractor.extract(Bytes::from(pdf)).await.unwrap();
        assert!(text.contains("Hello from page one"));
    }
}
