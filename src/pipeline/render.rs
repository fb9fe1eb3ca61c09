//! PDF rendering: generated text → a new paginated PDF.
//!
//! The simplest renderer that does the job: one standard font at one size,
//! automatic word wrap and page breaks (see [`crate::pipeline::layout`]),
//! written with `lopdf` into an in-memory buffer.
//!
//! ## Character set
//!
//! Helvetica is one of the PDF standard fonts, so nothing is embedded, but it
//! only covers WinAnsi (Windows-1252). Text is first passed through
//! [`crate::pipeline::postprocess::prepare_text`], which maps harmless
//! look-alikes to ASCII; anything still outside WinAnsi (maths symbols,
//! CJK, emoji, ...) fails with [`RenderError::UnsupportedCharacter`] rather
//! than silently dropping content.

use crate::error::RenderError;
use crate::pipeline::layout::{winansi, PageLayout};
use crate::pipeline::postprocess::prepare_text;
use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::{debug, info};

/// Renders a text block as a paginated document.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, text: String) -> Result<RenderedDocument, RenderError>;
}

/// Output of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Bytes,
    pub pages: usize,
}

/// [`DocumentRenderer`] writing Helvetica text with `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer {
    pub layout: PageLayout,
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(&self, text: String) -> Result<RenderedDocument, RenderError> {
        let layout = self.layout;
        tokio::task::spawn_blocking(move || render_blocking(&text, &layout)).await?
    }
}

/// Blocking implementation of rendering.
pub fn render_blocking(text: &str, layout: &PageLayout) -> Result<RenderedDocument, RenderError> {
    let prepared = prepare_text(text);
    check_encodable(&prepared)?;

    let pages = layout.paginate(&prepared);
    let page_count = pages.len();
    let bytes = write_pdf_with_layout(&pages, layout)?;

    info!(
        "Rendered {} chars into {} pages ({} bytes)",
        prepared.len(),
        page_count,
        bytes.len()
    );
    Ok(RenderedDocument {
        bytes: Bytes::from(bytes),
        pages: page_count,
    })
}

/// Fail on the first character the standard font cannot draw.
fn check_encodable(text: &str) -> Result<(), RenderError> {
    for (line_idx, line) in text.lines().enumerate() {
        if let Some(ch) = line.chars().find(|&c| winansi(c).is_none()) {
            return Err(RenderError::UnsupportedCharacter {
                ch,
                code: ch as u32,
                line: line_idx + 1,
            });
        }
    }
    Ok(())
}

fn encode_line(line: &str) -> Vec<u8> {
    line.chars().filter_map(|c| winansi(c).map(|(b, _)| b)).collect()
}

/// Write already laid-out lines (one `Vec` per page) with the default layout.
pub fn write_pdf(pages: &[Vec<String>]) -> Result<Vec<u8>, RenderError> {
    write_pdf_with_layout(pages, &PageLayout::default())
}

/// Write already laid-out lines (one `Vec` per page) as a PDF document.
pub fn write_pdf_with_layout(
    pages: &[Vec<String>],
    layout: &PageLayout,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        layout.page_width.into(),
        layout.page_height.into(),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (page_idx, lines) in pages.iter().enumerate() {
        let mut operations = Vec::new();
        for (row, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), layout.font_size.into()]),
                Operation::new(
                    "Td",
                    vec![layout.text_x().into(), layout.baseline_y(row).into()],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::String(encode_line(line), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Write(format!("page {}: {}", page_idx + 1, e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box.clone(),
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
        debug!("Wrote page {} ({} lines)", page_idx + 1, lines.len());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| RenderError::Write(e.to_string()))?;
    Ok(buf)
}
