//! The upload → extract → generate → render → publish sequence.
//!
//! One [`Orchestrator`] is built at startup and shared (read-only) by every
//! request. A run walks the [`Stage`]s strictly forward; the first failure
//! ends it and is returned as a [`TestgenError`]. Nothing partial is
//! returned: if pinning the generated document fails after the original was
//! pinned, the original's CID only appears in the logs.

use crate::config::ServiceConfig;
use crate::error::TestgenError;
use crate::output::{PipelineOutput, PipelineStats};
use crate::pipeline::extract::{LopdfExtractor, TextExtractor};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::llm::{resolve_generator, Generator};
use crate::pipeline::pin::{PinRecord, PinataClient, Pinner};
use crate::pipeline::render::{DocumentRenderer, PdfRenderer};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Position of a run in the pipeline. Runs only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    Extracted,
    Generated,
    Rendered,
    Published,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::Generated => "generated",
            Stage::Rendered => "rendered",
            Stage::Published => "published",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Wires the four capabilities together.
#[derive(Clone)]
pub struct Orchestrator {
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn Generator>,
    renderer: Arc<dyn DocumentRenderer>,
    pinner: Arc<dyn Pinner>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Assemble from explicit capabilities.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn Generator>,
        renderer: Arc<dyn DocumentRenderer>,
        pinner: Arc<dyn Pinner>,
    ) -> Self {
        Self {
            extractor,
            generator,
            renderer,
            pinner,
        }
    }

    /// Build the production pipeline: lopdf extraction and rendering, the
    /// configured LLM provider, and the Pinata API.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, TestgenError> {
        let pinner = PinataClient::from_config(config)?;
        if config.pinata_credentials.is_none() {
            warn!("Pinata credentials are not set; publishing will fail until they are");
        }
        Ok(Self::new(
            Arc::new(LopdfExtractor),
            resolve_generator(config),
            Arc::new(PdfRenderer::default()),
            Arc::new(pinner),
        ))
    }

    /// Run one upload through every stage.
    pub async fn run(&self, upload: UploadedDocument) -> Result<PipelineOutput, TestgenError> {
        let total_start = Instant::now();
        let request_id = upload.id;
        let mut stats = PipelineStats::default();
        info!(%request_id, filename = %upload.filename, "Pipeline {}", Stage::Received);

        // ── Extract ──────────────────────────────────────────────────────
        let start = Instant::now();
        let content = self.extractor.extract(upload.bytes.clone()).await?;
        stats.extract_duration_ms = start.elapsed().as_millis() as u64;
        stats.extracted_chars = content.chars().count();
        info!(%request_id, chars = stats.extracted_chars, "Pipeline {}", Stage::Extracted);

        // ── Generate ─────────────────────────────────────────────────────
        let start = Instant::now();
        let generated = self.generator.generate(&content).await?;
        stats.generate_duration_ms = start.elapsed().as_millis() as u64;
        stats.generated_chars = generated.text.chars().count();
        stats.input_tokens = generated.input_tokens;
        stats.output_tokens = generated.output_tokens;
        info!(%request_id, chars = stats.generated_chars, "Pipeline {}", Stage::Generated);

        // ── Render ───────────────────────────────────────────────────────
        let start = Instant::now();
        let rendered = self.renderer.render(generated.text).await?;
        stats.render_duration_ms = start.elapsed().as_millis() as u64;
        stats.generated_pages = rendered.pages;
        info!(%request_id, pages = rendered.pages, "Pipeline {}", Stage::Rendered);

        // ── Publish ──────────────────────────────────────────────────────
        let start = Instant::now();
        let generated_name = upload.generated_filename();
        let original = self.pinner.pin(&upload.filename, upload.bytes).await?;
        let generated = match self.pinner.pin(&generated_name, rendered.bytes).await {
            Ok(pinned) => pinned,
            Err(e) => {
                warn!(
                    %request_id,
                    original_cid = %original.cid,
                    "Original was pinned but the generated document was not: {}", e
                );
                return Err(e.into());
            }
        };
        stats.publish_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            %request_id,
            original_cid = %original.cid,
            generated_cid = %generated.cid,
            "Pipeline {}", Stage::Published
        );

        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        debug!(%request_id, ?stats, "Pipeline {}", Stage::Responded);

        Ok(PipelineOutput {
            original,
            generated,
            stats,
        })
    }

    /// Recent pins from the pinning service.
    pub async fn list_pins(&self, limit: usize) -> Result<Vec<PinRecord>, TestgenError> {
        Ok(self.pinner.list_pins(limit).await?)
    }
}
