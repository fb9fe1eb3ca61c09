//! Result types produced by a pipeline run.

use crate::pipeline::pin::PinnedFile;
use serde::{Deserialize, Serialize};

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// The uploaded document, as pinned.
    pub original: PinnedFile,
    /// The generated document, as pinned.
    pub generated: PinnedFile,
    pub stats: PipelineStats,
}

/// Sizes and timings of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub extracted_chars: usize,
    pub generated_chars: usize,
    pub generated_pages: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub extract_duration_ms: u64,
    pub generate_duration_ms: u64,
    pub render_duration_ms: u64,
    pub publish_duration_ms: u64,
    pub total_duration_ms: u64,
}
