//! # pdf-testgen
//!
//! Upload a PDF test, get three similar tests back as a new PDF, with both
//! documents pinned to IPFS through Pinata.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /generate (multipart "file")
//!  │
//!  ├─ 1. Input     in-memory upload, sanitised name, per-request UUID
//!  ├─ 2. Extract   page-ordered text via lopdf (spawn_blocking)
//!  ├─ 3. Generate  one LLM call: three similar tests
//!  ├─ 4. Render    word-wrapped A4 Helvetica PDF via lopdf (spawn_blocking)
//!  ├─ 5. Publish   pin original, then generated, to Pinata
//!  └─ 6. Respond   {"message", "original_cid", "generated_cid"}
//! ```
//!
//! Any failing stage ends the run; nothing after it is attempted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_testgen::{router, AppState, Orchestrator, PinataCredentials, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LLM provider key is read from OPENAI_API_KEY
//!     let config = ServiceConfig::builder()
//!         .pinata_credentials(PinataCredentials::jwt(std::env::var("PINATA_JWT")?))
//!         .build()?;
//!     let orchestrator = Orchestrator::from_config(&config)?;
//!     let app = router(AppState::new(orchestrator, config));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-testgen` server binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PinataCredentials, ServiceConfig, ServiceConfigBuilder};
pub use error::{ExtractError, GenerationError, PinningError, RenderError, TestgenError};
pub use orchestrator::{Orchestrator, Stage};
pub use output::{PipelineOutput, PipelineStats};
pub use pipeline::extract::{LopdfExtractor, TextExtractor};
pub use pipeline::input::UploadedDocument;
pub use pipeline::llm::{Generated, Generator};
pub use pipeline::pin::{PinRecord, PinataClient, PinnedFile, Pinner};
pub use pipeline::render::{DocumentRenderer, PdfRenderer, RenderedDocument};
pub use server::{router, serve, AppState, GenerateResponse};
