//! Pipeline stages for test generation and publishing.
//!
//! Each submodule implements exactly one step behind a small capability
//! trait, so the orchestrator can be exercised with in-process fakes and any
//! backend can be swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ postprocess ──▶ layout ──▶ render ──▶ pin
//! (upload)  (lopdf)    (LLM)    (cleanup)       (wrap)     (lopdf)   (Pinata)
//! ```
//!
//! 1. [`input`]: accept the uploaded bytes, sanitise the filename
//! 2. [`extract`]: page-ordered text via lopdf, blank pages skipped
//! 3. [`llm`]: one bounded LLM call producing three similar tests
//! 4. [`postprocess`]: deterministic cleanup of the text handed to the renderer
//! 5. [`layout`]: Helvetica metrics, word wrap, pagination
//! 6. [`render`]: write the laid-out pages as a PDF
//! 7. [`pin`]: upload to Pinata, the only stage besides [`llm`] with
//!    network I/O

pub mod extract;
pub mod input;
pub mod layout;
pub mod llm;
pub mod pin;
pub mod postprocess;
pub mod render;
