//! Error types for the pdf-testgen library.
//!
//! Each pipeline stage has its own error type so that a capability can be
//! swapped or faked without dragging the whole taxonomy along:
//!
//! * [`ExtractError`]: the upload could not be read as text.
//! * [`GenerationError`]: the language model produced nothing usable.
//! * [`RenderError`]: the generated text could not be laid out as a PDF.
//! * [`PinningError`]: the pinning service refused or never answered.
//!
//! All of them convert into [`TestgenError`], the single fatal error returned
//! by [`crate::orchestrator::Orchestrator::run`] and mapped to an HTTP status
//! by [`crate::server`].

use thiserror::Error;

/// All fatal errors returned by the pdf-testgen library.
#[derive(Debug, Error)]
pub enum TestgenError {
    // ── Upload errors ─────────────────────────────────────────────────────
    /// The multipart request carried no `file` part.
    #[error("No file uploaded")]
    NoFile,

    /// A `file` part was present but its filename was empty.
    #[error("No file selected")]
    EmptyFilename,

    /// The multipart body itself could not be read.
    #[error("Failed to read upload: {detail}")]
    MalformedUpload { detail: String, too_large: bool },

    // ── Extraction errors ────────────────────────────────────────────────
    /// The upload is not a PDF or its structure is corrupt.
    #[error("Uploaded file is not a readable PDF: {detail}")]
    DocumentParse { detail: String },

    /// The PDF parsed, but none of its pages contained any text.
    #[error("Failed to extract content from the uploaded PDF")]
    ExtractionEmpty { pages: usize },

    // ── Backend errors ────────────────────────────────────────────────────
    #[error("Error generating tests: {0}")]
    Generation(#[from] GenerationError),

    #[error("Error rendering generated tests: {0}")]
    Render(#[source] RenderError),

    #[error("Error uploading to Pinata: {0}")]
    PinningService(#[from] PinningError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TestgenError {
    /// Whether the failure was caused by what the client sent rather than by
    /// a backend service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TestgenError::NoFile
                | TestgenError::EmptyFilename
                | TestgenError::MalformedUpload { .. }
                | TestgenError::DocumentParse { .. }
                | TestgenError::ExtractionEmpty { .. }
        )
    }
}

/// Text extraction failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// Missing `%PDF` header, corrupt xref, unreadable object tree.
    #[error("{detail}")]
    Parse { detail: String },

    /// Every page was blank or undecodable.
    #[error("no text found on any of {pages} pages")]
    Empty { pages: usize },

    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ExtractError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExtractError::Internal(e.to_string())
    }
}

impl From<ExtractError> for TestgenError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Parse { detail } => TestgenError::DocumentParse { detail },
            ExtractError::Empty { pages } => TestgenError::ExtractionEmpty { pages },
            e @ ExtractError::Internal(_) => TestgenError::Internal(e.to_string()),
        }
    }
}

/// Generation failures. Never rendered or published.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider could not be created at startup (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured: {hint}")]
    NotConfigured { provider: String, hint: String },

    /// The provider did not answer within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Transport, authentication, quota or rejection error from the provider.
    #[error("LLM API error: {message}")]
    Provider { message: String },

    /// The provider answered but returned no text.
    #[error("LLM returned an empty completion")]
    EmptyResponse,
}

/// Rendering failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The character has no glyph in the WinAnsi-encoded standard font.
    #[error("character {ch:?} (U+{code:04X}) on line {line} cannot be encoded in WinAnsi")]
    UnsupportedCharacter { ch: char, code: u32, line: usize },

    /// lopdf failed to encode the content stream or serialise the document.
    #[error("failed to write PDF: {0}")]
    Write(String),

    /// The blocking render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(e: tokio::task::JoinError) -> Self {
        RenderError::Internal(e.to_string())
    }
}

impl From<RenderError> for TestgenError {
    fn from(e: RenderError) -> Self {
        match e {
            e @ RenderError::Internal(_) => TestgenError::Internal(e.to_string()),
            e => TestgenError::Render(e),
        }
    }
}

/// Pinning service failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PinningError {
    /// Neither a key pair nor a JWT was configured.
    #[error("Pinata credentials are not configured (set PINATA_API_KEY and PINATA_SECRET_API_KEY, or PINATA_JWT)")]
    MissingCredentials,

    /// No response within the configured timeout.
    #[error("request to Pinata timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Connection, TLS or body-streaming failure.
    #[error("could not reach Pinata: {0}")]
    Transport(String),

    /// Non-2xx status; `body` is the raw response for diagnostics.
    #[error("Pinata returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// 2xx status, but the body did not carry the expected fields.
    #[error("unexpected Pinata response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_messages_match_wire_contract() {
        assert_eq!(TestgenError::NoFile.to_string(), "No file uploaded");
        assert_eq!(TestgenError::EmptyFilename.to_string(), "No file selected");
        assert_eq!(
            TestgenError::ExtractionEmpty { pages: 2 }.to_string(),
            "Failed to extract content from the uploaded PDF"
        );
    }

    #[test]
    fn extract_error_converts_to_matching_variant() {
        let e: TestgenError = ExtractError::Empty { pages: 3 }.into();
        assert!(matches!(e, TestgenError::ExtractionEmpty { pages: 3 }));

        let e: TestgenError = ExtractError::Parse {
            detail: "bad xref".into(),
        }
        .into();
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn rejected_pin_keeps_raw_body() {
        let e: TestgenError = PinningError::Rejected {
            status: 401,
            body: r#"{"error":"Invalid API key"}"#.into(),
        }
        .into();
        let msg = e.to_string();
        assert!(msg.contains("401"), "got: {msg}");
        assert!(msg.contains("Invalid API key"), "got: {msg}");
    }

    #[test]
    fn unsupported_character_display() {
        let e = RenderError::UnsupportedCharacter {
            ch: '≤',
            code: '≤' as u32,
            line: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("U+2264"), "got: {msg}");
        assert!(msg.contains("line 4"), "got: {msg}");
    }

    #[tokio::test]
    async fn failed_blocking_task_is_internal_not_client_error() {
        let join_err = tokio::task::spawn_blocking(|| panic!("lopdf blew up"))
            .await
            .unwrap_err();
        let e: TestgenError = ExtractError::from(join_err).into();
        assert!(matches!(e, TestgenError::Internal(_)), "got {e:?}");
        assert!(!e.is_client_error());

        let join_err = tokio::task::spawn_blocking(|| panic!("writer blew up"))
            .await
            .unwrap_err();
        let e: TestgenError = RenderError::from(join_err).into();
        assert!(matches!(e, TestgenError::Internal(_)), "got {e:?}");
    }

    #[test]
    fn render_write_error_stays_a_render_error() {
        let e: TestgenError = RenderError::Write("xref".into()).into();
        assert!(matches!(e, TestgenError::Render(RenderError::Write(_))));
    }

    #[test]
    fn client_errors_are_upload_and_extraction_only() {
        assert!(TestgenError::NoFile.is_client_error());
        assert!(TestgenError::DocumentParse { detail: "x".into() }.is_client_error());
        assert!(!TestgenError::Generation(GenerationError::EmptyResponse).is_client_error());
        assert!(!TestgenError::PinningService(PinningError::MissingCredentials).is_client_error());
        assert!(!TestgenError::Internal("boom".into()).is_client_error());
    }
}
