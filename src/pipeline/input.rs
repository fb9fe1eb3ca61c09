//! Upload intake: turn a multipart file part into an [`UploadedDocument`].
//!
//! Uploads stay in memory for the whole request. Each one gets a fresh UUID
//! which also names the generated document, so concurrent requests never
//! share a file name.

use crate::error::TestgenError;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

/// Filename used when the client's name sanitises down to nothing.
const FALLBACK_FILENAME: &str = "upload.pdf";

/// A document received in one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Per-request unique id.
    pub id: Uuid,
    /// Sanitised base name, used as the pin name of the original.
    pub filename: String,
    /// Raw bytes as uploaded.
    pub bytes: Bytes,
}

impl UploadedDocument {
    /// Accept an uploaded file.
    ///
    /// # Errors
    /// [`TestgenError::EmptyFilename`] when the client sent a file part with
    /// an empty filename (a form submitted with no file chosen).
    pub fn new(filename: &str, bytes: impl Into<Bytes>) -> Result<Self, TestgenError> {
        if filename.trim().is_empty() {
            return Err(TestgenError::EmptyFilename);
        }
        let doc = Self {
            id: Uuid::new_v4(),
            filename: sanitize_filename(filename),
            bytes: bytes.into(),
        };
        debug!(
            "Accepted upload {} '{}' ({} bytes)",
            doc.id,
            doc.filename,
            doc.bytes.len()
        );
        Ok(doc)
    }

    /// Pin name for the document generated from this upload.
    pub fn generated_filename(&self) -> String {
        format!("generated_tests_{}.pdf", self.id.simple())
    }
}

/// Reduce a client-supplied filename to a safe base name.
///
/// Drops any directory components (both separators), control characters and
/// leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .trim_start_matches('.')
        .to_string();

    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned
    }
}

/// Check the `%PDF` magic bytes.
pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == b"%PDF"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("exam.pdf"), "exam.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\quiz 1.pdf"), "quiz 1.pdf");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("a\u{0}b.pdf"), "ab.pdf");
        assert_eq!(sanitize_filename("dir/"), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(".."), FALLBACK_FILENAME);
    }

    #[test]
    fn test_empty_filename_rejected() {
        let err = UploadedDocument::new("", b"%PDF-1.5".to_vec()).unwrap_err();
        assert!(matches!(err, TestgenError::EmptyFilename));
        let err = UploadedDocument::new("   ", b"%PDF-1.5".to_vec()).unwrap_err();
        assert!(matches!(err, TestgenError::EmptyFilename));
    }

    #[test]
    fn test_generated_names_are_unique_per_upload() {
        let a = UploadedDocument::new("test.pdf", Bytes::from_static(b"%PDF")).unwrap();
        let b = UploadedDocument::new("test.pdf", Bytes::from_static(b"%PDF")).unwrap();
        assert_ne!(a.generated_filename(), b.generated_filename());
        assert!(a.generated_filename().starts_with("generated_tests_"));
        assert!(a.generated_filename().ends_with(".pdf"));
    }

    #[test]
    fn test_pdf_magic() {
        assert!(has_pdf_magic(b"%PDF-1.7\n..."));
        assert!(!has_pdf_magic(b"PK\x03\x04"));
        assert!(!has_pdf_magic(b"%PD"));
        assert!(!has_pdf_magic(b""));
    }
}
