//! Error types for the export pipeline.
//!
//! Only the export boundary fails: the sanitizer and the layout normalizer
//! are best-effort passes that leave unmatched subtrees untouched.

use std::io;
use thiserror::Error;

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that end an export attempt.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No element with the preview id exists in the page snapshot.
    #[error("Resume preview element '{0}' not found")]
    PreviewNotFound(String),

    /// The rendering service is not deployed or not reachable.
    #[error(
        "PDF rendering service is not available at {endpoint} ({reason}). \
         Start the service locally or deploy it, then retry the export."
    )]
    ServiceUnavailable { endpoint: String, reason: String },

    /// The rendering service ran and reported a failure.
    #[error("PDF generation failed: {0}")]
    GenerationFailed(String),

    /// The service reply could not be turned into PDF bytes.
    #[error("Could not decode the generated PDF: {0}")]
    DecodeFailed(String),

    /// Invalid caller-supplied configuration (profile overrides, paths).
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error when reading the page snapshot or writing the download.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ExportError {
    /// True when the failure means the rendering service is missing rather
    /// than broken.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, ExportError::ServiceUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_unavailable_message_names_endpoint() {
        let err = ExportError::ServiceUnavailable {
            endpoint: "http://localhost:8888/generate".into(),
            reason: "HTTP 404".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://localhost:8888/generate"));
        assert!(msg.contains("HTTP 404"));
        assert!(err.is_service_unavailable());
    }

    #[test]
    fn io_errors_convert() {
        let err: ExportError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, ExportError::Io(_)));
        assert!(!err.is_service_unavailable());
    }
}
