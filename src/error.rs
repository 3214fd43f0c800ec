//! Errors raised while turning an upload into a merged batch.

use crate::models::SessionError;

/// A batch could not be processed. The batch is dropped and no ledger changes.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ProcessingError {
    #[error("No images provided")]
    NoImages,
    /// Network failure, timeout, or an unreadable response body.
    #[error("Could not reach the extraction backend: {0}")]
    Transport(String),
    /// Non-2xx status from the backend.
    #[error("Upload failed: {status} - {message}")]
    Backend { status: u16, message: String },
    /// The backend answered `success: false` (or left the flag out).
    #[error("{0}")]
    Rejected(String),
    /// The response is missing required structure.
    #[error("Malformed extraction response: {0}")]
    Malformed(String),
}

/// Failure of the whole upload workflow.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error("lock error")]
    Lock,
}
