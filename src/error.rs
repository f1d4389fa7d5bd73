//! Error types for the hierarchical chunker.

/// Errors that can occur while chunking.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `mode` did not match any of the recognized aliases (spec §4.9).
    #[error("unrecognized chunk mode: {0:?}")]
    UnknownMode(String),

    /// Image mode requires a non-empty `preview_url`.
    #[error("preview_url is required for image mode")]
    MissingPreviewUrl,
}

/// Result type for chunking operations.
pub type Result<T> = std::result::Result<T, Error>;
