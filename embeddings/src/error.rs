//! Error types for the embeddings system.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur in the embeddings system.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Provider has no vectors to offer.
    #[error("word-vector provider not configured")]
    ProviderNotConfigured,

    /// Word-vector table could not be loaded.
    #[error("word-vector table {} unavailable: {reason}", path.display())]
    ProviderUnavailable { path: PathBuf, reason: String },

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Malformed word-vector entry.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}
