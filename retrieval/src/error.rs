//! Error types for the retrieval engine.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval engine.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] commitrag_embeddings::EmbeddingError),

    /// Generation service error.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// External command could not be run.
    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    /// File could not be read into a document.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from the text-generation service.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
