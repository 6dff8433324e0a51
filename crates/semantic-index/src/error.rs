//! Error types for the vector store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by embedding, search, and snapshot persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Cosine similarity against a zero-norm vector has no defined value.
    /// `id` names the stored item when the zero vector came from the store.
    #[error(
        "cosine similarity undefined for zero-norm vector ({})",
        .id.as_deref().unwrap_or("query")
    )]
    UndefinedSimilarity { id: Option<String> },

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The persisted snapshot exists but cannot be trusted.
    #[error("corrupt snapshot {}: {reason}", path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },

    /// A bulk-ingest records file is not a JSON array of text records.
    #[error("invalid records file {}: {reason}", path.display())]
    InvalidRecords { path: PathBuf, reason: String },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for vector store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
