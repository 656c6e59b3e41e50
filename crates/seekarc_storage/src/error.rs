//! Error types for sink operations.

use std::io;
use thiserror::Error;

/// Result type for sink operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while writing to a sink.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The sink accepted fewer bytes than it was given.
    #[error("short write: accepted {written} of {expected} bytes")]
    ShortWrite {
        /// Number of bytes offered to the sink.
        expected: usize,
        /// Number of bytes the sink accepted.
        written: usize,
    },

    /// The sink has already been closed.
    #[error("sink is closed")]
    Closed,
}
