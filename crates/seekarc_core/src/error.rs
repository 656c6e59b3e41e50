//! Error types for seekarc core.

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Broad category of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A resource or buffer could not be allocated.
    Allocation,
    /// A configuration value was rejected.
    Configuration,
    /// The compression engine or the frame log reported an internal error.
    Engine,
    /// The sink failed to open, write, flush or close.
    Sink,
    /// The writer is not in a state that allows the operation.
    State,
}

/// Errors that can occur in archive writer operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Sink error.
    #[error("sink error: {0}")]
    Storage(#[from] seekarc_storage::StorageError),

    /// A buffer or engine context could not be allocated.
    #[error("allocation failed: {what}")]
    Allocation {
        /// What was being allocated.
        what: String,
    },

    /// The configuration is invalid before any resource is touched.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// The compression engine refused a parameter.
    #[error("engine rejected {parameter}: {message}")]
    ConfigurationRejected {
        /// Parameter name.
        parameter: &'static str,
        /// Engine-provided reason.
        message: String,
    },

    /// The compression engine failed while compressing or ending a frame.
    #[error("compression engine error during {operation}: {message}")]
    Engine {
        /// Operation that failed.
        operation: &'static str,
        /// Engine-provided reason.
        message: String,
    },

    /// The frame log refused a record or failed to serialize.
    #[error("frame log error: {message}")]
    FrameLog {
        /// Description of the failure.
        message: String,
    },

    /// A previous operation failed and left the writer unusable.
    #[error("archive writer is poisoned by an earlier failure")]
    Poisoned,

    /// The writer has already been closed.
    #[error("archive writer is closed")]
    Closed,
}

impl CoreError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Sink,
            Self::Allocation { .. } => ErrorKind::Allocation,
            Self::InvalidConfig { .. } | Self::ConfigurationRejected { .. } => {
                ErrorKind::Configuration
            }
            Self::Engine { .. } | Self::FrameLog { .. } => ErrorKind::Engine,
            Self::Poisoned | Self::Closed => ErrorKind::State,
        }
    }

    /// Creates an allocation error.
    pub fn allocation(what: impl Into<String>) -> Self {
        Self::Allocation { what: what.into() }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a configuration rejected error.
    pub fn configuration_rejected(parameter: &'static str, message: impl Into<String>) -> Self {
        Self::ConfigurationRejected {
            parameter,
            message: message.into(),
        }
    }

    /// Creates an engine error.
    pub fn engine(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Engine {
            operation,
            message: message.into(),
        }
    }

    /// Creates a frame log error.
    pub fn frame_log(message: impl Into<String>) -> Self {
        Self::FrameLog {
            message: message.into(),
        }
    }
}

/// Allocates a zeroed buffer of `len` bytes, reporting failure instead of aborting.
pub(crate) fn try_alloc(len: usize, what: &str) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e: TryReserveError| CoreError::allocation(format!("{what} ({len} bytes): {e}")))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_categories() {
        let storage = CoreError::from(seekarc_storage::StorageError::Closed);
        assert_eq!(storage.kind(), ErrorKind::Sink);
        assert_eq!(CoreError::allocation("x").kind(), ErrorKind::Allocation);
        assert_eq!(
            CoreError::configuration_rejected("strategy", "bad").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(CoreError::invalid_config("x").kind(), ErrorKind::Configuration);
        assert_eq!(CoreError::engine("compress", "x").kind(), ErrorKind::Engine);
        assert_eq!(CoreError::frame_log("x").kind(), ErrorKind::Engine);
        assert_eq!(CoreError::Poisoned.kind(), ErrorKind::State);
        assert_eq!(CoreError::Closed.kind(), ErrorKind::State);
    }

    #[test]
    fn display_carries_detail() {
        let err = CoreError::configuration_rejected("workers", "parameter unsupported");
        assert_eq!(
            err.to_string(),
            "engine rejected workers: parameter unsupported"
        );
    }

    #[test]
    fn oversized_allocation_is_reported() {
        let err = try_alloc(usize::MAX, "output buffer").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Allocation);
    }

    #[test]
    fn allocation_is_zeroed() {
        let buf = try_alloc(16, "output buffer").unwrap();
        assert_eq!(buf, vec![0u8; 16]);
    }
}
