//! In-memory sink for testing.

use crate::error::{StorageError, StorageResult};
use crate::sink::ArchiveSink;
use parking_lot::RwLock;
use std::sync::Arc;

/// Handle to the bytes collected by an [`InMemorySink`].
///
/// The sink is moved into the archive writer and consumed on close, so tests
/// keep a `SharedBuffer` to look at the archive afterwards.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<RwLock<Vec<u8>>>,
}

impl SharedBuffer {
    /// Returns a copy of the collected bytes.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.read().clone()
    }

    /// Returns the number of collected bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// An in-memory sink.
///
/// This sink keeps all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Archives that are shipped elsewhere instead of written to disk
///
/// # Example
///
/// ```rust
/// use seekarc_storage::{ArchiveSink, InMemorySink};
///
/// let mut sink = InMemorySink::new();
/// assert_eq!(sink.write(b"test data").unwrap(), 9);
/// assert_eq!(sink.contents().len(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySink {
    buffer: SharedBuffer,
    closed: bool,
}

impl InMemorySink {
    /// Creates a new empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that stays valid after the sink is consumed.
    #[must_use]
    pub fn contents(&self) -> SharedBuffer {
        self.buffer.clone()
    }

    /// Returns `true` once the sink has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ArchiveSink for InMemorySink {
    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        self.buffer.inner.write().extend_from_slice(data);
        Ok(data.len())
    }

    fn close(&mut self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        self.closed = true;
        Ok(())
    }
}
