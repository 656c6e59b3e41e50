//! Sink trait definition.

use crate::error::{StorageError, StorageResult};

/// An append-only destination for archive bytes.
///
/// Sinks are **opaque byte destinations**. The archive writer pushes compressed
/// frame bytes and finally the seek table through `write`, then calls `close`
/// exactly once.
///
/// # Invariants
///
/// - `write` appends to the end; bytes are never reordered
/// - `write` returns how many bytes were accepted; fewer than offered is a
///   short write that callers must treat as fatal (see [`write_fully`])
/// - After `close` returns, no further writes are accepted
///
/// # Implementors
///
/// - [`super::InMemorySink`] - For testing
/// - [`super::FileSink`] - For archives on disk
pub trait ArchiveSink: Send {
    /// Appends `data` and returns the number of bytes accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink is closed or an I/O error occurs.
    fn write(&mut self, data: &[u8]) -> StorageResult<usize>;

    /// Flushes and closes the sink.
    ///
    /// A second call returns [`StorageError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush or sync fails.
    fn close(&mut self) -> StorageResult<()>;
}

/// Writes all of `data` to `sink`, turning a short write into an error.
///
/// # Errors
///
/// Returns [`StorageError::ShortWrite`] if the sink accepted fewer bytes
/// than offered, or whatever error the sink itself reported.
pub fn write_fully<S: ArchiveSink + ?Sized>(sink: &mut S, data: &[u8]) -> StorageResult<()> {
    if data.is_empty() {
        return Ok(());
    }
    let written = sink.write(data)?;
    if written < data.len() {
        return Err(StorageError::ShortWrite {
            expected: data.len(),
            written,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that accepts at most `limit` bytes per call.
    struct Stingy {
        limit: usize,
        size: u64,
    }

    impl ArchiveSink for Stingy {
        fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
            let n = data.len().min(self.limit);
            self.size += n as u64;
            Ok(n)
        }

        fn close(&mut self) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn write_fully_accepts_complete_write() {
        let mut sink = Stingy { limit: 16, size: 0 };
        write_fully(&mut sink, b"0123456789").unwrap();
        assert_eq!(sink.size, 10);
    }

    #[test]
    fn write_fully_reports_short_write() {
        let mut sink = Stingy { limit: 4, size: 0 };
        let result = write_fully(&mut sink, b"0123456789");
        assert!(matches!(
            result,
            Err(StorageError::ShortWrite {
                expected: 10,
                written: 4
            })
        ));
    }

    #[test]
    fn write_fully_skips_empty_input() {
        let mut sink = Stingy { limit: 0, size: 0 };
        write_fully(&mut sink, b"").unwrap();
        assert_eq!(sink.size, 0);
    }
}
