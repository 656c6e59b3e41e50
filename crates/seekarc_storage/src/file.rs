//! File-based sink for archives on disk.

use crate::error::{StorageError, StorageResult};
use crate::sink::ArchiveSink;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// A file-based sink.
///
/// The file is created (or truncated) when the sink is opened and every
/// write is appended through a buffered writer.
///
/// # Durability
///
/// `close()` flushes and calls `File::sync_all()` so the archive, including
/// its seek table, is on disk before the writer reports success.
///
/// # Example
///
/// ```no_run
/// use seekarc_storage::{ArchiveSink, FileSink};
/// use std::path::Path;
///
/// let mut sink = FileSink::create(Path::new("data.zst")).unwrap();
/// sink.write(b"compressed bytes").unwrap();
/// sink.close().unwrap();
/// ```
#[derive(Debug)]
pub struct FileSink {
    file: Option<BufWriter<File>>,
}

impl FileSink {
    /// Creates the file at `path`, truncating any existing content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file: Some(BufWriter::new(file)),
        })
    }

    /// Returns `true` once the sink has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl ArchiveSink for FileSink {
    fn write(&mut self, data: &[u8]) -> StorageResult<usize> {
        let file = self.file.as_mut().ok_or(StorageError::Closed)?;
        if data.is_empty() {
            return Ok(0);
        }
        file.write_all(data)?;
        Ok(data.len())
    }

    fn close(&mut self) -> StorageResult<()> {
        let file = self.file.take().ok_or(StorageError::Closed)?;
        let file = file.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}
