//! Writer fixtures.
//!
//! Convenience wrappers that open a writer over memory or a temporary file
//! and hand back the finished archive bytes.

use seekarc_core::{ArchiveWriter, CoreResult, WriterConfig, ZstdEngine};
use seekarc_storage::{FileSink, InMemorySink, SharedBuffer};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A writer over an in-memory sink.
pub struct MemoryArchive {
    /// The writer instance.
    pub writer: ArchiveWriter<ZstdEngine, InMemorySink>,
    contents: SharedBuffer,
}

impl MemoryArchive {
    /// Opens a writer with `config` over a fresh in-memory sink.
    pub fn open(config: &WriterConfig) -> Self {
        let sink = InMemorySink::new();
        let contents = sink.contents();
        let writer = ArchiveWriter::open_with(config, ZstdEngine::new, move || Ok(sink))
            .expect("Failed to open in-memory archive");
        Self { writer, contents }
    }

    /// Returns a handle to the bytes written so far.
    pub fn contents(&self) -> SharedBuffer {
        self.contents.clone()
    }

    /// Closes the writer and returns the archive.
    ///
    /// # Errors
    ///
    /// Returns the writer's close error.
    pub fn close(self) -> CoreResult<Vec<u8>> {
        self.writer.close()?;
        Ok(self.contents.to_vec())
    }
}

/// A writer over a file in a temporary directory.
pub struct FileArchive {
    /// The writer instance.
    pub writer: ArchiveWriter<ZstdEngine, FileSink>,
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: TempDir,
}

impl FileArchive {
    /// Creates `archive.zst` in a new temporary directory.
    pub fn open(config: &WriterConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("archive.zst");
        let writer =
            ArchiveWriter::open_with_config(&path, config).expect("Failed to open file archive");
        Self {
            writer,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the writer and reads the archive back from disk.
    ///
    /// # Errors
    ///
    /// Returns the writer's close error.
    pub fn close(self) -> CoreResult<Vec<u8>> {
        self.writer.close()?;
        Ok(std::fs::read(&self.path).expect("Failed to read archive"))
    }
}

/// Writes each chunk in order through a memory archive and returns the bytes.
pub fn archive_of(config: &WriterConfig, chunks: &[&[u8]]) -> Vec<u8> {
    let archive = MemoryArchive::open(config);
    for chunk in chunks {
        archive.writer.write(chunk).expect("Failed to write chunk");
    }
    archive.close().expect("Failed to close archive")
}
