//! Seekable archive writer.
//!
//! The writer pushes caller bytes through a [`CompressionEngine`], appends the
//! compressed output to an [`ArchiveSink`], and splits the stream into
//! independently decompressible frames. Each finished frame is recorded in a
//! [`FrameLog`], which `close` serializes as the trailing seek table.
//!
//! # Frame boundaries
//!
//! `min_frame_size` is a soft floor. A frame is ended at the start of the
//! first `write` that finds the open frame already holding at least
//! `min_frame_size` uncompressed bytes, so a frame can exceed the threshold by
//! whatever the previous write added. No `write` ends more than one frame.
//! `close` ends the open frame if it holds any data.
//!
//! # Concurrency
//!
//! One mutex guards the whole writer state. Every `write` holds it from the
//! threshold check until the last compressed byte is appended, so concurrent
//! writes land in the archive as some total order of whole calls.
//!
//! # Failure
//!
//! A failed `write` poisons the writer: the sink may hold bytes the frame log
//! does not describe. Later calls return [`CoreError::Poisoned`], and `close`
//! releases every resource without writing a seek table.

use crate::config::WriterConfig;
use crate::engine::{CompressionEngine, EngineSetting, FlushMode, ZstdEngine};
use crate::error::{try_alloc, CoreError, CoreResult};
use crate::frame_log::FrameLog;
use crate::stats::{CloseSummary, WriterStats};
use parking_lot::Mutex;
use seekarc_storage::{write_fully, ArchiveSink, FileSink, StorageResult};
use std::path::Path;
use tracing::{debug, info, warn};
use xxhash_rust::xxh64::Xxh64;

/// Thread-safe writer of a seekable compressed archive.
///
/// # Example
///
/// ```no_run
/// use seekarc_core::ArchiveWriter;
/// use std::path::Path;
///
/// let writer = ArchiveWriter::open(Path::new("log.zst"), 0, 1 << 20).unwrap();
/// writer.write(b"first record\n").unwrap();
/// writer.write(b"second record\n").unwrap();
/// let summary = writer.close().unwrap();
/// assert_eq!(summary.bytes_in, 27);
/// ```
pub struct ArchiveWriter<E: CompressionEngine = ZstdEngine, S: ArchiveSink = FileSink> {
    state: Mutex<Option<WriterState<E, S>>>,
    min_frame_size: u64,
    footer_chunk_size: usize,
}

/// Everything the lock protects.
///
/// Fields drop in declaration order, which is the reverse of acquisition.
struct WriterState<E, S> {
    sink: S,
    frame_log: FrameLog,
    engine: E,
    hasher: Option<Xxh64>,
    frame_uncompressed: u64,
    frame_compressed: u64,
    bytes_in: u64,
    bytes_out: u64,
    poisoned: bool,
}

impl ArchiveWriter<ZstdEngine, FileSink> {
    /// Creates the archive file at `path`.
    ///
    /// `workers` is the engine's internal parallelism and `min_frame_size`
    /// the soft frame floor in uncompressed bytes; everything else uses
    /// [`WriterConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the engine rejects
    /// a setting, or the file cannot be created. Nothing is left allocated.
    pub fn open(path: &Path, workers: u32, min_frame_size: u64) -> CoreResult<Self> {
        let config = WriterConfig::new()
            .workers(workers)
            .min_frame_size(min_frame_size);
        Self::open_with_config(path, &config)
    }

    /// Creates the archive file at `path` with a full configuration.
    ///
    /// # Errors
    ///
    /// See [`ArchiveWriter::open`].
    pub fn open_with_config(path: &Path, config: &WriterConfig) -> CoreResult<Self> {
        Self::open_with(config, ZstdEngine::new, || FileSink::create(path))
    }
}

impl<E: CompressionEngine, S: ArchiveSink> ArchiveWriter<E, S> {
    /// Builds a writer from an engine constructor and a sink constructor.
    ///
    /// Resources are acquired in a fixed order: the engine, its settings
    /// (level, strategy, workers, each fail-fast), the frame log, then the
    /// sink. If any step fails, everything acquired so far is released in
    /// reverse order before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step.
    pub fn open_with<C, O>(config: &WriterConfig, create_engine: C, open_sink: O) -> CoreResult<Self>
    where
        C: FnOnce() -> CoreResult<E>,
        O: FnOnce() -> StorageResult<S>,
    {
        config.validate()?;

        let mut engine = create_engine()?;
        engine.configure(EngineSetting::Level(config.compression_level))?;
        engine.configure(EngineSetting::Strategy(config.strategy))?;
        engine.configure(EngineSetting::Workers(config.workers))?;

        let frame_log = FrameLog::with_capacity(0, config.checksums)?;
        let sink = open_sink()?;

        info!(
            level = config.compression_level,
            strategy = ?config.strategy,
            workers = config.workers,
            min_frame_size = config.min_frame_size,
            checksums = config.checksums,
            "archive writer opened"
        );

        Ok(Self {
            state: Mutex::new(Some(WriterState {
                sink,
                frame_log,
                engine,
                hasher: config.checksums.then(|| Xxh64::new(0)),
                frame_uncompressed: 0,
                frame_compressed: 0,
                bytes_in: 0,
                bytes_out: 0,
                poisoned: false,
            })),
            min_frame_size: config.min_frame_size,
            footer_chunk_size: config.footer_chunk_size,
        })
    }

    /// Compresses `data` into the archive.
    ///
    /// If the open frame already holds at least `min_frame_size` bytes it is
    /// ended first. Empty input is accepted and may still end a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine, the frame log or the sink fails. The
    /// writer is poisoned afterwards and should be closed.
    pub fn write(&self, data: &[u8]) -> CoreResult<()> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(CoreError::Closed)?;
        if state.poisoned {
            return Err(CoreError::Poisoned);
        }

        let result = state.write(data, self.min_frame_size);
        if let Err(err) = &result {
            state.poisoned = true;
            warn!(error = %err, "archive write failed; writer poisoned");
        }
        result
    }

    /// Returns a snapshot of the writer's counters.
    #[must_use]
    pub fn stats(&self) -> WriterStats {
        self.state
            .lock()
            .as_ref()
            .map(WriterState::stats)
            .unwrap_or_default()
    }

    /// Returns `true` if an earlier failure made the writer unusable.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.state.lock().as_ref().is_none_or(|s| s.poisoned)
    }

    /// Finishes the archive.
    ///
    /// Ends the open frame if it holds data, appends the seek table, closes
    /// the sink and releases the frame log and the engine. Teardown is
    /// complete on every path: when a step fails, the remaining resources
    /// are still released and the first error is returned. An archive whose
    /// close failed has no valid seek table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Poisoned`] if an earlier write failed, otherwise
    /// the error of the first failing step.
    pub fn close(mut self) -> CoreResult<CloseSummary> {
        let state = self.state.get_mut().take().ok_or(CoreError::Closed)?;
        state.finish(self.footer_chunk_size)
    }
}

impl<E: CompressionEngine, S: ArchiveSink> Drop for ArchiveWriter<E, S> {
    fn drop(&mut self) {
        if let Some(state) = self.state.get_mut().take() {
            warn!(
                frames = state.frame_log.len(),
                pending = state.frame_uncompressed,
                "archive writer dropped without close; seek table not written"
            );
        }
    }
}

impl<E: CompressionEngine, S: ArchiveSink> std::fmt::Debug for ArchiveWriter<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("min_frame_size", &self.min_frame_size)
            .field("footer_chunk_size", &self.footer_chunk_size)
            .finish_non_exhaustive()
    }
}

impl<E: CompressionEngine, S: ArchiveSink> WriterState<E, S> {
    fn write(&mut self, data: &[u8], min_frame_size: u64) -> CoreResult<()> {
        if self.frame_uncompressed >= min_frame_size {
            self.end_frame()?;
        }

        let mut out = try_alloc(self.engine.output_chunk_size(), "compression output buffer")?;
        let mut offset = 0;
        loop {
            let step = self
                .engine
                .compress(&data[offset..], &mut out, FlushMode::Continue)?;
            if step.consumed == 0 && step.produced == 0 && offset < data.len() {
                return Err(CoreError::engine("compress", "engine made no progress"));
            }
            offset += step.consumed;
            self.append(&out[..step.produced])?;
            if offset >= data.len() {
                break;
            }
        }

        if let Some(hasher) = self.hasher.as_mut() {
            hasher.update(data);
        }
        self.frame_uncompressed += data.len() as u64;
        self.bytes_in += data.len() as u64;
        Ok(())
    }

    /// Flushes the engine, closes the open frame and records it.
    fn end_frame(&mut self) -> CoreResult<()> {
        let mut out = try_alloc(self.engine.output_chunk_size(), "frame end output buffer")?;
        loop {
            let step = self.engine.compress(&[], &mut out, FlushMode::End)?;
            self.append(&out[..step.produced])?;
            if step.remaining == 0 {
                break;
            }
        }

        let checksum = self
            .hasher
            .replace(Xxh64::new(0))
            .map_or(0, |hasher| hasher.digest() as u32);
        self.frame_log
            .record(self.frame_compressed, self.frame_uncompressed, checksum)?;
        debug!(
            frame = self.frame_log.len() - 1,
            compressed = self.frame_compressed,
            uncompressed = self.frame_uncompressed,
            "frame ended"
        );

        self.frame_uncompressed = 0;
        self.frame_compressed = 0;
        Ok(())
    }

    /// Appends one engine output chunk to the sink and counts it.
    fn append(&mut self, chunk: &[u8]) -> CoreResult<()> {
        write_fully(&mut self.sink, chunk)?;
        self.frame_compressed += chunk.len() as u64;
        self.bytes_out += chunk.len() as u64;
        Ok(())
    }

    fn write_footer(&mut self, chunk_size: usize) -> CoreResult<()> {
        let mut out = try_alloc(chunk_size, "seek table buffer")?;
        loop {
            let step = self.frame_log.serialize(&mut out)?;
            write_fully(&mut self.sink, &out[..step.produced])?;
            self.bytes_out += step.produced as u64;
            if step.remaining == 0 {
                break;
            }
        }
        debug!(frames = self.frame_log.len(), "seek table written");
        Ok(())
    }

    fn finish(mut self, footer_chunk_size: usize) -> CoreResult<CloseSummary> {
        if self.poisoned {
            warn!("closing poisoned archive writer; seek table not written");
            return Err(CoreError::Poisoned);
        }
        if self.frame_uncompressed > 0 {
            self.end_frame()?;
        }
        self.write_footer(footer_chunk_size)?;

        let WriterState {
            mut sink,
            frame_log,
            engine,
            bytes_in,
            bytes_out,
            ..
        } = self;
        let closed = sink.close();
        drop(sink);
        let frames = frame_log.finish();
        drop(engine);
        closed?;

        info!(frames, bytes_in, bytes_out, "archive closed");
        Ok(CloseSummary {
            frames,
            bytes_in,
            bytes_out,
        })
    }

    fn stats(&self) -> WriterStats {
        WriterStats {
            frames: self.frame_log.len(),
            bytes_in: self.bytes_in,
            bytes_out: self.bytes_out,
            pending_uncompressed: self.frame_uncompressed,
            pending_compressed: self.frame_compressed,
        }
    }
}
