//! Archive writer configuration.

use crate::engine::Strategy;
use crate::error::{CoreError, CoreResult};

/// Default zstd compression level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Default minimum frame size: 1 MiB of uncompressed data.
pub const DEFAULT_MIN_FRAME_SIZE: u64 = 1024 * 1024;

/// Default size of the buffer the seek table is serialized through.
pub const DEFAULT_FOOTER_CHUNK_SIZE: usize = 4096;

/// Configuration for opening an archive writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Engine compression level.
    pub compression_level: i32,

    /// Engine matching strategy.
    pub strategy: Strategy,

    /// Number of engine worker threads (0 = compress on the caller's thread).
    pub workers: u32,

    /// Uncompressed bytes after which the current frame is ended before the
    /// next write is accepted.
    pub min_frame_size: u64,

    /// Whether to record a per-frame content checksum in the seek table.
    pub checksums: bool,

    /// Size of the bounded buffer used to serialize the seek table.
    pub footer_chunk_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            strategy: Strategy::Fast,
            workers: 0,
            min_frame_size: DEFAULT_MIN_FRAME_SIZE,
            checksums: false,
            footer_chunk_size: DEFAULT_FOOTER_CHUNK_SIZE,
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    #[must_use]
    pub const fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the matching strategy.
    #[must_use]
    pub const fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the number of engine worker threads.
    #[must_use]
    pub const fn workers(mut self, workers: u32) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the minimum frame size in uncompressed bytes.
    #[must_use]
    pub const fn min_frame_size(mut self, size: u64) -> Self {
        self.min_frame_size = size;
        self
    }

    /// Sets whether per-frame checksums are recorded.
    #[must_use]
    pub const fn checksums(mut self, value: bool) -> Self {
        self.checksums = value;
        self
    }

    /// Sets the seek table serialization buffer size.
    #[must_use]
    pub const fn footer_chunk_size(mut self, size: usize) -> Self {
        self.footer_chunk_size = size;
        self
    }

    /// Checks values that would make the writer misbehave.
    ///
    /// Engine-specific limits (level range, worker count) are left to the
    /// engine, which rejects them during construction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `min_frame_size` or
    /// `footer_chunk_size` is zero, or if `min_frame_size` does not fit the
    /// 32-bit sizes of the seek table.
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_frame_size == 0 {
            return Err(CoreError::invalid_config(
                "min_frame_size must be greater than zero",
            ));
        }
        if self.min_frame_size > u64::from(u32::MAX) {
            return Err(CoreError::invalid_config(format!(
                "min_frame_size {} exceeds the seek table limit of {} bytes",
                self.min_frame_size,
                u32::MAX
            )));
        }
        if self.footer_chunk_size == 0 {
            return Err(CoreError::invalid_config(
                "footer_chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }
}
