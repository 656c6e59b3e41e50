//! # Seekarc Core
//!
//! Seekable zstd archive writer.
//!
//! This crate provides:
//! - [`ArchiveWriter`], a thread-safe writer that splits a compressed stream
//!   into independently decompressible frames
//! - [`FrameLog`], the per-frame accounting that becomes the trailing seek table
//! - [`CompressionEngine`], the seam between frame bookkeeping and the codec,
//!   with [`ZstdEngine`] as the production implementation
//!
//! Archives follow the zstd seekable format: the frames are ordinary zstd
//! frames, so the whole file also decompresses with any zstd tool, and the
//! seek table lives in a trailing skippable frame.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod frame_log;
mod stats;
mod writer;

pub use config::{
    WriterConfig, DEFAULT_COMPRESSION_LEVEL, DEFAULT_FOOTER_CHUNK_SIZE, DEFAULT_MIN_FRAME_SIZE,
};
pub use engine::{CompressionEngine, EngineSetting, EngineStep, FlushMode, Strategy, ZstdEngine};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use frame_log::{
    FooterStep, FrameEntry, FrameLog, MAX_FRAMES, SEEKABLE_MAGIC, SEEK_TABLE_FOOTER_SIZE,
    SKIPPABLE_HEADER_SIZE, SKIPPABLE_MAGIC,
};
pub use stats::{CloseSummary, WriterStats};
pub use writer::ArchiveWriter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
