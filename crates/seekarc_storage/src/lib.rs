//! # Seekarc Storage
//!
//! Append-only byte sinks for seekable archives.
//!
//! This crate provides the lowest-level output abstraction for seekarc.
//! Sinks are **opaque byte destinations** - they do not interpret the
//! compressed frames or the seek table they receive.
//!
//! ## Design Principles
//!
//! - Sinks only append; there is no seeking, reading back or truncation
//! - A sink is opened once and closed once
//! - Accepting fewer bytes than offered is reported, never hidden
//! - Must be `Send` so a writer owning one can be shared across threads
//!
//! ## Available Sinks
//!
//! - [`InMemorySink`] - For testing and in-process archives
//! - [`FileSink`] - For archives on disk
//!
//! ## Example
//!
//! ```rust
//! use seekarc_storage::{ArchiveSink, InMemorySink};
//!
//! let mut sink = InMemorySink::new();
//! let contents = sink.contents();
//! sink.write(b"hello world").unwrap();
//! sink.close().unwrap();
//! assert_eq!(contents.to_vec(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod sink;

pub use error::{StorageError, StorageResult};
pub use file::FileSink;
pub use memory::{InMemorySink, SharedBuffer};
pub use sink::{write_fully, ArchiveSink};
