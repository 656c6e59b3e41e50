//! # Seekarc Testkit
//!
//! Test utilities for seekarc.
//!
//! This crate provides:
//! - Resource tracking for engines and sinks, to prove nothing leaks
//! - Fault injection at every engine and sink step
//! - A seek table parser and frame-by-frame archive verifier
//! - In-memory and temporary-file writer fixtures
//! - Property-based generators for write sequences
//! - Concurrent write stress helpers
//!
//! ## Usage
//!
//! ```rust
//! use seekarc_testkit::prelude::*;
//!
//! let archive = MemoryArchive::open(&seekarc_core::WriterConfig::new().min_frame_size(64));
//! archive.writer.write(b"hello").unwrap();
//! let bytes = archive.close().unwrap();
//! let frames = decode_frames(&bytes).unwrap();
//! assert_eq!(frames.concat(), b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod stress;
pub mod tracking;
pub mod verify;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::tracking::*;
    pub use crate::verify::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
pub use tracking::*;
pub use verify::*;
