//! Concurrent write stress helpers.
//!
//! Each thread writes self-describing records: a 12-byte header holding the
//! thread id, a per-thread sequence number and the body length, followed by
//! a body filled with the thread id. [`check_records`] parses the decoded
//! archive and confirms every record arrived whole, once, and in per-thread
//! order.

use seekarc_core::{ArchiveWriter, CompressionEngine};
use seekarc_storage::ArchiveSink;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const HEADER_LEN: usize = 12;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total write calls performed.
    pub total_ops: usize,
    /// Successful writes.
    pub successful_ops: usize,
    /// Failed writes.
    pub failed_ops: usize,
    /// Uncompressed bytes accepted.
    pub bytes: u64,
    /// Total duration.
    pub duration: Duration,
    /// Writes per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, bytes: u64, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            bytes,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total writes: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Bytes: {}", self.bytes);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} writes/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of writing threads.
    pub threads: usize,
    /// Writes per thread.
    pub writes_per_thread: usize,
    /// Largest record body; bodies cycle through `1..=max_body`.
    pub max_body: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            writes_per_thread: 250,
            max_body: 512,
        }
    }
}

/// Builds record `seq` of thread `thread`.
pub fn record(thread: u32, seq: u32, body_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body_len);
    out.extend_from_slice(&thread.to_le_bytes());
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(&(body_len as u32).to_le_bytes());
    out.resize(HEADER_LEN + body_len, thread as u8);
    out
}

/// Hammers `writer` from `config.threads` threads.
pub fn stress_concurrent_writes<E, S>(
    writer: &ArchiveWriter<E, S>,
    config: &StressConfig,
) -> StressTestResult
where
    E: CompressionEngine,
    S: ArchiveSink,
{
    let start = Instant::now();
    let outcomes: Vec<(usize, usize, u64)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|t| {
                scope.spawn(move || {
                    let mut ok = 0usize;
                    let mut failed = 0usize;
                    let mut bytes = 0u64;
                    for seq in 0..config.writes_per_thread {
                        let body = 1 + (seq * 7 + t) % config.max_body.max(1);
                        let rec = record(t as u32, seq as u32, body);
                        match writer.write(&rec) {
                            Ok(()) => {
                                ok += 1;
                                bytes += rec.len() as u64;
                            }
                            Err(_) => failed += 1,
                        }
                    }
                    (ok, failed, bytes)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("stress thread panicked"))
            .collect()
    });

    let (ok, failed, bytes) = outcomes
        .into_iter()
        .fold((0, 0, 0), |acc, o| (acc.0 + o.0, acc.1 + o.1, acc.2 + o.2));
    StressTestResult::new(ok, failed, bytes, start.elapsed())
}

/// A decoded stream that is not a clean interleaving of whole records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterleaveError {
    /// The stream ended inside a record.
    #[error("truncated record at offset {offset}")]
    Truncated {
        /// Offset of the record header.
        offset: usize,
    },

    /// A record body contains bytes from another record.
    #[error("record at offset {offset} is torn")]
    Torn {
        /// Offset of the record header.
        offset: usize,
    },

    /// A thread's records arrived out of order or with gaps.
    #[error("thread {thread}: expected seq {expected}, found {found}")]
    OutOfOrder {
        /// Thread id.
        thread: u32,
        /// Next expected sequence number.
        expected: u32,
        /// Sequence number found.
        found: u32,
    },

    /// A thread id outside the configured range.
    #[error("unknown thread {0}")]
    UnknownThread(u32),

    /// A thread wrote fewer records than configured.
    #[error("thread {thread} wrote {found} records, expected {expected}")]
    Missing {
        /// Thread id.
        thread: u32,
        /// Records expected.
        expected: u32,
        /// Records found.
        found: u32,
    },
}

/// Checks that `stream` is a total order of whole records from `config`.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_records(stream: &[u8], config: &StressConfig) -> Result<(), InterleaveError> {
    let mut next = vec![0u32; config.threads];
    let mut offset = 0usize;
    while offset < stream.len() {
        if stream.len() - offset < HEADER_LEN {
            return Err(InterleaveError::Truncated { offset });
        }
        let word = |at: usize| {
            let mut w = [0u8; 4];
            w.copy_from_slice(&stream[offset + at..offset + at + 4]);
            u32::from_le_bytes(w)
        };
        let (thread, seq, len) = (word(0), word(4), word(8) as usize);
        let end = offset + HEADER_LEN + len;
        if end > stream.len() {
            return Err(InterleaveError::Truncated { offset });
        }
        let expected = next
            .get_mut(thread as usize)
            .ok_or(InterleaveError::UnknownThread(thread))?;
        if seq != *expected {
            return Err(InterleaveError::OutOfOrder {
                thread,
                expected: *expected,
                found: seq,
            });
        }
        if stream[offset + HEADER_LEN..end]
            .iter()
            .any(|b| *b != thread as u8)
        {
            return Err(InterleaveError::Torn { offset });
        }
        *expected += 1;
        offset = end;
    }

    for (thread, found) in next.into_iter().enumerate() {
        let expected = config.writes_per_thread as u32;
        if found != expected {
            return Err(InterleaveError::Missing {
                thread: thread as u32,
                expected,
                found,
            });
        }
    }
    Ok(())
}
