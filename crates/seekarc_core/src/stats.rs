//! Writer statistics.

/// Snapshot of an archive writer's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Frames ended and recorded in the frame log.
    pub frames: usize,
    /// Total uncompressed bytes accepted by `write`.
    pub bytes_in: u64,
    /// Total bytes appended to the sink.
    pub bytes_out: u64,
    /// Uncompressed bytes in the frame that is still open.
    pub pending_uncompressed: u64,
    /// Compressed bytes already appended for the frame that is still open.
    pub pending_compressed: u64,
}

impl WriterStats {
    /// Returns `bytes_out / bytes_in`, or `None` before any input.
    #[must_use]
    pub fn compression_ratio(&self) -> Option<f64> {
        ratio(self.bytes_out, self.bytes_in)
    }
}

fn ratio(bytes_out: u64, bytes_in: u64) -> Option<f64> {
    if bytes_in == 0 {
        None
    } else {
        Some(bytes_out as f64 / bytes_in as f64)
    }
}

/// Totals reported by a successful close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseSummary {
    /// Frames described by the seek table.
    pub frames: usize,
    /// Total uncompressed bytes written.
    pub bytes_in: u64,
    /// Archive size, seek table included.
    pub bytes_out: u64,
}

impl CloseSummary {
    /// Returns `bytes_out / bytes_in`, or `None` for an empty archive.
    #[must_use]
    pub fn compression_ratio(&self) -> Option<f64> {
        ratio(self.bytes_out, self.bytes_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_undefined_without_input() {
        assert_eq!(WriterStats::default().compression_ratio(), None);
    }

    #[test]
    fn ratio_of_counters() {
        let stats = WriterStats {
            bytes_in: 200,
            bytes_out: 50,
            ..WriterStats::default()
        };
        assert_eq!(stats.compression_ratio(), Some(0.25));
    }

    #[test]
    fn summary_ratio_matches_stats() {
        let summary = CloseSummary {
            frames: 1,
            bytes_in: 400,
            bytes_out: 100,
        };
        assert_eq!(summary.compression_ratio(), Some(0.25));
        assert_eq!(CloseSummary::default().compression_ratio(), None);
    }
}
