//! Property-based test generators using proptest.

use proptest::prelude::*;
use seekarc_core::{Strategy as CompressionStrategy, WriterConfig};

/// Strategy for one write payload, including empty ones.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        // Compressible runs
        (any::<u8>(), 0..=max_len).prop_map(|(byte, len)| vec![byte; len]),
        // Noise
        prop::collection::vec(any::<u8>(), 0..=max_len),
    ]
}

/// Strategy for a sequence of writes.
pub fn write_sequence_strategy(
    max_writes: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(max_len), 0..=max_writes)
}

/// Strategy for a compression strategy.
pub fn compression_strategy() -> impl Strategy<Value = CompressionStrategy> {
    prop_oneof![
        Just(CompressionStrategy::Fast),
        Just(CompressionStrategy::DoubleFast),
        Just(CompressionStrategy::Greedy),
        Just(CompressionStrategy::Lazy),
        Just(CompressionStrategy::Lazy2),
        Just(CompressionStrategy::BtLazy2),
        Just(CompressionStrategy::BtOpt),
        Just(CompressionStrategy::BtUltra),
        Just(CompressionStrategy::BtUltra2),
    ]
}

/// Strategy for a valid single-threaded writer configuration with small frames.
pub fn config_strategy() -> impl Strategy<Value = WriterConfig> {
    (1u64..4096, 1i32..=9, compression_strategy(), any::<bool>(), 1usize..64).prop_map(
        |(min_frame_size, level, strategy, checksums, chunk)| {
            WriterConfig::new()
                .min_frame_size(min_frame_size)
                .compression_level(level)
                .strategy(strategy)
                .checksums(checksums)
                .footer_chunk_size(chunk)
        },
    )
}

/// Configuration for property-based tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
