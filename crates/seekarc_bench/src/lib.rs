//! Benchmarks for seekarc.
//!
//! The benchmarks live in `benches/`; this crate only shares input helpers.

/// Creates `size` bytes of mildly compressible data.
pub fn sample_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i / 7) % 251) as u8).collect()
}
