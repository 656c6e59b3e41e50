//! Pack command implementation.

use seekarc_core::{ArchiveWriter, CloseSummary, WriterConfig};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::info;

/// Default number of bytes handed to each `write`.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Runs the pack command.
pub fn run(
    input: Option<&Path>,
    output: &Path,
    config: &WriterConfig,
    chunk_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = match input {
        Some(path) => {
            info!("Packing {:?} into {:?}", path, output);
            pack(File::open(path)?, output, config, chunk_size)?
        }
        None => {
            info!("Packing stdin into {:?}", output);
            pack(io::stdin().lock(), output, config, chunk_size)?
        }
    };

    println!("✓ Archive written");
    println!("  Path: {:?}", output);
    println!("  Frames: {}", summary.frames);
    println!("  Input: {} bytes", summary.bytes_in);
    println!("  Output: {} bytes", summary.bytes_out);
    if let Some(ratio) = summary.compression_ratio() {
        println!("  Ratio: {:.2} (compressed / uncompressed)", ratio);
    }

    Ok(())
}

/// Streams `reader` into a new archive at `output`.
pub fn pack<R: Read>(
    mut reader: R,
    output: &Path,
    config: &WriterConfig,
    chunk_size: usize,
) -> Result<CloseSummary, Box<dyn std::error::Error>> {
    if chunk_size == 0 {
        return Err("chunk size must be greater than zero".into());
    }

    let writer = ArchiveWriter::open_with_config(output, config)?;
    let mut buf = vec![0u8; chunk_size];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        writer.write(&buf[..n])?;
    }

    Ok(writer.close()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_reader_into_decodable_archive() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.zst");
        let input: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();

        let config = WriterConfig::new().min_frame_size(8192);
        let summary = pack(&input[..], &output, &config, 4096).unwrap();
        assert_eq!(summary.bytes_in, input.len() as u64);
        assert!(summary.frames >= 6);

        let archive = std::fs::read(&output).unwrap();
        assert_eq!(archive.len() as u64, summary.bytes_out);
        assert_eq!(zstd::decode_all(&archive[..]).unwrap(), input);

        let ratio = summary.compression_ratio().unwrap();
        assert!(ratio > 0.0 && ratio < 1.0);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.zst");
        assert!(pack(&b"x"[..], &output, &WriterConfig::default(), 0).is_err());
        assert!(!output.exists());
    }
}
