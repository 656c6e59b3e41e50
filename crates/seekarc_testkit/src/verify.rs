//! Seek table parsing and archive verification.
//!
//! [`SeekTable::parse`] reads the trailing skippable frame back into
//! [`FrameEntry`] values. [`decode_frames`] then walks the archive frame by
//! frame and checks that every entry matches what is really there.

use seekarc_core::{
    FrameEntry, SEEKABLE_MAGIC, SEEK_TABLE_FOOTER_SIZE, SKIPPABLE_HEADER_SIZE, SKIPPABLE_MAGIC,
};
use std::ops::Range;
use thiserror::Error;

const CHECKSUM_FLAG: u8 = 0x80;

/// Reasons an archive fails verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The archive is shorter than the smallest possible seek table.
    #[error("archive too short: {len} bytes")]
    TooShort {
        /// Archive length.
        len: usize,
    },

    /// A magic number did not match.
    #[error("bad {which} magic: {found:#010x}")]
    BadMagic {
        /// Which magic number.
        which: &'static str,
        /// Value found.
        found: u32,
    },

    /// The descriptor byte has reserved bits set.
    #[error("reserved descriptor bits set: {0:#04x}")]
    ReservedBits(u8),

    /// The skippable frame size disagrees with the frame count.
    #[error("seek table length mismatch: header says {header}, entries need {expected}")]
    LengthMismatch {
        /// Length from the skippable frame header.
        header: usize,
        /// Length implied by the frame count.
        expected: usize,
    },

    /// Compressed sizes do not add up to the archive body.
    #[error("frames cover {covered} bytes but body is {body} bytes")]
    Coverage {
        /// Sum of compressed sizes.
        covered: u64,
        /// Bytes before the seek table.
        body: usize,
    },

    /// A frame failed to decompress.
    #[error("frame {index} failed to decode: {source}")]
    Decode {
        /// Frame index.
        index: usize,
        /// Decoder error.
        #[source]
        source: std::io::Error,
    },

    /// A frame decoded to a different size than recorded.
    #[error("frame {index} decoded to {actual} bytes, table says {recorded}")]
    SizeMismatch {
        /// Frame index.
        index: usize,
        /// Recorded uncompressed size.
        recorded: u32,
        /// Actual decoded size.
        actual: usize,
    },

    /// A frame checksum did not match its content.
    #[error("frame {index} checksum {actual:#010x}, table says {recorded:#010x}")]
    ChecksumMismatch {
        /// Frame index.
        index: usize,
        /// Recorded checksum.
        recorded: u32,
        /// Checksum of the decoded content.
        actual: u32,
    },
}

/// A parsed seek table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekTable {
    /// Frames in archive order.
    pub entries: Vec<FrameEntry>,
    /// Whether entries carry checksums.
    pub checksums: bool,
    /// Total bytes of the skippable frame, header included.
    pub table_len: usize,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

impl SeekTable {
    /// Parses the seek table at the end of `archive`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailer or header is malformed.
    pub fn parse(archive: &[u8]) -> Result<Self, VerifyError> {
        let min = SKIPPABLE_HEADER_SIZE + SEEK_TABLE_FOOTER_SIZE;
        if archive.len() < min {
            return Err(VerifyError::TooShort { len: archive.len() });
        }

        let trailer = archive.len() - SEEK_TABLE_FOOTER_SIZE;
        let magic = read_u32(archive, trailer + 5);
        if magic != SEEKABLE_MAGIC {
            return Err(VerifyError::BadMagic {
                which: "seekable",
                found: magic,
            });
        }
        let descriptor = archive[trailer + 4];
        if descriptor & !CHECKSUM_FLAG != 0 {
            return Err(VerifyError::ReservedBits(descriptor));
        }
        let checksums = descriptor & CHECKSUM_FLAG != 0;
        let count = read_u32(archive, trailer) as usize;
        let entry_size = if checksums { 12 } else { 8 };

        let table_len = SKIPPABLE_HEADER_SIZE + count * entry_size + SEEK_TABLE_FOOTER_SIZE;
        if table_len > archive.len() {
            return Err(VerifyError::TooShort { len: archive.len() });
        }
        let start = archive.len() - table_len;
        let skippable = read_u32(archive, start);
        if skippable != SKIPPABLE_MAGIC {
            return Err(VerifyError::BadMagic {
                which: "skippable",
                found: skippable,
            });
        }
        let header = read_u32(archive, start + 4) as usize;
        if header != table_len - SKIPPABLE_HEADER_SIZE {
            return Err(VerifyError::LengthMismatch {
                header,
                expected: table_len - SKIPPABLE_HEADER_SIZE,
            });
        }

        let entries = (0..count)
            .map(|i| {
                let at = start + SKIPPABLE_HEADER_SIZE + i * entry_size;
                FrameEntry {
                    compressed_size: read_u32(archive, at),
                    uncompressed_size: read_u32(archive, at + 4),
                    checksum: checksums.then(|| read_u32(archive, at + 8)),
                }
            })
            .collect();

        Ok(Self {
            entries,
            checksums,
            table_len,
        })
    }

    /// Returns the byte range of each frame within the archive.
    pub fn frame_ranges(&self) -> Vec<Range<usize>> {
        let mut offset = 0usize;
        self.entries
            .iter()
            .map(|e| {
                let start = offset;
                offset += e.compressed_size as usize;
                start..offset
            })
            .collect()
    }

    /// Returns the sum of uncompressed sizes.
    pub fn total_uncompressed(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.uncompressed_size))
            .sum()
    }

    /// Returns the sum of compressed sizes.
    pub fn total_compressed(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.compressed_size)).sum()
    }
}

/// Decodes every frame of `archive` independently and checks it against the
/// seek table.
///
/// # Errors
///
/// Returns the first inconsistency found.
pub fn decode_frames(archive: &[u8]) -> Result<Vec<Vec<u8>>, VerifyError> {
    let table = SeekTable::parse(archive)?;
    let body = archive.len() - table.table_len;
    let covered = table.total_compressed();
    if covered != body as u64 {
        return Err(VerifyError::Coverage { covered, body });
    }

    table
        .entries
        .iter()
        .zip(table.frame_ranges())
        .enumerate()
        .map(|(index, (entry, range))| {
            let frame = zstd::decode_all(&archive[range])
                .map_err(|source| VerifyError::Decode { index, source })?;
            if frame.len() != entry.uncompressed_size as usize {
                return Err(VerifyError::SizeMismatch {
                    index,
                    recorded: entry.uncompressed_size,
                    actual: frame.len(),
                });
            }
            if let Some(recorded) = entry.checksum {
                let actual = xxhash_rust::xxh64::xxh64(&frame, 0) as u32;
                if actual != recorded {
                    return Err(VerifyError::ChecksumMismatch {
                        index,
                        recorded,
                        actual,
                    });
                }
            }
            Ok(frame)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, u32)], body: &[u8]) -> Vec<u8> {
        let mut out = body.to_vec();
        out.extend_from_slice(&SKIPPABLE_MAGIC.to_le_bytes());
        out.extend_from_slice(&((entries.len() * 8 + SEEK_TABLE_FOOTER_SIZE) as u32).to_le_bytes());
        for (c, d) in entries {
            out.extend_from_slice(&c.to_le_bytes());
            out.extend_from_slice(&d.to_le_bytes());
        }
        out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
        out.push(0);
        out.extend_from_slice(&SEEKABLE_MAGIC.to_le_bytes());
        out
    }

    #[test]
    fn parses_hand_built_table() {
        let frame = zstd::encode_all(&b"hello"[..], 3).unwrap();
        let archive = table(&[(frame.len() as u32, 5)], &frame);

        let parsed = SeekTable::parse(&archive).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert!(!parsed.checksums);
        assert_eq!(parsed.total_uncompressed(), 5);
        assert_eq!(decode_frames(&archive).unwrap(), vec![b"hello".to_vec()]);
    }

    #[test]
    fn empty_table_parses() {
        let archive = table(&[], &[]);
        let parsed = SeekTable::parse(&archive).unwrap();
        assert!(parsed.entries.is_empty());
        assert!(decode_frames(&archive).unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_trailer() {
        let mut archive = table(&[], &[]);
        let last = archive.len() - 1;
        archive[last] ^= 0xFF;
        assert!(matches!(
            SeekTable::parse(&archive),
            Err(VerifyError::BadMagic { which: "seekable", .. })
        ));
    }

    #[test]
    fn rejects_size_mismatch() {
        let frame = zstd::encode_all(&b"hello"[..], 3).unwrap();
        let archive = table(&[(frame.len() as u32, 6)], &frame);
        assert!(matches!(
            decode_frames(&archive),
            Err(VerifyError::SizeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_uncovered_body() {
        let frame = zstd::encode_all(&b"hello"[..], 3).unwrap();
        let mut body = frame.clone();
        body.push(0);
        let archive = table(&[(frame.len() as u32, 5)], &body);
        assert!(matches!(
            decode_frames(&archive),
            Err(VerifyError::Coverage { .. })
        ));
    }
}
