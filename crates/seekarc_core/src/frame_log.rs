//! Per-frame bookkeeping and seek table encoding.
//!
//! The seek table follows the zstd seekable format so that any reader of that
//! format can use the archive. It is a zstd skippable frame, which means
//! plain zstd decoders ignore it:
//!
//! ```text
//! u32  SKIPPABLE_MAGIC
//! u32  table length - 8
//! per frame:
//!      u32 compressed size
//!      u32 uncompressed size
//!      u32 checksum            (only when the checksum flag is set)
//! u32  frame count
//! u8   descriptor              (bit 7 = checksum flag)
//! u32  SEEKABLE_MAGIC
//! ```
//!
//! All integers are little-endian.

use crate::error::{CoreError, CoreResult};

/// Magic number of the skippable frame wrapping the seek table.
pub const SKIPPABLE_MAGIC: u32 = 0x184D_2A5E;

/// Magic number closing the seek table.
pub const SEEKABLE_MAGIC: u32 = 0x8F92_EAB1;

/// Skippable frame header: magic + frame size.
pub const SKIPPABLE_HEADER_SIZE: usize = 8;

/// Trailer: frame count + descriptor + magic.
pub const SEEK_TABLE_FOOTER_SIZE: usize = 9;

/// Maximum number of frames a seek table can describe.
pub const MAX_FRAMES: usize = 0x0800_0000;

/// Descriptor bit signalling that entries carry checksums.
const CHECKSUM_FLAG: u8 = 0x80;

/// One recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEntry {
    /// Bytes the frame occupies in the archive.
    pub compressed_size: u32,
    /// Bytes the frame decompresses to.
    pub uncompressed_size: u32,
    /// Low 32 bits of the XXH64 of the frame content, if recorded.
    pub checksum: Option<u32>,
}

/// Progress of a [`FrameLog::serialize`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FooterStep {
    /// Bytes written into the caller's buffer.
    pub produced: usize,
    /// Bytes of the seek table still to be produced.
    pub remaining: usize,
}

/// Ordered accumulator of frame sizes that serializes into the seek table.
///
/// Frame index equals position in the log, which equals position in the
/// archive.
#[derive(Debug)]
pub struct FrameLog {
    entries: Vec<FrameEntry>,
    checksums: bool,
    encoded: Option<Vec<u8>>,
    cursor: usize,
}

impl FrameLog {
    /// Creates an empty log with room for `capacity` frames.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Allocation`] if the reservation fails.
    pub fn with_capacity(capacity: usize, checksums: bool) -> CoreResult<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(capacity).map_err(|e| {
            CoreError::allocation(format!("frame log for {capacity} frames: {e}"))
        })?;
        Ok(Self {
            entries,
            checksums,
            encoded: None,
            cursor: 0,
        })
    }

    /// Returns the recorded frames in archive order.
    #[must_use]
    pub fn entries(&self) -> &[FrameEntry] {
        &self.entries
    }

    /// Returns the number of recorded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no frame has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records one finished frame.
    ///
    /// `checksum` is ignored when the log was created without checksums.
    ///
    /// # Errors
    ///
    /// Fails if serialization has started, if either size exceeds `u32::MAX`,
    /// or if the log already holds [`MAX_FRAMES`] frames.
    pub fn record(
        &mut self,
        compressed_size: u64,
        uncompressed_size: u64,
        checksum: u32,
    ) -> CoreResult<()> {
        if self.encoded.is_some() {
            return Err(CoreError::frame_log("frame recorded after serialization began"));
        }
        if self.entries.len() >= MAX_FRAMES {
            return Err(CoreError::frame_log(format!(
                "seek table is limited to {MAX_FRAMES} frames"
            )));
        }
        let compressed_size = u32::try_from(compressed_size).map_err(|_| {
            CoreError::frame_log(format!("compressed frame size {compressed_size} exceeds u32"))
        })?;
        let uncompressed_size = u32::try_from(uncompressed_size).map_err(|_| {
            CoreError::frame_log(format!(
                "uncompressed frame size {uncompressed_size} exceeds u32"
            ))
        })?;
        self.entries.push(FrameEntry {
            compressed_size,
            uncompressed_size,
            checksum: self.checksums.then_some(checksum),
        });
        Ok(())
    }

    /// Returns the encoded size of the seek table for the current entries.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        SKIPPABLE_HEADER_SIZE + self.entries.len() * self.entry_size() + SEEK_TABLE_FOOTER_SIZE
    }

    /// Writes the next chunk of the seek table into `output`.
    ///
    /// Call repeatedly, appending `output[..produced]` each time, until
    /// `remaining` is zero. Once complete, further calls produce nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Allocation`] if the table buffer cannot be allocated.
    pub fn serialize(&mut self, output: &mut [u8]) -> CoreResult<FooterStep> {
        if self.encoded.is_none() {
            self.encoded = Some(self.encode()?);
        }
        let encoded = self.encoded.as_deref().unwrap_or_default();
        let pending = &encoded[self.cursor..];
        let produced = pending.len().min(output.len());
        output[..produced].copy_from_slice(&pending[..produced]);
        self.cursor += produced;
        Ok(FooterStep {
            produced,
            remaining: encoded.len() - self.cursor,
        })
    }

    /// Releases the log, returning the number of frames it described.
    #[must_use]
    pub fn finish(self) -> usize {
        self.entries.len()
    }

    fn entry_size(&self) -> usize {
        if self.checksums {
            12
        } else {
            8
        }
    }

    fn encode(&self) -> CoreResult<Vec<u8>> {
        let len = self.encoded_len();
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| CoreError::allocation(format!("seek table ({len} bytes): {e}")))?;

        // Bounded by MAX_FRAMES, so the casts below cannot truncate.
        let frame_size = (len - SKIPPABLE_HEADER_SIZE) as u32;
        buf.extend_from_slice(&SKIPPABLE_MAGIC.to_le_bytes());
        buf.extend_from_slice(&frame_size.to_le_bytes());
        for entry in &self.entries {
            buf.extend_from_slice(&entry.compressed_size.to_le_bytes());
            buf.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            if self.checksums {
                buf.extend_from_slice(&entry.checksum.unwrap_or(0).to_le_bytes());
            }
        }
        buf.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        buf.push(if self.checksums { CHECKSUM_FLAG } else { 0 });
        buf.extend_from_slice(&SEEKABLE_MAGIC.to_le_bytes());
        debug_assert_eq!(buf.len(), len);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize_all(log: &mut FrameLog, chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let step = log.serialize(&mut buf).unwrap();
            out.extend_from_slice(&buf[..step.produced]);
            if step.remaining == 0 {
                break;
            }
        }
        out
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn empty_log_encodes_header_and_trailer() {
        let mut log = FrameLog::with_capacity(0, false).unwrap();
        let table = serialize_all(&mut log, 4096);

        assert_eq!(table.len(), SKIPPABLE_HEADER_SIZE + SEEK_TABLE_FOOTER_SIZE);
        assert_eq!(u32_at(&table, 0), SKIPPABLE_MAGIC);
        assert_eq!(u32_at(&table, 4), SEEK_TABLE_FOOTER_SIZE as u32);
        assert_eq!(u32_at(&table, 8), 0);
        assert_eq!(table[12], 0);
        assert_eq!(u32_at(&table, 13), SEEKABLE_MAGIC);
    }

    #[test]
    fn entries_encoded_in_order() {
        let mut log = FrameLog::with_capacity(2, false).unwrap();
        log.record(100, 600, 0).unwrap();
        log.record(90, 600, 0).unwrap();

        let table = serialize_all(&mut log, 4096);
        assert_eq!(table.len(), 8 + 2 * 8 + 9);
        assert_eq!(u32_at(&table, 4) as usize, table.len() - 8);
        assert_eq!(u32_at(&table, 8), 100);
        assert_eq!(u32_at(&table, 12), 600);
        assert_eq!(u32_at(&table, 16), 90);
        assert_eq!(u32_at(&table, 20), 600);
        assert_eq!(u32_at(&table, 24), 2);
        assert_eq!(table[28], 0);
    }

    #[test]
    fn checksums_widen_entries_and_set_flag() {
        let mut log = FrameLog::with_capacity(1, true).unwrap();
        log.record(10, 20, 0xDEAD_BEEF).unwrap();

        let table = serialize_all(&mut log, 4096);
        assert_eq!(table.len(), 8 + 12 + 9);
        assert_eq!(u32_at(&table, 16), 0xDEAD_BEEF);
        assert_eq!(table[24], CHECKSUM_FLAG);
        assert_eq!(log.entries()[0].checksum, Some(0xDEAD_BEEF));
    }

    #[test]
    fn checksum_dropped_when_disabled() {
        let mut log = FrameLog::with_capacity(1, false).unwrap();
        log.record(10, 20, 0xDEAD_BEEF).unwrap();
        assert_eq!(log.entries()[0].checksum, None);
    }

    #[test]
    fn small_chunks_produce_identical_table() {
        let mut whole = FrameLog::with_capacity(0, true).unwrap();
        let mut chunked = FrameLog::with_capacity(0, true).unwrap();
        for i in 0..50u64 {
            whole.record(i * 3, i * 7, i as u32).unwrap();
            chunked.record(i * 3, i * 7, i as u32).unwrap();
        }

        let expected = serialize_all(&mut whole, 4096);
        let actual = serialize_all(&mut chunked, 7);
        assert_eq!(actual, expected);
        assert_eq!(expected.len(), whole.encoded_len());
    }

    #[test]
    fn serialize_after_completion_is_empty() {
        let mut log = FrameLog::with_capacity(0, false).unwrap();
        serialize_all(&mut log, 4096);

        let mut buf = [0u8; 16];
        let step = log.serialize(&mut buf).unwrap();
        assert_eq!(step, FooterStep::default());
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut log = FrameLog::with_capacity(0, false).unwrap();
        assert!(log.record(u64::from(u32::MAX) + 1, 1, 0).is_err());
        assert!(log.record(1, u64::from(u32::MAX) + 1, 0).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn record_after_serialize_rejected() {
        let mut log = FrameLog::with_capacity(0, false).unwrap();
        let mut buf = [0u8; 4];
        log.serialize(&mut buf).unwrap();
        assert!(log.record(1, 1, 0).is_err());
    }

    #[test]
    fn finish_reports_frame_count() {
        let mut log = FrameLog::with_capacity(4, false).unwrap();
        log.record(1, 1, 0).unwrap();
        log.record(2, 2, 0).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.finish(), 2);
    }
}
