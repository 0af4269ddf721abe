//! Shared length-prefixed record walker.
//!
//! RIFF, AIFF, MP4, and WavPack's sub-blocks are all "read a fixed-width
//! header, get a four-byte tag and a size, validate the size against what's
//! left, then either consume or recurse into the payload" with only the
//! byte order and header width differing. This module factors that shared
//! state machine (`Start -> ReadHeader -> ValidateSize -> Consume|Recurse ->
//! Advance -> Start | End`) so the format-specific strategies stay thin.
//! Matroska/EBML and ASF use distinct enough encodings (VLI sizes, 16-byte
//! GUIDs) that they read their own headers directly instead.

use std::io;

use crate::file::TaggedFile;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ByteOrder {
    Little,
    Big,
}

/// One length-prefixed record header: a four-byte tag followed by a size.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChunkHeader {
    pub tag: [u8; 4],
    pub size: u64,
    /// Byte offset of the tag itself.
    pub offset: u64,
    /// Bytes consumed by the tag + size fields (not the payload).
    pub header_len: u64,
}

/// Walks fixed-width `{tag(4), size(4)}` records starting at `pos` until
/// `limit`, word-aligning between records when `align` is `true`.
///
/// Terminates (returns `Ok(None)`) on EOF, a short header read, a size that
/// would push past `limit`, or (always) once fewer than 8 bytes remain.
/// `tolerance` forgives a chunk whose declared size overruns the remaining
/// space in `limit` by up to that many bytes, matching the common padding
/// bug in WAV writers.
pub(crate) struct ChunkWalker<'f> {
    file: &'f mut TaggedFile,
    pos: u64,
    limit: u64,
    order: ByteOrder,
    align: bool,
    tolerance: u64,
}

impl<'f> ChunkWalker<'f> {
    pub fn new(file: &'f mut TaggedFile, start: u64, limit: u64, order: ByteOrder, align: bool) -> Self {
        ChunkWalker { file, pos: start, limit, order, align, tolerance: 0 }
    }

    pub fn with_tolerance(mut self, tolerance: u64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Regains access to the underlying file between `next()` calls, for
    /// callers that need to read a chunk's payload before advancing.
    pub fn file_mut(&mut self) -> &mut TaggedFile {
        self.file
    }

    /// Reads and validates the next chunk header, advancing the cursor past
    /// its payload (and alignment padding). Returns `None` once the walk
    /// has ended for any of the reasons above; never returns an `Err` that
    /// should abort the caller's strategy.
    pub fn next(&mut self) -> io::Result<Option<ChunkHeader>> {
        if self.align && self.pos % 2 == 1 {
            self.pos += 1;
        }

        if self.pos + 8 > self.limit {
            return Ok(None);
        }

        let mut header = [0u8; 8];
        if self.file.read_at(self.pos, &mut header).is_err() {
            return Ok(None);
        }

        let mut tag = [0u8; 4];
        tag.copy_from_slice(&header[0..4]);

        let size = match self.order {
            ByteOrder::Little => u32::from_le_bytes([header[4], header[5], header[6], header[7]]),
            ByteOrder::Big => u32::from_be_bytes([header[4], header[5], header[6], header[7]]),
        } as u64;

        let offset = self.pos;
        let header_len = 8;
        let payload_end = offset + header_len + size;

        if payload_end > self.limit + self.tolerance {
            return Ok(None);
        }

        self.pos = payload_end.min(self.limit);

        Ok(Some(ChunkHeader { tag, size, offset, header_len }))
    }
}
