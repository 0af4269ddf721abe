//! Shared FLAC metadata-block walk, used by the [`VorbisComment`] strategy
//! (for FLAC-contained comments) and the FLAC Application strategy.

use crate::err::{CoreError, CoreResult};
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

pub(crate) const SIGNATURE: &[u8; 4] = b"fLaC";

/// One parsed FLAC `METADATA_BLOCK_HEADER` plus its position.
pub(crate) struct FlacBlock {
    pub block_type: u8,
    /// Offset of the 4-byte block header itself.
    pub header_offset: u64,
    /// Size of the block payload, not including the 4-byte header.
    pub payload_size: u64,
    pub is_last: bool,
}

/// Walks every metadata block in a FLAC stream starting right after the
/// `fLaC` signature (offset 4), stopping at the block marked "last" or once
/// a header would run past the file.
pub(crate) fn walk_blocks(file: &mut TaggedFile, file_len: u64) -> CoreResult<Vec<FlacBlock>> {
    let mut blocks = Vec::new();
    let mut pos: u64 = 4;

    loop {
        if pos + 4 > file_len {
            break;
        }

        let mut header = [0u8; 4];
        file.read_at(pos, &mut header).map_err(CoreError::IoError)?;

        let is_last = header[0] & 0x80 != 0;
        let block_type = header[0] & 0x7F;
        let size = u32::from_be_bytes([0, header[1], header[2], header[3]]) as u64;

        if pos + 4 + size > file_len {
            break;
        }

        blocks.push(FlacBlock { block_type, header_offset: pos, payload_size: size, is_last });

        if is_last {
            break;
        }

        pos += 4 + size;
    }

    Ok(blocks)
}

pub(crate) struct FlacApplicationStrategy;

impl Strategy for FlacApplicationStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::FlacApplication]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 4 && &head[0..4] == SIGNATURE
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("flac-application", || {
            let blocks = walk_blocks(file, file_len)?;

            Ok(blocks
                .into_iter()
                .filter(|b| b.block_type == 2)
                .filter_map(|b| {
                    Region::new(TagFormat::FlacApplication, b.header_offset, 4 + b.payload_size, file_len)
                })
                .collect())
        })
    }
}
