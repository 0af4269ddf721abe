//! RIFF/WAVE chunk walk: `LIST/INFO` and `bext` (BWF) tags.

use crate::chunkwalk::{ByteOrder, ChunkWalker};
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const RIFF_HEADER_LEN: u64 = 12;
const WAV_PAD_TOLERANCE: u64 = 4;
const BEXT_VERSION_OFFSET: u64 = 346;

pub(crate) struct RiffStrategy;

impl Strategy for RiffStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::RiffInfo, TagFormat::BwfV0, TagFormat::BwfV1, TagFormat::BwfV2]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WAVE"
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("riff", || {
            let mut regions = Vec::new();
            let mut walker = ChunkWalker::new(file, RIFF_HEADER_LEN, file_len, ByteOrder::Little, true)
                .with_tolerance(WAV_PAD_TOLERANCE);

            while let Some(chunk) = walker.next().map_err(CoreError::IoError)? {
                let total = chunk.header_len + chunk.size;

                if &chunk.tag == b"LIST" {
                    if chunk.size >= 4 {
                        let list_type = file_list_type(walker_file(&mut walker), chunk.offset + chunk.header_len)?;
                        if &list_type == b"INFO" {
                            regions.extend(Region::new(TagFormat::RiffInfo, chunk.offset, total, file_len));
                        }
                    }
                } else if &chunk.tag == b"bext" {
                    if let Some(format) = bext_format(walker_file(&mut walker), chunk.offset + chunk.header_len, chunk.size)? {
                        regions.extend(Region::new(format, chunk.offset, total, file_len));
                    }
                }
            }

            Ok(regions)
        })
    }
}

fn walker_file<'a, 'f>(walker: &'a mut ChunkWalker<'f>) -> &'a mut TaggedFile {
    walker.file_mut()
}

fn file_list_type(file: &mut TaggedFile, payload_offset: u64) -> Result<[u8; 4], CoreError> {
    let bytes = file.read_vec_at(payload_offset, 4).map_err(CoreError::IoError)?;
    let mut list_type = [0u8; 4];
    list_type.copy_from_slice(&bytes);
    Ok(list_type)
}

fn bext_format(file: &mut TaggedFile, payload_offset: u64, payload_size: u64) -> Result<Option<TagFormat>, CoreError> {
    if payload_size < BEXT_VERSION_OFFSET + 2 {
        return Ok(None);
    }

    let bytes = file.read_vec_at(payload_offset + BEXT_VERSION_OFFSET, 2).map_err(CoreError::IoError)?;
    let version = u16::from_le_bytes([bytes[0], bytes[1]]);

    Ok(Some(match version {
        0 => TagFormat::BwfV0,
        1 => TagFormat::BwfV1,
        _ => TagFormat::BwfV2,
    }))
}
