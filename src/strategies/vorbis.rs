//! Vorbis comment detection: inside a FLAC stream's metadata blocks, or the
//! second logical page of an OGG stream.

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

use super::flac;

const OGG_SIGNATURE: &[u8; 4] = b"OggS";
const VORBIS_PACKET_SIGNATURE: &[u8; 7] = b"\x03vorbis";
const OGG_HEADER_FIXED_LEN: u64 = 27;

pub(crate) struct VorbisCommentStrategy;

impl Strategy for VorbisCommentStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::VorbisComment]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        (head.len() >= 4 && &head[0..4] == flac::SIGNATURE) || (head.len() >= 4 && &head[0..4] == OGG_SIGNATURE)
    }

    fn detect(&self, file: &mut TaggedFile, head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("vorbis-comment", || {
            if &head[0..4] == flac::SIGNATURE {
                detect_in_flac(file, file_len)
            } else {
                detect_in_ogg(file, file_len)
            }
        })
    }
}

fn detect_in_flac(file: &mut TaggedFile, file_len: u64) -> Result<Vec<Region>, CoreError> {
    let blocks = flac::walk_blocks(file, file_len)?;

    Ok(blocks
        .into_iter()
        .filter(|b| b.block_type == 4)
        .filter_map(|b| Region::new(TagFormat::VorbisComment, b.header_offset, 4 + b.payload_size, file_len))
        .collect())
}

struct OggPage {
    body_offset: u64,
    body_len: u64,
}

fn read_ogg_page(file: &mut TaggedFile, offset: u64, file_len: u64) -> Result<Option<OggPage>, CoreError> {
    if offset + OGG_HEADER_FIXED_LEN > file_len {
        return Ok(None);
    }

    let fixed = file.read_vec_at(offset, OGG_HEADER_FIXED_LEN as usize).map_err(CoreError::IoError)?;
    if &fixed[0..4] != OGG_SIGNATURE {
        return Ok(None);
    }

    let segment_count = fixed[26] as u64;
    let segment_table_offset = offset + OGG_HEADER_FIXED_LEN;

    if segment_table_offset + segment_count > file_len {
        return Ok(None);
    }

    let segments = file.read_vec_at(segment_table_offset, segment_count as usize).map_err(CoreError::IoError)?;
    let body_len: u64 = segments.iter().map(|&b| b as u64).sum();
    let body_offset = segment_table_offset + segment_count;

    if body_offset + body_len > file_len {
        return Ok(None);
    }

    Ok(Some(OggPage { body_offset, body_len }))
}

fn detect_in_ogg(file: &mut TaggedFile, file_len: u64) -> Result<Vec<Region>, CoreError> {
    let page0 = match read_ogg_page(file, 0, file_len)? {
        Some(page) => page,
        None => return Err(CoreError::MalformedTag("truncated OGG identification page")),
    };

    let page1_start = page0.body_offset + page0.body_len;
    let page1 = match read_ogg_page(file, page1_start, file_len)? {
        Some(page) => page,
        None => return Err(CoreError::MalformedTag("truncated OGG comment page")),
    };

    if page1.body_len < 7 {
        return Err(CoreError::MalformedTag("OGG comment page too short"));
    }

    let signature = file.read_vec_at(page1.body_offset, 7).map_err(CoreError::IoError)?;
    if signature.as_slice() != VORBIS_PACKET_SIGNATURE {
        return Err(CoreError::MalformedTag("missing vorbis comment packet signature"));
    }

    Ok(Region::new(TagFormat::VorbisComment, page1.body_offset, page1.body_len, file_len)
        .into_iter()
        .collect())
}
