//! DSD container metadata detection: DSF's embedded-ID3v2 pointer, and
//! DFF's `ID3 ` chunk.

use crate::core::BufStream;
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const DSF_HEADER_LEN: u64 = 28;
/// `FRM8` + 8-byte size + 4-byte form type, before the first chunk.
const DFF_PREAMBLE_LEN: u64 = 16;
const DFF_CHUNK_HEADER_LEN: u64 = 12;
const ID3V2_HEADER_LEN: u64 = 10;

pub(crate) struct DsdStrategy;

impl Strategy for DsdStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::DsfMetadata, TagFormat::DffMetadata]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 4 && (&head[0..4] == b"DSD " || &head[0..4] == b"FRM8")
    }

    fn detect(&self, file: &mut TaggedFile, head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("dsd", || {
            if &head[0..4] == b"DSD " {
                detect_dsf(file, file_len)
            } else {
                detect_dff(file, file_len)
            }
        })
    }
}

fn detect_dsf(file: &mut TaggedFile, file_len: u64) -> Result<Vec<Region>, CoreError> {
    if DSF_HEADER_LEN > file_len {
        return Err(CoreError::MalformedTag("truncated DSF header"));
    }

    let header = file.read_vec_at(0, DSF_HEADER_LEN as usize).map_err(CoreError::IoError)?;
    let pointer = u64::from_le_bytes(header[20..28].try_into().unwrap());

    if pointer == 0 || pointer + ID3V2_HEADER_LEN > file_len {
        return Ok(Vec::new());
    }

    let id3_header = file.read_vec_at(pointer, ID3V2_HEADER_LEN as usize).map_err(CoreError::IoError)?;
    if &id3_header[0..3] != b"ID3" {
        return Ok(Vec::new());
    }

    let mut stream = BufStream::new(&id3_header[6..10]);
    let size = stream
        .read_synchsafe_u32()
        .map_err(|_| CoreError::MalformedTag("invalid DSF-embedded ID3v2 size"))?;

    let total = ID3V2_HEADER_LEN + u64::from(size);
    Ok(Region::new(TagFormat::DsfMetadata, pointer, total, file_len).into_iter().collect())
}

fn detect_dff(file: &mut TaggedFile, file_len: u64) -> Result<Vec<Region>, CoreError> {
    let mut pos = DFF_PREAMBLE_LEN;
    let mut regions = Vec::new();

    while pos + DFF_CHUNK_HEADER_LEN <= file_len {
        let header = file.read_vec_at(pos, DFF_CHUNK_HEADER_LEN as usize).map_err(CoreError::IoError)?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&header[0..4]);
        let size = u64::from_be_bytes(header[4..12].try_into().unwrap());

        let total = DFF_CHUNK_HEADER_LEN + size;
        if pos + total > file_len {
            break;
        }

        if &tag == b"ID3 " {
            regions.extend(Region::new(TagFormat::DffMetadata, pos, total, file_len));
        }

        pos += total + (size % 2); // DSDIFF chunks are word-padded.
    }

    Ok(regions)
}
