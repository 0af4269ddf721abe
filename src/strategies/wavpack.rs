//! WavPack native metadata: RIFF/cuesheet/config/etc. sub-blocks nested
//! inside each 32-byte-header block.

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const BLOCK_HEADER_LEN: u64 = 32;
const MIN_BLOCK_SIZE: u64 = 32;
const MAX_BLOCK_SIZE: u64 = 10 * 1024 * 1024;
const MAX_SUB_BLOCKS: u64 = 10_000;
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;
const LARGE_FILE_BLOCK_CAP: u64 = 100;

/// Sub-block IDs (low 7 bits) carrying metadata, per the WavPack format.
fn is_metadata_id(id: u8) -> bool {
    let low = id & 0x7F;
    (0x21..=0x26).contains(&low) || (0x28..=0x2B).contains(&low)
}

pub(crate) struct WavPackStrategy;

impl Strategy for WavPackStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::WavPackNative]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 4 && &head[0..4] == b"wvpk"
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("wavpack", || {
            let mut regions = Vec::new();
            let mut pos = 0u64;
            let mut block_count = 0u64;
            let mut sub_block_count = 0u64;

            'blocks: while pos + BLOCK_HEADER_LEN <= file_len {
                let header = file.read_vec_at(pos, 8).map_err(CoreError::IoError)?;
                if &header[0..4] != b"wvpk" {
                    break;
                }

                let block_size = u32::from_le_bytes(header[4..8].try_into().unwrap()) as u64;
                let block_total = 8 + block_size;

                if block_total < MIN_BLOCK_SIZE || block_total > MAX_BLOCK_SIZE || pos + block_total > file_len {
                    break;
                }

                block_count += 1;
                if file_len > LARGE_FILE_THRESHOLD && block_count > LARGE_FILE_BLOCK_CAP {
                    break;
                }

                let block_end = pos + block_total;
                let mut sub_pos = pos + BLOCK_HEADER_LEN;

                while sub_pos + 1 <= block_end {
                    sub_block_count += 1;
                    if sub_block_count > MAX_SUB_BLOCKS {
                        break 'blocks;
                    }

                    let id = file.read_vec_at(sub_pos, 1).map_err(CoreError::IoError)?[0];
                    let size_bytes: u64 = if id & 0x80 != 0 { 3 } else { 1 };

                    if sub_pos + 1 + size_bytes > block_end {
                        break;
                    }

                    let size_field = file.read_vec_at(sub_pos + 1, size_bytes as usize).map_err(CoreError::IoError)?;
                    let mut size_word: u64 = 0;
                    for (i, &byte) in size_field.iter().enumerate() {
                        size_word |= u64::from(byte) << (8 * i);
                    }

                    let payload_size = size_word * 2;
                    let header_len = 1 + size_bytes;
                    let total = header_len + payload_size;

                    if sub_pos + total > block_end {
                        break;
                    }

                    if is_metadata_id(id) {
                        regions.extend(Region::new(TagFormat::WavPackNative, sub_pos, total, file_len));
                    }

                    sub_pos += total;
                }

                pos = block_end;
            }

            Ok(regions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sub_block(id: u8, payload: &[u8]) -> Vec<u8> {
        assert_eq!(payload.len() % 2, 0);
        let size_word = (payload.len() / 2) as u8;
        let mut out = vec![id, size_word];
        out.extend_from_slice(payload);
        out
    }

    fn block(sub_blocks: &[Vec<u8>]) -> Vec<u8> {
        let mut body = vec![0u8; 24]; // version..crc fixed fields
        for s in sub_blocks {
            body.extend_from_slice(s);
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"wvpk");
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn finds_metadata_sub_block_in_first_block() {
        let meta = sub_block(0x22, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let data = block(&[meta.clone()]);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let mut file = TaggedFile::open(f.path()).unwrap();

        let strategy = WavPackStrategy;
        assert!(strategy.can_detect(b"wvpk", &[]));
        let regions = strategy.detect(&mut file, b"wvpk", &[]);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].format(), TagFormat::WavPackNative);
        assert_eq!(regions[0].offset(), 32);
        assert_eq!(regions[0].size(), meta.len() as u64);
    }

    #[test]
    fn non_metadata_sub_block_is_ignored() {
        let non_meta = sub_block(0x01, &[0, 0]);
        let data = block(&[non_meta]);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let mut file = TaggedFile::open(f.path()).unwrap();

        let strategy = WavPackStrategy;
        assert!(strategy.detect(&mut file, b"wvpk", &[]).is_empty());
    }
}
