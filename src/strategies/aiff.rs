//! AIFF/AIFC chunk walk: each metadata chunk (`NAME`, `AUTH`, `(c) `,
//! `ANNO`) is reported as its own region.

use crate::chunkwalk::{ByteOrder, ChunkWalker};
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const FORM_HEADER_LEN: u64 = 12;
const METADATA_TAGS: [&[u8; 4]; 4] = [b"NAME", b"AUTH", b"(c) ", b"ANNO"];

pub(crate) struct AiffStrategy;

impl Strategy for AiffStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::AiffMetadata]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 12 && &head[0..4] == b"FORM" && (&head[8..12] == b"AIFF" || &head[8..12] == b"AIFC")
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("aiff", || {
            let mut regions = Vec::new();
            let mut walker = ChunkWalker::new(file, FORM_HEADER_LEN, file_len, ByteOrder::Big, true);

            while let Some(chunk) = walker.next().map_err(CoreError::IoError)? {
                if METADATA_TAGS.iter().any(|tag| &&chunk.tag == tag) {
                    let total = chunk.header_len + chunk.size;
                    regions.extend(Region::new(TagFormat::AiffMetadata, chunk.offset, total, file_len));
                }
            }

            Ok(regions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(tag);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn aiff_file(chunks: &[Vec<u8>]) -> TaggedFile {
        let mut body = Vec::new();
        for c in chunks {
            body.extend_from_slice(c);
        }

        let mut data = Vec::new();
        data.extend_from_slice(b"FORM");
        data.extend_from_slice(&((4 + body.len()) as u32).to_be_bytes());
        data.extend_from_slice(b"AIFF");
        data.extend_from_slice(&body);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        TaggedFile::open(f.path()).unwrap()
    }

    #[test]
    fn reports_each_metadata_chunk_individually() {
        let name_chunk = chunk(b"NAME", b"Song Title");
        let auth_chunk = chunk(b"AUTH", b"Some Author");
        let comm_chunk = chunk(b"COMM", &[0u8; 18]);

        let mut file = aiff_file(&[comm_chunk, name_chunk.clone(), auth_chunk.clone()]);
        let strategy = AiffStrategy;
        let regions = strategy.detect(&mut file, &[], &[]);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].format(), TagFormat::AiffMetadata);
        assert_eq!(regions[0].size(), name_chunk.len() as u64);
        assert_eq!(regions[1].size(), auth_chunk.len() as u64);
    }

    #[test]
    fn aifc_container_is_also_detected() {
        let mut data = Vec::new();
        data.extend_from_slice(b"FORM");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(b"AIFC");

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let file = TaggedFile::open(f.path()).unwrap();
        drop(file);

        let strategy = AiffStrategy;
        assert!(strategy.can_detect(&data[0..12], &[]));
    }
}
