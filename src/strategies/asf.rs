//! ASF (Windows Media) Header Object walk: Content Description and
//! Extended Content Description objects.

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const HEADER_GUID: [u8; 16] = [
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x86, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
const CONTENT_DESCRIPTION_GUID: [u8; 16] = [
    0x33, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
];
const EXTENDED_CONTENT_DESCRIPTION_GUID: [u8; 16] = [
    0x40, 0xA4, 0xD0, 0xD2, 0x07, 0xE3, 0xD2, 0x11, 0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50,
];
const OBJECT_HEADER_LEN: u64 = 24; // 16-byte GUID + 8-byte size
const TOP_HEADER_LEN: u64 = 30; // object header + object count(4) + reserved(2)

pub(crate) struct AsfStrategy;

impl Strategy for AsfStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::AsfContentDescription, TagFormat::AsfExtendedContentDescription]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 16 && head[0..16] == HEADER_GUID
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("asf", || {
            if TOP_HEADER_LEN > file_len {
                return Err(CoreError::MalformedTag("truncated ASF header object"));
            }

            let size_bytes = file.read_vec_at(16, 8).map_err(CoreError::IoError)?;
            let header_size = u64::from_le_bytes(size_bytes.try_into().unwrap());
            let header_end = u64::min(header_size, file_len);

            let mut regions = Vec::new();
            let mut pos = TOP_HEADER_LEN;

            while pos + OBJECT_HEADER_LEN <= header_end {
                let obj_header = file.read_vec_at(pos, OBJECT_HEADER_LEN as usize).map_err(CoreError::IoError)?;
                let mut guid = [0u8; 16];
                guid.copy_from_slice(&obj_header[0..16]);
                let obj_size = u64::from_le_bytes(obj_header[16..24].try_into().unwrap());

                if obj_size < OBJECT_HEADER_LEN || pos + obj_size > header_end {
                    break;
                }

                let format = if guid == CONTENT_DESCRIPTION_GUID {
                    Some(TagFormat::AsfContentDescription)
                } else if guid == EXTENDED_CONTENT_DESCRIPTION_GUID {
                    Some(TagFormat::AsfExtendedContentDescription)
                } else {
                    None
                };

                if let Some(format) = format {
                    regions.extend(Region::new(format, pos, obj_size, file_len));
                }

                pos += obj_size;
            }

            Ok(regions)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn object(guid: [u8; 16], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&guid);
        out.extend_from_slice(&((OBJECT_HEADER_LEN + payload.len() as u64)).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn finds_both_description_objects() {
        let content_desc = object(CONTENT_DESCRIPTION_GUID, &[0u8; 20]);
        let ext_content_desc = object(EXTENDED_CONTENT_DESCRIPTION_GUID, &[0u8; 12]);

        let mut children = Vec::new();
        children.extend_from_slice(&content_desc);
        children.extend_from_slice(&ext_content_desc);

        let total_header_size = TOP_HEADER_LEN + children.len() as u64;

        let mut data = Vec::new();
        data.extend_from_slice(&HEADER_GUID);
        data.extend_from_slice(&total_header_size.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes()); // object count
        data.extend_from_slice(&[0u8; 2]); // reserved
        data.extend_from_slice(&children);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let mut file = TaggedFile::open(f.path()).unwrap();

        let strategy = AsfStrategy;
        assert!(strategy.can_detect(&data[0..16], &[]));
        let regions = strategy.detect(&mut file, &data[0..16], &[]);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].format(), TagFormat::AsfContentDescription);
        assert_eq!(regions[0].size(), content_desc.len() as u64);
        assert_eq!(regions[1].format(), TagFormat::AsfExtendedContentDescription);
    }

    #[test]
    fn recognizes_the_real_header_object_guid() {
        // 75B22630-868E-11CF-A6D9-00AA0062CE6C, little-endian on disk, spelled
        // out independently of the `HEADER_GUID` constant so a wrong constant
        // can't make this test self-confirming.
        let real_header_guid: [u8; 16] = [
            0x30, 0x26, 0xB2, 0x75, 0x8E, 0x86, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
        ];

        assert_eq!(HEADER_GUID, real_header_guid);

        let strategy = AsfStrategy;
        assert!(strategy.can_detect(&real_header_guid, &[]));
    }
}
