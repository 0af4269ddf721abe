//! ID3v2.2/2.3/2.4 header detection.

use crate::core::BufStream;
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const HEADER_SIZE: u64 = 10;
const FOOTER_FLAG: u8 = 0x10;

pub(crate) struct Id3v2Strategy;

impl Strategy for Id3v2Strategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::Id3v22, TagFormat::Id3v23, TagFormat::Id3v24]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 4 && &head[0..3] == b"ID3" && matches!(head[3], 2 | 3 | 4)
    }

    fn detect(&self, file: &mut TaggedFile, head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("id3v2", || {
            let mut stream = BufStream::new(head);
            stream.skip(3).map_err(CoreError::IoError)?;

            let major = stream.read_u8().map_err(CoreError::IoError)?;
            let format = match major {
                2 => TagFormat::Id3v22,
                3 => TagFormat::Id3v23,
                4 => TagFormat::Id3v24,
                _ => return Err(CoreError::MalformedTag("unsupported ID3v2 major version")),
            };

            stream.read_u8().map_err(CoreError::IoError)?; // revision
            let flags = stream.read_u8().map_err(CoreError::IoError)?;

            let size = stream
                .read_synchsafe_u32()
                .map_err(|_| CoreError::MalformedTag("invalid synchsafe header size"))?;

            let has_footer = major == 4 && flags & FOOTER_FLAG != 0;
            let total = HEADER_SIZE + u64::from(size) + if has_footer { HEADER_SIZE } else { 0 };

            Ok(Region::new(format, 0, total, file_len).into_iter().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(data: &[u8]) -> TaggedFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(data).unwrap();
        f.flush().unwrap();
        TaggedFile::open(f.path()).unwrap()
    }

    #[test]
    fn detects_id3v23_header_with_synchsafe_size() {
        let mut data = vec![b'I', b'D', b'3', 3, 0, 0x00, 0x00, 0x00, 0x00, 0x7F];
        data.extend_from_slice(&[0u8; 127]);
        let mut file = file_with(&data);
        let buffers = file.buffers().unwrap();
        let strategy = Id3v2Strategy;

        assert!(strategy.can_detect(buffers.head(), buffers.tail()));
        let regions = strategy.detect(&mut file, buffers.head(), buffers.tail());

        assert_eq!(regions, vec![Region::new(TagFormat::Id3v23, 0, 137, 137).unwrap()]);
    }

    #[test]
    fn id3v24_footer_flag_adds_ten_bytes() {
        let mut data = vec![b'I', b'D', b'3', 4, 0, FOOTER_FLAG, 0x00, 0x00, 0x00, 0x0A];
        data.extend_from_slice(&[0u8; 10]);
        data.extend_from_slice(&[0u8; 10]); // footer copy
        let mut file = file_with(&data);
        let buffers = file.buffers().unwrap();
        let strategy = Id3v2Strategy;

        let regions = strategy.detect(&mut file, buffers.head(), buffers.tail());
        assert_eq!(regions[0].size(), 10 + 10 + 10);
    }

    #[test]
    fn rejects_set_top_bit_in_size() {
        let data = vec![b'I', b'D', b'3', 3, 0, 0x00, 0x00, 0x00, 0x00, 0xFF];
        let mut file = file_with(&data);
        let buffers = file.buffers().unwrap();
        let strategy = Id3v2Strategy;
        assert!(strategy.detect(&mut file, buffers.head(), buffers.tail()).is_empty());
    }
}
