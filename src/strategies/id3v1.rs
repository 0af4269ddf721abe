//! ID3v1 / ID3v1.1 footer detection.

use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const TAG_SIZE: u64 = 128;

pub(crate) struct Id3v1Strategy;

impl Strategy for Id3v1Strategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::Id3v1, TagFormat::Id3v1_1]
    }

    fn can_detect(&self, _head: &[u8], tail: &[u8]) -> bool {
        tail.len() >= 128 && &tail[tail.len() - 128..tail.len() - 125] == b"TAG"
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("id3v1", || {
            let footer = &tail[tail.len() - 128..];
            let offset = file_len - TAG_SIZE;

            let format = if footer[125] == 0 && footer[126] != 0 {
                TagFormat::Id3v1_1
            } else {
                TagFormat::Id3v1
            };

            Ok(Region::new(format, offset, TAG_SIZE, file_len).into_iter().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn footer(track: u8, genre: u8) -> [u8; 128] {
        let mut tag = [0u8; 128];
        tag[0..3].copy_from_slice(b"TAG");
        tag[125] = 0;
        tag[126] = track;
        tag[127] = genre;
        tag
    }

    fn file_with(prefix_len: usize, footer: [u8; 128]) -> TaggedFile {
        let mut data = vec![0u8; prefix_len];
        data.extend_from_slice(&footer);
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        TaggedFile::open(f.path()).unwrap()
    }

    #[test]
    fn detects_id3v1_1_with_track_number() {
        let mut file = file_with(1000, footer(7, 17));
        let buffers = file.buffers().unwrap();
        let strategy = Id3v1Strategy;

        assert!(strategy.can_detect(buffers.head(), buffers.tail()));
        let regions = strategy.detect(&mut file, buffers.head(), buffers.tail());

        assert_eq!(regions, vec![Region::new(TagFormat::Id3v1_1, 1000, 128, 1128).unwrap()]);
    }

    #[test]
    fn detects_plain_id3v1_without_track_number() {
        let mut tag = footer(0, 17);
        tag[126] = 0;
        let mut file = file_with(1000, tag);
        let buffers = file.buffers().unwrap();
        let strategy = Id3v1Strategy;

        let regions = strategy.detect(&mut file, buffers.head(), buffers.tail());
        assert_eq!(regions[0].format(), TagFormat::Id3v1);
    }

    #[test]
    fn rejects_missing_signature() {
        let mut file = file_with(1000, [0u8; 128]);
        let buffers = file.buffers().unwrap();
        let strategy = Id3v1Strategy;
        assert!(!strategy.can_detect(buffers.head(), buffers.tail()));
    }
}
