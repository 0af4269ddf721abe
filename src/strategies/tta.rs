//! TTA native metadata: an ID3v2 tag prepended before the `TTA1` stream
//! signature.
//!
//! The encoded TTA bitstream itself carries no offset a detector can use
//! to find a tag "after the audio frames" without decoding the lossless
//! frames, so the only TTA-specific placement this strategy can locate is
//! the leading tag some encoders prepend. A trailing ID3v1/APEv2 tag is
//! already reported by [`super::id3v1::Id3v1Strategy`] and
//! [`super::ape::ApeStrategy`].

use crate::core::BufStream;
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const ID3V2_HEADER_LEN: u64 = 10;

pub(crate) struct TtaStrategy;

impl Strategy for TtaStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::TtaMetadata]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        (head.len() >= 4 && &head[0..4] == b"TTA1")
            || (head.len() >= 3 && &head[0..3] == b"ID3" && head.windows(4).any(|w| w == b"TTA1"))
    }

    fn detect(&self, file: &mut TaggedFile, head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("tta", || {
            if &head[0..3] != b"ID3" {
                return Ok(Vec::new());
            }

            let mut stream = BufStream::new(head);
            stream.skip(6).map_err(CoreError::IoError)?;
            let size = stream
                .read_synchsafe_u32()
                .map_err(|_| CoreError::MalformedTag("invalid leading ID3v2 size"))?;

            let total = ID3V2_HEADER_LEN + u64::from(size);
            let next = file.read_vec_at(total, 4).map_err(CoreError::IoError)?;

            if next != b"TTA1" {
                return Ok(Vec::new());
            }

            Ok(Region::new(TagFormat::TtaMetadata, 0, total, file_len).into_iter().collect())
        })
    }
}
