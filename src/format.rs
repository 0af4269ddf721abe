//! The closed catalog of tag formats this crate can detect.

use std::fmt::{self, Display, Formatter};

/// A metadata tag format that [`detect`](crate::detect) can recognize.
///
/// This enumeration is closed: every format the detection strategies can
/// report is a variant here, and every variant has a stable, unique
/// display name used in logs and external output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TagFormat {
    Id3v1,
    Id3v1_1,
    Id3v22,
    Id3v23,
    Id3v24,
    ApeV1,
    ApeV2,
    VorbisComment,
    Mp4,
    RiffInfo,
    BwfV0,
    BwfV1,
    BwfV2,
    AiffMetadata,
    Lyrics3v1,
    Lyrics3v2,
    AsfContentDescription,
    AsfExtendedContentDescription,
    FlacApplication,
    MatroskaTags,
    WebmTags,
    DsfMetadata,
    DffMetadata,
    TtaMetadata,
    WavPackNative,
}

impl TagFormat {
    /// All formats this crate knows how to detect, in enum declaration order.
    pub const ALL: [TagFormat; 25] = [
        TagFormat::Id3v1,
        TagFormat::Id3v1_1,
        TagFormat::Id3v22,
        TagFormat::Id3v23,
        TagFormat::Id3v24,
        TagFormat::ApeV1,
        TagFormat::ApeV2,
        TagFormat::VorbisComment,
        TagFormat::Mp4,
        TagFormat::RiffInfo,
        TagFormat::BwfV0,
        TagFormat::BwfV1,
        TagFormat::BwfV2,
        TagFormat::AiffMetadata,
        TagFormat::Lyrics3v1,
        TagFormat::Lyrics3v2,
        TagFormat::AsfContentDescription,
        TagFormat::AsfExtendedContentDescription,
        TagFormat::FlacApplication,
        TagFormat::MatroskaTags,
        TagFormat::WebmTags,
        TagFormat::DsfMetadata,
        TagFormat::DffMetadata,
        TagFormat::TtaMetadata,
        TagFormat::WavPackNative,
    ];

    /// The stable display name for this format. Injective over the enumeration.
    pub fn name(self) -> &'static str {
        match self {
            TagFormat::Id3v1 => "ID3v1",
            TagFormat::Id3v1_1 => "ID3v1.1",
            TagFormat::Id3v22 => "ID3v2.2",
            TagFormat::Id3v23 => "ID3v2.3",
            TagFormat::Id3v24 => "ID3v2.4",
            TagFormat::ApeV1 => "APEv1",
            TagFormat::ApeV2 => "APEv2",
            TagFormat::VorbisComment => "VorbisComment",
            TagFormat::Mp4 => "MP4",
            TagFormat::RiffInfo => "RIFF-INFO",
            TagFormat::BwfV0 => "BWFv0",
            TagFormat::BwfV1 => "BWFv1",
            TagFormat::BwfV2 => "BWFv2",
            TagFormat::AiffMetadata => "AIFF-Metadata",
            TagFormat::Lyrics3v1 => "Lyrics3v1",
            TagFormat::Lyrics3v2 => "Lyrics3v2",
            TagFormat::AsfContentDescription => "ASF Content Description",
            TagFormat::AsfExtendedContentDescription => "ASF Extended Content Description",
            TagFormat::FlacApplication => "FLAC Application",
            TagFormat::MatroskaTags => "Matroska Tags",
            TagFormat::WebmTags => "WebM Tags",
            TagFormat::DsfMetadata => "DSF Metadata",
            TagFormat::DffMetadata => "DFF Metadata",
            TagFormat::TtaMetadata => "TTA Metadata",
            TagFormat::WavPackNative => "WavPack Native",
        }
    }
}

impl Display for TagFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_injective() {
        let names: HashSet<&str> = TagFormat::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), TagFormat::ALL.len());
    }

    #[test]
    fn all_contains_every_variant_once() {
        assert_eq!(TagFormat::ALL.len(), 25);
    }
}
