//! Process-wide, read-only priority tables.
//!
//! `full_scan_priority` gives the canonical probe order used by
//! `ScanConfiguration::FullScan`; `comfort_scan_priority` narrows that order
//! per filename extension for `ScanConfiguration::ComfortScan`, falling
//! back to the full order for any extension it doesn't recognize.

use crate::format::TagFormat;
use TagFormat::*;

/// The canonical full-scan order: most common and relevant formats first.
/// This order is observable in logs and tests, so it is a stable contract,
/// not an implementation detail.
pub fn full_scan_priority() -> Vec<TagFormat> {
    vec![
        Id3v23,
        Id3v24,
        Id3v1,
        Id3v1_1,
        Id3v22,
        VorbisComment,
        Mp4,
        ApeV2,
        ApeV1,
        AsfContentDescription,
        AsfExtendedContentDescription,
        RiffInfo,
        BwfV2,
        BwfV1,
        BwfV0,
        FlacApplication,
        MatroskaTags,
        WebmTags,
        DsfMetadata,
        DffMetadata,
        WavPackNative,
        TtaMetadata,
        AiffMetadata,
        Lyrics3v2,
        Lyrics3v1,
    ]
}

/// Looks up the comfort-scan order for a lowercased, dot-free extension.
///
/// Unknown extensions fall back to [`full_scan_priority`]. The returned
/// vector is freshly allocated on every call, so callers cannot observe or
/// corrupt internal table state by mutating it.
pub fn comfort_scan_priority(extension: &str) -> Vec<TagFormat> {
    let ext = extension.to_ascii_lowercase();

    match ext.as_str() {
        "mp3" => vec![
            Id3v23, Id3v24, Id3v1, Id3v1_1, Id3v22, ApeV2, ApeV1, Lyrics3v2, Lyrics3v1,
        ],
        "wav" => vec![RiffInfo, BwfV2, BwfV1, BwfV0, Id3v23, Id3v24, Id3v1, Id3v1_1],
        "ogg" | "spx" | "opus" => vec![VorbisComment],
        "flac" => vec![VorbisComment, FlacApplication],
        "mp4" | "m4a" | "m4v" => vec![Mp4],
        "aiff" | "aif" => vec![AiffMetadata, Id3v23, Id3v24],
        "ape" => vec![ApeV2, ApeV1, Id3v1, Id3v1_1],
        "wv" => vec![WavPackNative, ApeV2, ApeV1, Id3v1, Id3v1_1],
        "mpc" => vec![ApeV2, ApeV1, Id3v1, Id3v1_1],
        "wma" | "asf" | "wmv" => vec![AsfContentDescription, AsfExtendedContentDescription],
        "mkv" | "mka" | "mks" => vec![MatroskaTags],
        "webm" => vec![WebmTags],
        "dsf" => vec![DsfMetadata, Id3v23, Id3v24],
        "dff" | "dsd" => vec![DffMetadata],
        "tta" => vec![TtaMetadata, ApeV2, ApeV1, Id3v1, Id3v1_1],
        "ofr" | "shn" => full_scan_priority(),
        _ => full_scan_priority(),
    }
}
