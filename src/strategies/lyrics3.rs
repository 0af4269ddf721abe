//! Lyrics3v1/v2 footer detection, anchored before a trailing ID3v1 tag
//! when one is present.

use std::str;

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const LYRICS_END: &[u8; 9] = b"LYRICSEND";
const LYRICS_BEGIN: &[u8; 11] = b"LYRICSBEGIN";
const LYRICS200: &[u8; 9] = b"LYRICS200";
const MAX_V1_PAYLOAD: u64 = 5100;
const ID3V1_SIZE: u64 = 128;

/// The byte offset Lyrics3 footers are anchored against: the end of the
/// file, or the start of a trailing ID3v1 tag when one is present.
fn anchor(tail: &[u8], file_len: u64) -> u64 {
    if tail.len() >= 128 && &tail[tail.len() - 128..tail.len() - 125] == b"TAG" {
        file_len - ID3V1_SIZE
    } else {
        file_len
    }
}

pub(crate) struct Lyrics3Strategy;

impl Strategy for Lyrics3Strategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::Lyrics3v1, TagFormat::Lyrics3v2]
    }

    fn can_detect(&self, _head: &[u8], tail: &[u8]) -> bool {
        let end = anchor(tail, tail.len() as u64);
        tail_window(tail, end, 9).map(|w| w == LYRICS_END).unwrap_or(false)
            || tail_window(tail, end, 9).map(|w| w == LYRICS200).unwrap_or(false)
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();
        let end = anchor(tail, file_len);

        run_catching("lyrics3", || {
            let mut regions = Vec::new();

            if let Some(region) = detect_v2(file, end, file_len)? {
                regions.push(region);
            } else if let Some(region) = detect_v1(file, end, file_len)? {
                regions.push(region);
            }

            Ok(regions)
        })
    }
}

/// Returns the last `len` bytes ending at `end` (relative to the start of
/// the file), read from `tail` when `end` falls inside it.
fn tail_window(tail: &[u8], end: u64, len: usize) -> Option<&[u8]> {
    let tail_len = tail.len() as u64;
    if end < len as u64 || end > tail_len {
        return None;
    }
    let start = (end - len as u64) as usize;
    let local_end = end as usize;
    tail.get(start..local_end)
}

fn detect_v2(file: &mut TaggedFile, end: u64, file_len: u64) -> Result<Option<Region>, CoreError> {
    let footer_len = 6 + 9;
    if end < footer_len {
        return Ok(None);
    }

    let footer = file.read_vec_at(end - footer_len, footer_len as usize).map_err(CoreError::IoError)?;

    if &footer[6..15] != LYRICS200 {
        return Ok(None);
    }

    let size_str = str::from_utf8(&footer[0..6]).map_err(|_| CoreError::MalformedTag("non-ASCII Lyrics3v2 size"))?;
    let payload_plus_begin: u64 = size_str
        .trim()
        .parse()
        .map_err(|_| CoreError::MalformedTag("non-numeric Lyrics3v2 size"))?;

    let total = payload_plus_begin + 15;
    let offset = end
        .checked_sub(total)
        .ok_or(CoreError::MalformedTag("Lyrics3v2 size exceeds available space"))?;

    Ok(Region::new(TagFormat::Lyrics3v2, offset, total, file_len))
}

fn detect_v1(file: &mut TaggedFile, end: u64, file_len: u64) -> Result<Option<Region>, CoreError> {
    if end < 9 {
        return Ok(None);
    }

    let tail_marker = file.read_vec_at(end - 9, 9).map_err(CoreError::IoError)?;
    if tail_marker != LYRICS_END {
        return Ok(None);
    }

    let search_len = u64::min(end, MAX_V1_PAYLOAD + 11);
    let search_start = end - search_len;
    let search_buf = file.read_vec_at(search_start, search_len as usize).map_err(CoreError::IoError)?;

    let begin_pos = search_buf
        .windows(LYRICS_BEGIN.len())
        .position(|w| w == LYRICS_BEGIN);

    match begin_pos {
        Some(pos) => {
            let offset = search_start + pos as u64;
            let total = end - offset;
            Ok(Region::new(TagFormat::Lyrics3v1, offset, total, file_len))
        }
        None => Ok(None),
    }
}
