//! Matroska/WebM EBML walk: locate the `Segment` element, then every
//! `Tags` element nested directly inside it.

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

const EBML_SIGNATURE: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const DOCTYPE_ID: u64 = 0x4282;
const SEGMENT_ID: u64 = 0x1853_8067;
const TAGS_ID: u64 = 0x1254_C367;

struct Element {
    id: u64,
    offset: u64,
    header_len: u64,
    payload_len: u64,
}

/// Reads one `{id, size}` element header at `pos`, returning its id (with
/// the VLI length marker bits still set, matching conventional Matroska ID
/// notation), the total header length, and the payload length.
fn read_element(file: &mut TaggedFile, pos: u64, limit: u64) -> Result<Option<Element>, CoreError> {
    if pos >= limit {
        return Ok(None);
    }

    let (id, id_len) = match read_vli_raw(file, pos, limit)? {
        Some(v) => v,
        None => return Ok(None),
    };

    let size_pos = pos + id_len;
    let (payload_len, size_len) = match read_vli_masked(file, size_pos, limit)? {
        Some(v) => v,
        None => return Ok(None),
    };

    let header_len = id_len + size_len;
    if pos + header_len + payload_len > limit {
        return Ok(None);
    }

    Ok(Some(Element { id, offset: pos, header_len, payload_len }))
}

fn read_vli_raw(file: &mut TaggedFile, pos: u64, limit: u64) -> Result<Option<(u64, u64)>, CoreError> {
    let bytes = match read_vli_bytes(file, pos, limit)? {
        Some(b) => b,
        None => return Ok(None),
    };

    let value = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    Ok(Some((value, bytes.len() as u64)))
}

fn read_vli_masked(file: &mut TaggedFile, pos: u64, limit: u64) -> Result<Option<(u64, u64)>, CoreError> {
    let bytes = match read_vli_bytes(file, pos, limit)? {
        Some(b) => b,
        None => return Ok(None),
    };

    let len = bytes.len();
    let mut value = u64::from(bytes[0] & (0xFF >> len));
    for &b in &bytes[1..] {
        value = (value << 8) | u64::from(b);
    }

    Ok(Some((value, len as u64)))
}

fn read_vli_bytes(file: &mut TaggedFile, pos: u64, limit: u64) -> Result<Option<Vec<u8>>, CoreError> {
    if pos >= limit {
        return Ok(None);
    }

    let first = file.read_vec_at(pos, 1).map_err(CoreError::IoError)?[0];
    if first == 0 {
        return Ok(None);
    }

    let len = (first.leading_zeros() + 1) as u64;
    if pos + len > limit {
        return Ok(None);
    }

    file.read_vec_at(pos, len as usize).map(Some).map_err(CoreError::IoError)
}

pub(crate) struct MatroskaStrategy;

impl Strategy for MatroskaStrategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::MatroskaTags, TagFormat::WebmTags]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 4 && head[0..4] == EBML_SIGNATURE
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("matroska", || {
            let ebml_header = match read_element(file, 0, file_len)? {
                Some(el) => el,
                None => return Err(CoreError::MalformedTag("truncated EBML header")),
            };

            let doc_type = read_doc_type(file, ebml_header.offset + ebml_header.header_len, ebml_header.offset + ebml_header.header_len + ebml_header.payload_len)?;
            let format = match doc_type.as_deref() {
                Some("webm") => TagFormat::WebmTags,
                _ => TagFormat::MatroskaTags,
            };

            let segment_start = ebml_header.offset + ebml_header.header_len + ebml_header.payload_len;
            let segment = match read_element(file, segment_start, file_len)? {
                Some(el) if el.id == SEGMENT_ID => el,
                _ => return Err(CoreError::MalformedTag("no Segment element")),
            };

            let body_start = segment.offset + segment.header_len;
            let body_end = body_start + segment.payload_len;

            let mut regions = Vec::new();
            let mut pos = body_start;

            while let Some(el) = read_element(file, pos, body_end)? {
                if el.id == TAGS_ID {
                    let total = el.header_len + el.payload_len;
                    regions.extend(Region::new(format, el.offset, total, file_len));
                }
                pos = el.offset + el.header_len + el.payload_len;
            }

            Ok(regions)
        })
    }
}

fn read_doc_type(file: &mut TaggedFile, start: u64, end: u64) -> Result<Option<String>, CoreError> {
    let mut pos = start;
    while let Some(el) = read_element(file, pos, end)? {
        if el.id == DOCTYPE_ID {
            let payload_start = el.offset + el.header_len;
            let bytes = file.read_vec_at(payload_start, el.payload_len as usize).map_err(CoreError::IoError)?;
            return Ok(String::from_utf8(bytes).ok().map(|s| s.trim_end_matches('\0').to_string()));
        }
        pos = el.offset + el.header_len + el.payload_len;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vli_size(value: u64) -> Vec<u8> {
        // single-byte VLI for small test sizes.
        assert!(value < 0x80);
        vec![0x80 | value as u8]
    }

    fn element(id: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&vli_size(payload.len() as u64));
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn finds_tags_element_inside_segment() {
        let doctype = element(&[0x42, 0x82], b"matroska");
        let ebml_header = element(&EBML_SIGNATURE, &doctype);

        let tags = element(&[0x12, 0x54, 0xC3, 0x67], &[0u8; 10]);
        let other = element(&[0x15, 0x49, 0xA9, 0x66], &[0u8; 5]); // Info, ignored
        let mut segment_body = Vec::new();
        segment_body.extend_from_slice(&other);
        segment_body.extend_from_slice(&tags);

        let mut segment = Vec::new();
        segment.extend_from_slice(&[0x18, 0x53, 0x80, 0x67]);
        segment.extend_from_slice(&vli_size(segment_body.len() as u64));
        segment.extend_from_slice(&segment_body);

        let mut data = ebml_header.clone();
        data.extend_from_slice(&segment);

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let mut file = TaggedFile::open(f.path()).unwrap();

        let strategy = MatroskaStrategy;
        assert!(strategy.can_detect(&data[0..4], &[]));
        let regions = strategy.detect(&mut file, &data[0..4], &[]);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].format(), TagFormat::MatroskaTags);
        assert_eq!(regions[0].size(), tags.len() as u64);
    }
}
