//! MP4/M4A "ilst" atom detection inside the `moov/udta/meta` hierarchy.

use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategy::{run_catching, Strategy};

struct Atom {
    tag: [u8; 4],
    offset: u64,
    header_len: u64,
    body_len: u64,
}

fn read_atom(file: &mut TaggedFile, pos: u64, limit: u64) -> Result<Option<Atom>, CoreError> {
    if pos + 8 > limit {
        return Ok(None);
    }

    let header = file.read_vec_at(pos, 8).map_err(CoreError::IoError)?;
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&header[4..8]);
    let declared = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);

    let (header_len, total_len) = if declared == 1 {
        if pos + 16 > limit {
            return Ok(None);
        }
        let ext = file.read_vec_at(pos + 8, 8).map_err(CoreError::IoError)?;
        let size = u64::from_be_bytes(ext.try_into().unwrap());
        (16u64, size)
    } else if declared == 0 {
        (8u64, limit - pos)
    } else {
        (8u64, declared as u64)
    };

    if total_len < header_len || pos + total_len > limit {
        return Ok(None);
    }

    Ok(Some(Atom { tag, offset: pos, header_len, body_len: total_len - header_len }))
}

/// Walks top-level atoms in `[start, limit)`, returning the first one whose
/// tag matches `want`.
fn find_atom(file: &mut TaggedFile, mut pos: u64, limit: u64, want: &[u8; 4]) -> Result<Option<Atom>, CoreError> {
    while pos < limit {
        match read_atom(file, pos, limit)? {
            Some(atom) => {
                if &atom.tag == want {
                    return Ok(Some(atom));
                }
                pos = atom.offset + atom.header_len + atom.body_len;
            }
            None => return Ok(None),
        }
    }
    Ok(None)
}

pub(crate) struct Mp4Strategy;

impl Strategy for Mp4Strategy {
    fn supported_formats(&self) -> &'static [TagFormat] {
        &[TagFormat::Mp4]
    }

    fn can_detect(&self, head: &[u8], _tail: &[u8]) -> bool {
        head.len() >= 8 && &head[4..8] == b"ftyp"
    }

    fn detect(&self, file: &mut TaggedFile, _head: &[u8], _tail: &[u8]) -> Vec<Region> {
        let file_len = file.len();

        run_catching("mp4", || {
            let moov = match find_atom(file, 0, file_len, b"moov")? {
                Some(atom) => atom,
                None => return Err(CoreError::MalformedTag("no moov atom")),
            };
            let moov_body_start = moov.offset + moov.header_len;
            let moov_body_end = moov_body_start + moov.body_len;

            let udta = match find_atom(file, moov_body_start, moov_body_end, b"udta")? {
                Some(atom) => atom,
                None => return Ok(Vec::new()),
            };
            let udta_body_start = udta.offset + udta.header_len;
            let udta_body_end = udta_body_start + udta.body_len;

            let meta = match find_atom(file, udta_body_start, udta_body_end, b"meta")? {
                Some(atom) => atom,
                None => return Ok(Vec::new()),
            };
            // The `meta` box carries a 4-byte version/flags field before its
            // children, unlike a plain container atom.
            let meta_body_start = meta.offset + meta.header_len + 4;
            let meta_body_end = meta.offset + meta.header_len + meta.body_len;

            let ilst = match find_atom(file, meta_body_start, meta_body_end, b"ilst")? {
                Some(atom) => atom,
                None => return Ok(Vec::new()),
            };

            let total = ilst.header_len + ilst.body_len;
            Ok(Region::new(TagFormat::Mp4, ilst.offset, total, file_len).into_iter().collect())
        })
    }
}
