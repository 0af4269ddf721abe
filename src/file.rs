//! Opens a file and exposes bounded prefix/suffix buffers plus random access
//! to the body, for detection strategies to probe.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::err::CoreError;

/// The fixed size of the head and tail buffers every scan reads.
pub const BUFFER_SIZE: usize = 4096;

/// The bounded prefix and suffix of a file, read once per scan.
///
/// `head` is the first `min(BUFFER_SIZE, file_length)` bytes of the file;
/// `tail` is the last `min(BUFFER_SIZE, file_length)` bytes. When the file
/// is smaller than `BUFFER_SIZE`, `head` and `tail` contain identical bytes.
pub struct FileBuffers {
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl FileBuffers {
    pub fn head(&self) -> &[u8] {
        &self.head
    }

    pub fn tail(&self) -> &[u8] {
        &self.tail
    }
}

/// An open file handle plus the metadata strategies need to probe it:
/// its length, its lowercased extension, and seekable random access to
/// the body for deep reads.
pub struct TaggedFile {
    handle: fs::File,
    len: u64,
    extension: Option<String>,
}

impl TaggedFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<TaggedFile, CoreError> {
        let path = path.as_ref();

        let metadata = path.metadata().map_err(CoreError::FileAccess)?;

        if metadata.is_dir() {
            return Err(CoreError::FileAccess(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path is a directory",
            )));
        }

        let handle = fs::File::open(path).map_err(CoreError::FileAccess)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        Ok(TaggedFile { handle, len: metadata.len(), extension })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Reads the bounded head and tail buffers per the buffer-reader algorithm:
    /// read up to `BUFFER_SIZE` bytes from the start, then up to
    /// `BUFFER_SIZE` bytes from `max(0, len - BUFFER_SIZE)`. When the file is
    /// smaller than `BUFFER_SIZE`, both buffers alias the same bytes.
    pub fn buffers(&mut self) -> io::Result<FileBuffers> {
        let mut head = vec![0u8; usize::min(BUFFER_SIZE, self.len as usize)];
        self.handle.seek(SeekFrom::Start(0))?;
        self.handle.read_exact(&mut head)?;

        if self.len <= BUFFER_SIZE as u64 {
            let tail = head.clone();
            return Ok(FileBuffers { head, tail });
        }

        let tail_start = self.len - BUFFER_SIZE as u64;
        let mut tail = vec![0u8; BUFFER_SIZE];
        self.handle.seek(SeekFrom::Start(tail_start))?;
        self.handle.read_exact(&mut tail)?;

        Ok(FileBuffers { head, tail })
    }

    /// Reads exactly `buf.len()` bytes starting at `offset` in the file body.
    pub(crate) fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.handle.seek(SeekFrom::Start(offset))?;
        self.handle.read_exact(buf)
    }

    /// Reads exactly `len` bytes starting at `offset` into a freshly allocated `Vec`.
    pub(crate) fn read_vec_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }
}
