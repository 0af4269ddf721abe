use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

/// The error kinds a caller of this crate can ever observe.
///
/// `IoError` and `MalformedTag` exist as a shared vocabulary for strategies
/// to log against, but per the propagation policy only `FileAccess` and
/// `InvalidArgument` ever escape [`detect`](crate::detect),
/// [`detect_batch`](crate::detect_batch), or
/// [`ScanConfiguration::custom_scan`](crate::ScanConfiguration::custom_scan).
#[derive(Debug)]
pub enum CoreError {
    /// The path is missing, unreadable, or not a regular file.
    FileAccess(io::Error),
    /// A read or seek failed mid-scan.
    IoError(io::Error),
    /// A tag's header or size field did not match its format's encoding.
    /// Never surfaced to callers; recorded here only so strategies share
    /// one vocabulary for what they log.
    MalformedTag(&'static str),
    /// `ScanConfiguration::custom_scan` was given an empty or null format list.
    InvalidArgument(&'static str),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CoreError::FileAccess(err) => write!(f, "file access error: {}", err),
            CoreError::IoError(err) => write!(f, "io error: {}", err),
            CoreError::MalformedTag(msg) => write!(f, "malformed tag: {}", msg),
            CoreError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl Error for CoreError {}

pub(crate) type CoreResult<T> = Result<T, CoreError>;
