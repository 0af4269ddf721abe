//! `musikr-core` locates embedded metadata regions inside audio containers.
//!
//! Given a path to a file on disk, this crate reports the format, byte
//! offset, and byte length of every tag it can find, without parsing any
//! field inside those tags. A higher-level parsing layer is expected to
//! consume the [`Region`](region::Region) values this crate produces.

#![forbid(unsafe_code)]

mod core;

mod chunkwalk;
mod config;
mod detector;
mod err;
mod file;
mod format;
mod priority;
mod region;
mod strategies;
mod strategy;

pub use config::{ScanConfiguration, ScanMode};
pub use detector::{detect, detect_batch};
pub use err::CoreError;
pub use format::TagFormat;
pub use priority::{comfort_scan_priority, full_scan_priority};
pub use region::Region;

pub type Result<T> = std::result::Result<T, CoreError>;
