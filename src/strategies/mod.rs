//! One module per detection strategy family.

mod aiff;
mod ape;
mod asf;
mod dsd;
mod flac;
mod id3v1;
mod id3v2;
mod lyrics3;
mod matroska;
mod mp4;
mod riff;
mod tta;
mod vorbis;
mod wavpack;

pub(crate) use aiff::AiffStrategy;
pub(crate) use ape::ApeStrategy;
pub(crate) use asf::AsfStrategy;
pub(crate) use dsd::DsdStrategy;
pub(crate) use flac::FlacApplicationStrategy;
pub(crate) use id3v1::Id3v1Strategy;
pub(crate) use id3v2::Id3v2Strategy;
pub(crate) use lyrics3::Lyrics3Strategy;
pub(crate) use matroska::MatroskaStrategy;
pub(crate) use mp4::Mp4Strategy;
pub(crate) use riff::RiffStrategy;
pub(crate) use tta::TtaStrategy;
pub(crate) use vorbis::VorbisCommentStrategy;
pub(crate) use wavpack::WavPackStrategy;
