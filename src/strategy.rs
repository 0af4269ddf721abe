//! The `Strategy` abstraction (one per parser family) and the static
//! registry that maps a requested format to its strategy, deduplicating
//! strategies shared by several formats.

use crate::err::CoreResult;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::region::Region;
use crate::strategies::*;

/// A detection strategy covers a disjoint, non-empty subset of
/// [`TagFormat`]. It is constructed once, is stateless across calls (all
/// working state lives on the stack during `detect`), and is safe to share
/// across threads.
pub(crate) trait Strategy: Sync {
    /// The formats this strategy can report. Disjoint from every other
    /// strategy's set.
    fn supported_formats(&self) -> &'static [TagFormat];

    /// A fast, `O(1)`-in-file-length check over the head/tail buffers only.
    /// Used to skip a strategy's (possibly expensive) `detect` call when
    /// there is no chance of a match.
    fn can_detect(&self, head: &[u8], tail: &[u8]) -> bool;

    /// Performs the deep probe, reading from `file` as needed. Never
    /// propagates an error: internal I/O or parse failures are caught,
    /// logged, and yield an empty result.
    fn detect(&self, file: &mut TaggedFile, head: &[u8], tail: &[u8]) -> Vec<Region>;
}

/// Runs `probe`, catching any error it returns, logging it at the
/// appropriate level, and flattening it to an empty result. Every concrete
/// strategy's `detect` is a thin wrapper around this so the catch/log
/// policy from spec section 4.4 lives in one place.
pub(crate) fn run_catching(
    strategy_name: &'static str,
    probe: impl FnOnce() -> CoreResult<Vec<Region>>,
) -> Vec<Region> {
    match probe() {
        Ok(regions) => regions,
        Err(crate::err::CoreError::IoError(err)) => {
            log::error!("{}: i/o error during deep read: {}", strategy_name, err);
            Vec::new()
        }
        Err(crate::err::CoreError::MalformedTag(msg)) => {
            log::warn!("{}: malformed tag: {}", strategy_name, msg);
            Vec::new()
        }
        Err(other) => {
            log::warn!("{}: {}", strategy_name, other);
            Vec::new()
        }
    }
}

const STRATEGY_COUNT: usize = 14;

static ID3V1: Id3v1Strategy = Id3v1Strategy;
static ID3V2: Id3v2Strategy = Id3v2Strategy;
static APE: ApeStrategy = ApeStrategy;
static VORBIS: VorbisCommentStrategy = VorbisCommentStrategy;
static MP4: Mp4Strategy = Mp4Strategy;
static RIFF: RiffStrategy = RiffStrategy;
static AIFF: AiffStrategy = AiffStrategy;
static LYRICS3: Lyrics3Strategy = Lyrics3Strategy;
static ASF: AsfStrategy = AsfStrategy;
static FLAC_APPLICATION: FlacApplicationStrategy = FlacApplicationStrategy;
static MATROSKA: MatroskaStrategy = MatroskaStrategy;
static DSD: DsdStrategy = DsdStrategy;
static TTA: TtaStrategy = TtaStrategy;
static WAVPACK: WavPackStrategy = WavPackStrategy;

static STRATEGIES: [&(dyn Strategy + Sync); STRATEGY_COUNT] = [
    &ID3V1,
    &ID3V2,
    &APE,
    &VORBIS,
    &MP4,
    &RIFF,
    &AIFF,
    &LYRICS3,
    &ASF,
    &FLAC_APPLICATION,
    &MATROSKA,
    &DSD,
    &TTA,
    &WAVPACK,
];

fn strategy_index(format: TagFormat) -> usize {
    STRATEGIES
        .iter()
        .position(|s| s.supported_formats().contains(&format))
        .expect("every TagFormat variant must be covered by exactly one strategy")
}

/// Returns the ordered, deduplicated sequence of strategies covering at
/// least `formats`, preserving first-appearance order. Guarantees that a
/// single `detect`/`detect_batch` call invokes each strategy at most once.
pub(crate) fn strategies_for(formats: &[TagFormat]) -> Vec<&'static (dyn Strategy + Sync)> {
    let mut seen = [false; STRATEGY_COUNT];
    let mut result = Vec::with_capacity(STRATEGY_COUNT);

    for &format in formats {
        let idx = strategy_index(format);
        if !seen[idx] {
            seen[idx] = true;
            result.push(STRATEGIES[idx]);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_maps_to_a_strategy_that_supports_it() {
        for &format in TagFormat::ALL.iter() {
            let idx = strategy_index(format);
            assert!(STRATEGIES[idx].supported_formats().contains(&format));
        }
    }

    #[test]
    fn strategy_sets_are_disjoint() {
        for (i, a) in STRATEGIES.iter().enumerate() {
            for b in STRATEGIES.iter().skip(i + 1) {
                for format in a.supported_formats() {
                    assert!(!b.supported_formats().contains(format));
                }
            }
        }
    }

    #[test]
    fn strategies_for_deduplicates_and_preserves_order() {
        let formats = [TagFormat::Id3v23, TagFormat::Id3v1, TagFormat::Id3v24];
        let strategies = strategies_for(&formats);
        // Id3v23 and Id3v24 share the ID3v2 strategy; Id3v1 has its own.
        assert_eq!(strategies.len(), 2);
    }
}
