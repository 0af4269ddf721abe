//! The detection orchestrator: resolves a [`ScanConfiguration`] into a
//! target format set, runs each needed strategy at most once, and filters
//! the combined results.

use std::path::Path;

use indexmap::IndexMap;

use crate::config::{ScanConfiguration, ScanMode};
use crate::err::CoreError;
use crate::file::TaggedFile;
use crate::format::TagFormat;
use crate::priority::{comfort_scan_priority, full_scan_priority};
use crate::region::Region;
use crate::strategy::strategies_for;

/// Resolves `config` into the ordered target format set for `path`, per
/// the scan mode: full scan uses the global priority order, comfort scan
/// looks up the file's extension, and custom scan uses the caller's list.
fn resolve_targets(path: &Path, config: &ScanConfiguration) -> Vec<TagFormat> {
    match config.mode() {
        ScanMode::FullScan => full_scan_priority(),
        ScanMode::ComfortScan => {
            let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
            comfort_scan_priority(extension)
        }
        ScanMode::CustomScan => config.custom_formats().to_vec(),
    }
}

/// Locates every metadata region in the file at `path` matching `config`.
///
/// Returns `Err(CoreError::FileAccess)` if the path cannot be opened;
/// otherwise always returns, possibly with an empty sequence.
pub fn detect<P: AsRef<Path>>(path: P, config: &ScanConfiguration) -> Result<Vec<Region>, CoreError> {
    let path = path.as_ref();
    let targets = resolve_targets(path, config);
    log::debug!("resolved {} target format(s) for {}", targets.len(), path.display());

    let mut file = TaggedFile::open(path)?;
    let buffers = match file.buffers() {
        Ok(buffers) => buffers,
        Err(err) => {
            log::error!("{}: i/o error reading head/tail buffers: {}", path.display(), err);
            return Ok(Vec::new());
        }
    };

    let strategies = strategies_for(&targets);
    let mut regions = Vec::new();

    for strategy in strategies {
        if strategy.can_detect(buffers.head(), buffers.tail()) {
            regions.extend(strategy.detect(&mut file, buffers.head(), buffers.tail()));
        }
    }

    regions.retain(|region| targets.contains(&region.format()));

    Ok(regions)
}

/// Runs [`detect`] over every path in `paths` with the same `config`,
/// isolating per-file failures: a file that cannot be opened contributes
/// an empty sequence rather than aborting the batch. Entries appear in
/// `paths` order.
pub fn detect_batch<P: AsRef<Path>>(paths: &[P], config: &ScanConfiguration) -> IndexMap<String, Vec<Region>> {
    let mut results = IndexMap::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();

        let regions = match detect(path, config) {
            Ok(regions) => regions,
            Err(err) => {
                log::warn!("detect_batch: skipping {}: {}", key, err);
                Vec::new()
            }
        };

        results.insert(key, regions);
    }

    results
}
