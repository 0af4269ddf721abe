#![no_main]

use std::fs;
use std::io::Write;
use std::path::Path;

use libfuzzer_sys::fuzz_target;
use musikr_core::{detect, ScanConfiguration};

const PATH: &str = "/tmp/musikr-core-fuzz.bin";

fuzz_target!(|data: &[u8]| {
    // The detection engine's only input surface is a filesystem path, so
    // write the fuzz bytes to a file and scan that.
    let path = Path::new(PATH);

    let mut file = fs::File::create(path).unwrap();
    file.write_all(data).unwrap();

    let _ = detect(path, &ScanConfiguration::full_scan());
});
