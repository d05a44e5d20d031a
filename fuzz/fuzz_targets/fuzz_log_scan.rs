#![no_main]

use libfuzzer_sys::fuzz_target;
use mapkv_log::RecordLog;

// Arbitrary file content must never panic the scan: every frame decode is
// bounds-checked, so the worst outcome is a CorruptLog error.
fuzz_target!(|data: &[u8]| {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("scan.map");
    std::fs::write(&path, data).expect("Failed to write input");

    let capacity = data.len().max(8);
    if let Ok(log) = RecordLog::open(&path, capacity) {
        for entry in log.scan() {
            if entry.is_err() {
                break;
            }
        }
    }
});
