// Integration tests for the record log: append, scan, rewrite, grow

mod common;

use common::LogTestFixture;
use mapkv_core::Result;
use mapkv_log::RecordLog;

#[test]
fn test_append_then_scan() {
    let fixture = LogTestFixture::new();

    let mut log = RecordLog::open(fixture.path(), 256).expect("Failed to open log");
    log.append("name", b"Alice").expect("Failed to append");
    log.append("city", b"Berlin").expect("Failed to append");

    let frames: Vec<_> = log
        .scan()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to scan");

    assert_eq!(
        frames,
        vec![
            ("name".to_string(), b"Alice".to_vec()),
            ("city".to_string(), b"Berlin".to_vec()),
        ]
    );
}

#[test]
fn test_file_sized_to_capacity() {
    let fixture = LogTestFixture::new();

    let _log = RecordLog::open(fixture.path(), 512).expect("Failed to open log");
    assert_eq!(fixture.file_len(), 512);
}

#[test]
fn test_duplicate_keys_kept_until_rewrite() {
    let fixture = LogTestFixture::new();

    let mut log = RecordLog::open(fixture.path(), 256).expect("Failed to open log");
    for value in [b"1", b"2", b"3"] {
        log.append("counter", value).expect("Failed to append");
    }

    // All three frames stay on disk until a rewrite discards the stale ones.
    assert_eq!(log.scan().count(), 3);

    log.rewrite([("counter", b"3".as_slice())])
        .expect("Failed to rewrite");

    let frames: Vec<_> = log
        .scan()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to scan");
    assert_eq!(frames, vec![("counter".to_string(), b"3".to_vec())]);
}

#[test]
fn test_rewrite_is_idempotent() {
    let fixture = LogTestFixture::new();

    let mut log = RecordLog::open(fixture.path(), 256).expect("Failed to open log");
    let entries = [("a", b"1".as_slice()), ("b", b"2".as_slice())];

    log.rewrite(entries).expect("Failed to rewrite");
    let first_total = log.total_written();

    log.rewrite(entries).expect("Failed to rewrite again");
    assert_eq!(log.total_written(), first_total);

    let mut frames: Vec<_> = log
        .scan()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to scan");
    frames.sort();
    assert_eq!(
        frames,
        vec![
            ("a".to_string(), b"1".to_vec()),
            ("b".to_string(), b"2".to_vec()),
        ]
    );
}

#[test]
fn test_grow_doubles_file_and_keeps_entries_through_rewrite() {
    let fixture = LogTestFixture::new();

    let mut log = RecordLog::open(fixture.path(), 64).expect("Failed to open log");
    log.append("k", b"v").expect("Failed to append");

    log.grow(128).expect("Failed to grow");
    log.rewrite([("k", b"v".as_slice())])
        .expect("Failed to rewrite");

    assert_eq!(fixture.file_len(), 128);
    let frames: Vec<_> = log
        .scan()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to scan");
    assert_eq!(frames, vec![("k".to_string(), b"v".to_vec())]);
}

#[test]
fn test_empty_value_frames() {
    let fixture = LogTestFixture::new();

    let mut log = RecordLog::open(fixture.path(), 64).expect("Failed to open log");
    log.append("flag", b"").expect("Failed to append");

    let frames: Vec<_> = log
        .scan()
        .collect::<Result<Vec<_>>>()
        .expect("Failed to scan");
    assert_eq!(frames, vec![("flag".to_string(), Vec::new())]);
}
