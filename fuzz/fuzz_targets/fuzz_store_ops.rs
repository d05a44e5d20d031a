#![no_main]

use libfuzzer_sys::fuzz_target;
use mapkv::{Store, StoreConfig};

fuzz_target!(|data: &[u8]| {
    // Derive key/value sizes from the input
    if data.len() < 4 {
        return;
    }

    let key_len = u16::from_le_bytes([data[0], data[1]]) as usize % 512;
    let value_len = u16::from_le_bytes([data[2], data[3]]) as usize % 512;

    if data.len() < 4 + key_len + value_len {
        return;
    }

    let key_bytes = &data[4..4 + key_len];
    let value = &data[4 + key_len..4 + key_len + value_len];

    let key = match std::str::from_utf8(key_bytes) {
        Ok(k) => k,
        Err(_) => return,
    };

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("fuzz.db");

    // A tiny initial capacity exercises compaction and growth constantly
    let config = StoreConfig {
        initial_capacity: 64,
        ..Default::default()
    };

    if let Ok(store) = Store::open_with_config(&path, config) {
        store.put(key, value).expect("put failed");
        assert_eq!(store.get(key).expect("get failed").as_deref(), Some(value));

        // Update must win over the first write
        store.put(key, b"updated").expect("update failed");
        assert_eq!(
            store.get(key).expect("get failed"),
            Some(b"updated".to_vec())
        );

        assert!(store.delete(key).expect("delete failed"));
        assert_eq!(store.get(key).expect("get failed"), None);
    }
});
