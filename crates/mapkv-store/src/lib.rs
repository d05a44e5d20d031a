//! # mapkv Storage Engine
//!
//! The storage engine for mapkv: an in-memory index over a memory-mapped
//! record log, with reactive compaction and capacity growth by doubling.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of mapkv.**
//!
//! Users should depend on the main [`mapkv`](https://crates.io/crates/mapkv)
//! crate instead, which provides the stable public API. This crate's API may
//! change without notice between minor versions.
//!
//! ## Write path
//!
//! ```text
//! put → index updated first → frame appended to the mapped log
//!            ↓ (log full)
//!       compacting rewrite from the index
//!            ↓ (still full)
//!       capacity doubled, rewrite against the grown region
//! ```
//!
//! Reads never touch the region: the index is a complete cache of the
//! effective disk content from the moment the startup scan finishes.

use mapkv_core::{Error, Result};
use mapkv_log::{frame, RecordLog, HEADER_LEN};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, warn};

pub mod index;

pub use index::Index;

/// Default initial capacity of the backing file (10 KiB).
const DEFAULT_INITIAL_CAPACITY: usize = 10 * 1024;

/// Default ceiling for capacity growth (1 GiB).
const DEFAULT_MAX_CAPACITY: usize = 1024 * 1024 * 1024;

/// Storage engine configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the backing file when first created
    pub initial_capacity: usize,
    /// Ceiling for capacity growth; writes that cannot fit below it fail
    pub max_capacity: usize,
    /// Flush the mapping to disk after every write
    pub sync_on_write: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            sync_on_write: false,
        }
    }
}

/// Mutable engine state guarded by a single lock.
///
/// The index and the log are two representations of the same data, kept
/// consistent by protocol: the index is updated first on every write, and
/// a failed disk write rolls the index entry back before the error is
/// reported.
struct Inner {
    log: RecordLog,
    index: Index,
    compactions: u64,
    growths: u64,
}

/// Storage engine: a full in-memory index over a memory-mapped record log.
///
/// All public operations serialize behind one lock, so a single instance
/// can be shared across threads. There is no cross-process coordination:
/// two processes mapping the same file concurrently can corrupt it.
pub struct StoreEngine {
    config: StoreConfig,
    inner: RwLock<Inner>,
}

impl StoreEngine {
    /// Open or create a store at the given path with default configuration
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open or create a store with custom configuration
    ///
    /// Maps the backing file and rebuilds the index from a full scan of
    /// the record log, later frames for a key overwriting earlier ones.
    /// An existing file larger than `initial_capacity` is mapped at its
    /// persisted size; capacity never shrinks. No disk write happens here.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref();

        let capacity = match std::fs::metadata(path) {
            Ok(meta) if meta.len() as usize > config.initial_capacity => meta.len() as usize,
            _ => config.initial_capacity,
        };

        let log = RecordLog::open(path, capacity)?;

        let mut index = Index::new();
        let mut recovered = 0usize;
        for entry in log.scan() {
            match entry {
                Ok((key, value)) => {
                    index.insert(&key, &value);
                    recovered += 1;
                }
                Err(Error::CorruptLog(msg)) => {
                    warn!(frames_recovered = recovered, "aborting reload: {}", msg);
                    return Err(Error::CorruptLog(format!(
                        "{}; recovered {} valid frames before the corrupt one",
                        msg, recovered
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            keys = index.len(),
            frames = recovered,
            capacity,
            "opened store"
        );

        Ok(Self {
            config,
            inner: RwLock::new(Inner {
                log,
                index,
                compactions: 0,
                growths: 0,
            }),
        })
    }

    /// Insert or update a key-value pair
    ///
    /// The index is updated before the region is touched; if the disk
    /// write fails the index entry is rolled back, so index and persisted
    /// content never diverge once an error is reported.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;

        let previous = inner.index.insert(key, value);

        if let Err(e) = Self::persist(&mut inner, &self.config, key, value) {
            match previous {
                Some(old) => {
                    inner.index.insert(key, &old);
                }
                None => {
                    inner.index.remove(key);
                }
            }
            return Err(e);
        }

        if self.config.sync_on_write {
            inner.log.flush()?;
        }

        Ok(())
    }

    /// Write the entry just inserted into the index out to the log,
    /// compacting and growing as needed.
    fn persist(inner: &mut Inner, config: &StoreConfig, key: &str, value: &[u8]) -> Result<()> {
        let needed = frame::encoded_len(key, value);
        if inner.log.remaining() >= needed {
            return inner.log.append(key, value);
        }

        // The index already contains the new entry, so a rewrite that fits
        // is the complete write: no further append needed afterwards.
        let live = HEADER_LEN + inner.index.live_bytes();
        if live <= inner.log.capacity() as u64 {
            debug!(
                live_bytes = live,
                capacity = inner.log.capacity(),
                "compacting to reclaim duplicate frames"
            );
            inner.compactions += 1;
            let Inner { log, index, .. } = &mut *inner;
            return log.rewrite(index.iter());
        }

        // Even a duplicate-free log cannot fit; double until it can. The
        // target is computed before the region is touched, so exceeding the
        // ceiling destroys nothing.
        let target = grown_capacity(inner.log.capacity(), live, config.max_capacity)?;
        debug!(
            from = inner.log.capacity(),
            to = target,
            "growing region"
        );
        inner.log.grow(target)?;
        inner.growths += 1;
        inner.compactions += 1;
        let Inner { log, index, .. } = &mut *inner;
        log.rewrite(index.iter())
    }

    /// Retrieve the latest value for a key
    ///
    /// Served entirely from the index; the mapped region is not read.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(inner.index.get(key).map(|v| v.to_vec()))
    }

    /// Remove a key, returning whether it was present
    ///
    /// The region is rewritten from the index so the key cannot resurface
    /// on reload.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let mut inner = self.inner.write().map_err(|_| Error::LockPoisoned)?;

        let previous = match inner.index.remove(key) {
            Some(v) => v,
            None => return Ok(false),
        };

        let result = {
            let Inner { log, index, .. } = &mut *inner;
            log.rewrite(index.iter())
        };
        if let Err(e) = result {
            inner.index.insert(key, &previous);
            return Err(e);
        }
        inner.compactions += 1;

        if self.config.sync_on_write {
            inner.log.flush()?;
        }

        Ok(true)
    }

    /// Flush the mapped region to the backing file
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        inner.log.flush()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let inner = self.inner.read().map_err(|_| Error::LockPoisoned)?;
        Ok(StoreStats {
            keys: inner.index.len(),
            live_bytes: inner.index.live_bytes(),
            total_written_bytes: inner.log.total_written(),
            capacity: inner.log.capacity(),
            compactions: inner.compactions,
            growths: inner.growths,
        })
    }
}

/// Smallest capacity reachable from `current` by doubling that holds
/// `live` bytes, or `CapacityExceeded` if that lies above `max`.
fn grown_capacity(current: usize, live: u64, max: usize) -> Result<usize> {
    let mut target = current;
    while (target as u64) < live {
        target = target
            .checked_mul(2)
            .filter(|t| *t <= max)
            .ok_or_else(|| {
                Error::CapacityExceeded(format!(
                    "{} live bytes cannot fit within the {} byte maximum capacity",
                    live, max
                ))
            })?;
    }
    Ok(target)
}

/// Storage statistics
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Number of keys currently stored
    pub keys: usize,
    /// Frame bytes a fully compacted log would occupy
    pub live_bytes: u64,
    /// Frame bytes currently written after the header, duplicates included
    pub total_written_bytes: u64,
    /// Capacity of the backing file in bytes
    pub capacity: usize,
    /// Compacting rewrites run since open
    pub compactions: u64,
    /// Capacity growths run since open
    pub growths: u64,
}
