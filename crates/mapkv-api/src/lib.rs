//! # mapkv
//!
//! A minimal embedded key-value store that persists to a single
//! memory-mapped file: writes append length-prefixed frames to the mapped
//! region, reads are served from a full in-memory index, and the file
//! compacts itself and doubles in size as it fills.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mapkv::Store;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open a store backed by a single file (created if absent)
//!     let store = Store::open("./app.mapkv")?;
//!
//!     // Insert data
//!     store.put("user:1:name", b"Alice")?;
//!     store.put("user:1:email", b"alice@example.com")?;
//!
//!     // Retrieve data
//!     if let Some(name) = store.get("user:1:name")? {
//!         println!("Name: {}", String::from_utf8_lossy(&name));
//!     }
//!
//!     // Remove data
//!     store.delete("user:1:email")?;
//!
//!     // Content survives restarts via the mapped file
//!     Ok(())
//! }
//! ```
//!
//! ## Typed values
//!
//! The engine itself only stores opaque bytes; the typed helpers convert
//! at the boundary. Primitives use a fixed-width little-endian encoding,
//! structured values go through serde.
//!
//! ```rust,no_run
//! use mapkv::Store;
//!
//! let store = Store::open("./app.mapkv")?;
//! store.put_value("age", &31i64)?;
//! store.put_value("male", &true)?;
//! store.put_value("name", &String::from("Alice Zhang"))?;
//!
//! assert_eq!(store.get_value::<i64>("age")?, Some(31));
//! # Ok::<(), mapkv::Error>(())
//! ```
//!
//! ## Limitations
//!
//! A store assumes a single writer. The mapping is shared-memory-backed
//! but carries no file locking; two processes opening the same file
//! concurrently can corrupt it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// Re-export core types
pub use mapkv_core::{Error, FromBytes, Result, ToBytes};

// Record log components
pub use mapkv_log::{Frames, MappedRegion, RecordLog};

// Storage engine components
pub use mapkv_store::{Index, StoreConfig, StoreEngine, StoreStats};

pub mod logging;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The main store handle.
///
/// Thread-safe and cheap to clone; clones share the same engine.
///
/// # Examples
///
/// ```rust,no_run
/// use mapkv::Store;
///
/// let store = Store::open("./app.mapkv")?;
/// store.put("key", b"value")?;
///
/// // Data persists across restarts
/// drop(store);
/// let store = Store::open("./app.mapkv")?;
/// assert_eq!(store.get("key")?, Some(b"value".to_vec()));
/// # Ok::<(), mapkv::Error>(())
/// ```
#[derive(Clone)]
pub struct Store {
    engine: Arc<StoreEngine>,
}

impl Store {
    /// Opens or creates a store at the specified file path.
    ///
    /// Creates the backing file at 10 KiB if absent, maps it into memory
    /// and rebuilds the in-memory index from the persisted frames. Every
    /// failure mode (bad path, open, resize, mapping, corrupt content) is
    /// reported; an `Ok` store is fully functional.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let engine = StoreEngine::open(path)?;
        Ok(Store {
            engine: Arc::new(engine),
        })
    }

    /// Opens or creates a store with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - File path where the store's bytes live
    /// * `config` - Capacity and durability options
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let engine = StoreEngine::open_with_config(path, config)?;
        Ok(Store {
            engine: Arc::new(engine),
        })
    }

    /// Inserts or updates a key-value pair.
    ///
    /// The latest write for a key wins. An empty value is permitted.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.engine.put(key, value)
    }

    /// Retrieves the latest value for a key, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.engine.get(key)
    }

    /// Removes a key, returning whether it was present.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.engine.delete(key)
    }

    /// Flushes the mapped region to the backing file.
    pub fn sync(&self) -> Result<()> {
        self.engine.sync()
    }

    /// Returns storage statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        self.engine.stats()
    }

    /// Stores an encodable value (numeric primitives, booleans, text,
    /// raw buffers) under a key.
    pub fn put_value<T: ToBytes>(&self, key: &str, value: &T) -> Result<()> {
        self.engine.put(key, &value.to_bytes())
    }

    /// Retrieves a value stored with [`put_value`](Self::put_value).
    ///
    /// Returns `None` when the key is absent or the stored bytes do not
    /// decode as `T`.
    pub fn get_value<T: FromBytes>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.engine.get(key)?.and_then(|bytes| T::from_bytes(&bytes)))
    }

    /// Stores a serde-serializable value under a key.
    pub fn put_object<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes =
            bincode::serialize(value).map_err(|e| Error::Serialization(e.to_string()))?;
        self.engine.put(key, &bytes)
    }

    /// Retrieves a value stored with [`put_object`](Self::put_object).
    ///
    /// Returns `None` when the key is absent or the stored bytes do not
    /// deserialize as `T`.
    pub fn get_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.engine.get(key)? {
            Some(bytes) => Ok(bincode::deserialize(&bytes).ok()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_is_cloneable() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("store.db")).unwrap();

        let clone = store.clone();
        store.put("shared", b"yes").unwrap();

        assert_eq!(clone.get("shared").unwrap(), Some(b"yes".to_vec()));
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
