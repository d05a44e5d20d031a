//! File-backed memory-mapped region.
//!
//! Owns the lifetime of the mapping: open-or-create, growth by remapping,
//! and bounds-checked byte access. Every read or write is validated against
//! the region's capacity before it touches the mapping; an out-of-range
//! access reports `Error::CorruptLog` instead of writing wild.

use mapkv_core::{Error, Result};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// A contiguous byte buffer of fixed capacity, backed by a file of exactly
/// that many bytes through a shared memory mapping.
pub struct MappedRegion {
    file: File,
    mmap: MmapMut,
    capacity: usize,
    path: PathBuf,
}

impl MappedRegion {
    /// Open or create the backing file, size it to exactly `capacity` bytes
    /// and establish a shared read-write mapping over it.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidPath("empty path".to_string()));
        }
        let path = path.to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|e| Error::FileOpen(format!("{}: {}", path.display(), e)))?;

        file.set_len(capacity as u64).map_err(|e| {
            Error::Resize(format!("{} to {} bytes: {}", path.display(), capacity, e))
        })?;

        let mmap = unsafe { MmapOptions::new().len(capacity).map_mut(&file) }
            .map_err(|e| Error::Map(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            file,
            mmap,
            capacity,
            path,
        })
    }

    /// Grow the region to `new_capacity` bytes.
    ///
    /// The file is extended and a fresh mapping replaces the old one. The
    /// bytes already in the file are carried over physically, but callers
    /// treat a grown region as unpopulated and rewrite it immediately.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity {
            return Err(Error::Resize(format!(
                "cannot grow region from {} to {} bytes",
                self.capacity, new_capacity
            )));
        }

        self.file.set_len(new_capacity as u64).map_err(|e| {
            Error::Resize(format!(
                "{} to {} bytes: {}",
                self.path.display(),
                new_capacity,
                e
            ))
        })?;

        self.mmap = unsafe { MmapOptions::new().len(new_capacity).map_mut(&self.file) }
            .map_err(|e| Error::Map(format!("{}: {}", self.path.display(), e)))?;
        self.capacity = new_capacity;

        Ok(())
    }

    /// Total capacity of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate that `len` bytes at `offset` lie inside the region.
    fn range(&self, offset: u64, len: usize) -> Result<Range<usize>> {
        let end = offset.checked_add(len as u64).filter(|e| *e <= self.capacity as u64);
        match end {
            Some(end) => Ok(offset as usize..end as usize),
            None => Err(Error::CorruptLog(format!(
                "access of {} bytes at offset {} exceeds capacity {}",
                len, offset, self.capacity
            ))),
        }
    }

    /// Read `len` bytes at `offset`.
    pub fn read_at(&self, offset: u64, len: usize) -> Result<&[u8]> {
        let range = self.range(offset, len)?;
        Ok(&self.mmap[range])
    }

    /// Write `bytes` at `offset`.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        let range = self.range(offset, bytes.len())?;
        self.mmap[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Read a little-endian u64 at `offset`.
    pub fn read_u64_at(&self, offset: u64) -> Result<u64> {
        let bytes = self.read_at(offset, 8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    /// Write a little-endian u64 at `offset`.
    pub fn write_u64_at(&mut self, offset: u64, value: u64) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    /// Zero the entire region.
    pub fn zero(&mut self) {
        self.mmap[..].fill(0);
    }

    /// Flush the mapping to the backing file.
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush().map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_of_capacity() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("region.map");

        let region = MappedRegion::open(&path, 128).expect("Failed to open region");
        assert_eq!(region.capacity(), 128);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 128);
    }

    #[test]
    fn test_open_empty_path_fails() {
        let result = MappedRegion::open("", 128);
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut region =
            MappedRegion::open(dir.path().join("region.map"), 64).expect("Failed to open");

        region.write_at(10, b"hello").expect("Failed to write");
        assert_eq!(region.read_at(10, 5).unwrap(), b"hello");

        region.write_u64_at(0, 42).expect("Failed to write header");
        assert_eq!(region.read_u64_at(0).unwrap(), 42);
    }

    #[test]
    fn test_out_of_bounds_access_fails() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut region =
            MappedRegion::open(dir.path().join("region.map"), 16).expect("Failed to open");

        assert!(matches!(
            region.write_at(10, b"too long"),
            Err(Error::CorruptLog(_))
        ));
        assert!(matches!(region.read_at(16, 1), Err(Error::CorruptLog(_))));
        // Offset near u64::MAX must not wrap around the bounds check.
        assert!(matches!(
            region.read_at(u64::MAX - 2, 8),
            Err(Error::CorruptLog(_))
        ));
    }

    #[test]
    fn test_grow_extends_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("region.map");
        let mut region = MappedRegion::open(&path, 64).expect("Failed to open");

        region.grow(128).expect("Failed to grow");
        assert_eq!(region.capacity(), 128);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 128);

        // The grown tail is addressable.
        region.write_at(120, b"tail").expect("Failed to write tail");
        assert_eq!(region.read_at(120, 4).unwrap(), b"tail");
    }

    #[test]
    fn test_grow_refuses_shrink() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut region =
            MappedRegion::open(dir.path().join("region.map"), 64).expect("Failed to open");

        assert!(matches!(region.grow(64), Err(Error::Resize(_))));
        assert!(matches!(region.grow(32), Err(Error::Resize(_))));
    }

    #[test]
    fn test_zero_clears_content() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut region =
            MappedRegion::open(dir.path().join("region.map"), 32).expect("Failed to open");

        region.write_at(0, &[0xff; 32]).expect("Failed to write");
        region.zero();
        assert_eq!(region.read_at(0, 32).unwrap(), &[0u8; 32]);
    }

    #[test]
    fn test_contents_visible_after_reopen() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("region.map");

        {
            let mut region = MappedRegion::open(&path, 64).expect("Failed to open");
            region.write_at(8, b"persisted").expect("Failed to write");
            region.flush().expect("Failed to flush");
        }

        let region = MappedRegion::open(&path, 64).expect("Failed to reopen");
        assert_eq!(region.read_at(8, 9).unwrap(), b"persisted");
    }
}
