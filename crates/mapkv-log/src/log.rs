//! The record log: an append-only frame sequence behind a running-total
//! header, living inside a [`MappedRegion`].

use crate::frame;
use crate::region::MappedRegion;
use mapkv_core::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Byte length of the region header holding `total_written_bytes`.
pub const HEADER_LEN: u64 = 8;

/// Append-only log of key/value frames over a memory-mapped region.
///
/// The first 8 bytes of the region hold `total_written_bytes`: the byte
/// length of every frame written after the header. The log keeps an
/// in-memory mirror of that counter and writes it through on every
/// mutation, so the persisted header always matches the frames on disk.
pub struct RecordLog {
    region: MappedRegion,
    total: u64,
}

impl RecordLog {
    /// Open or create the log file at `path` with the given capacity.
    ///
    /// Reads `total_written_bytes` from the header and validates that it
    /// fits below the capacity; a header claiming more bytes than the
    /// region can hold is reported as `Error::CorruptLog`.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        if (capacity as u64) < HEADER_LEN {
            return Err(Error::Resize(format!(
                "capacity {} cannot hold the {}-byte header",
                capacity, HEADER_LEN
            )));
        }

        let region = MappedRegion::open(path, capacity)?;
        let total = region.read_u64_at(0)?;

        if HEADER_LEN.checked_add(total).filter(|end| *end <= capacity as u64).is_none() {
            return Err(Error::CorruptLog(format!(
                "header claims {} written bytes but capacity is {}",
                total, capacity
            )));
        }

        Ok(Self { region, total })
    }

    /// Total capacity of the backing region in bytes.
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.region.path()
    }

    /// The persisted `total_written_bytes` counter.
    pub fn total_written(&self) -> u64 {
        self.total
    }

    /// Bytes still available for frames below the capacity.
    pub fn remaining(&self) -> u64 {
        self.region.capacity() as u64 - HEADER_LEN - self.total
    }

    /// Append one frame and advance the header by exactly its length.
    ///
    /// The caller decides whether the frame fits (compacting or growing
    /// first if it does not); the log re-verifies the bounds so an
    /// overfull append fails instead of writing past the region.
    pub fn append(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let len = frame::encoded_len(key, value);
        if len > self.remaining() {
            return Err(Error::CorruptLog(format!(
                "frame of {} bytes exceeds the {} bytes remaining",
                len,
                self.remaining()
            )));
        }

        frame::write_frame(&mut self.region, HEADER_LEN + self.total, key, value)?;
        self.total += len;
        self.region.write_u64_at(0, self.total)
    }

    /// Lazily scan all frames, in file order.
    ///
    /// The iterator is finite and one-shot: it walks from offset 8 until
    /// the consumed byte count reaches `total_written_bytes`, and fuses
    /// after yielding the first error.
    pub fn scan(&self) -> Frames<'_> {
        Frames {
            region: &self.region,
            offset: HEADER_LEN,
            limit: HEADER_LEN + self.total,
            done: false,
        }
    }

    /// Rewrite the whole region from `entries`, discarding everything else.
    ///
    /// Zeroes the region, resets the header to 0 and appends one fresh
    /// frame per entry. Entry order is whatever the iterator yields;
    /// running the rewrite twice with the same entries leaves reads
    /// unchanged.
    pub fn rewrite<'a, I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        self.region.zero();
        self.total = 0;

        let mut frames = 0usize;
        for (key, value) in entries {
            self.append(key, value)?;
            frames += 1;
        }

        debug!(
            frames,
            total_bytes = self.total,
            capacity = self.region.capacity(),
            "rewrote record log"
        );
        Ok(())
    }

    /// Grow the backing region to `new_capacity` bytes.
    ///
    /// The log's content is not carried over logically; the caller must
    /// rewrite immediately after growing.
    pub fn grow(&mut self, new_capacity: usize) -> Result<()> {
        self.region.grow(new_capacity)?;
        debug!(capacity = new_capacity, "grew record log region");
        Ok(())
    }

    /// Flush the mapped region to the backing file.
    pub fn flush(&self) -> Result<()> {
        self.region.flush()
    }
}

/// Lazy iterator over the frames of a [`RecordLog`].
///
/// Yields `(key, value)` pairs in file order. Fuses after the first
/// decode error.
pub struct Frames<'a> {
    region: &'a MappedRegion,
    offset: u64,
    limit: u64,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.limit {
            self.done = true;
            return None;
        }

        match frame::read_frame(self.region, self.offset, self.limit) {
            Ok((key, value, next)) => {
                self.offset = next;
                Some(Ok((key, value)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
