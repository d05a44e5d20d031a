//! # mapkv Record Log
//!
//! The persistence core of mapkv: a file-backed memory-mapped region holding
//! an append-only sequence of length-prefixed key/value frames behind an
//! 8-byte running-total header.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of mapkv.**
//!
//! Users should depend on the main [`mapkv`](https://crates.io/crates/mapkv)
//! crate instead, which provides the stable public API. This crate's API may
//! change without notice between minor versions.
//!
//! ## Region layout
//!
//! ```text
//! offset 0..8   total_written_bytes (u64, little-endian)
//! offset 8..    frames, back to back: key_len(8) | value_len(8) | key | value
//! remainder     zero-filled padding to capacity
//! ```

pub mod frame;
pub mod log;
pub mod region;

pub use log::{Frames, RecordLog, HEADER_LEN};
pub use region::MappedRegion;
