//! # mapkv Core
//!
//! Core types for the mapkv embedded key-value store: the error taxonomy
//! shared by every layer, and the byte-codec capability traits that turn
//! application values into the opaque byte sequences the engine persists.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;

pub use codec::{FromBytes, ToBytes};
pub use error::{Error, Result};
