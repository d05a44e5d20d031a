//! Error types for mapkv.

use std::fmt;

/// The main error type for mapkv operations.
#[derive(Debug)]
pub enum Error {
    /// A lock was poisoned (internal error)
    LockPoisoned,

    /// I/O error
    Io(std::io::Error),

    /// The store path cannot be used
    InvalidPath(String),

    /// The backing file could not be created or opened read-write
    FileOpen(String),

    /// The backing file could not be resized to the requested capacity
    Resize(String),

    /// The memory mapping could not be established
    Map(String),

    /// The persisted log disagrees with its header or capacity
    CorruptLog(String),

    /// An entry cannot be accommodated even after growing to the
    /// configured maximum capacity
    CapacityExceeded(String),

    /// A value could not be encoded or decoded by the typed layer
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LockPoisoned => write!(f, "Lock poisoned"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidPath(msg) => write!(f, "Invalid path: {}", msg),
            Error::FileOpen(msg) => write!(f, "Failed to open store file: {}", msg),
            Error::Resize(msg) => write!(f, "Failed to resize store file: {}", msg),
            Error::Map(msg) => write!(f, "Failed to map store file: {}", msg),
            Error::CorruptLog(msg) => write!(f, "Corrupt record log: {}", msg),
            Error::CapacityExceeded(msg) => write!(f, "Capacity exceeded: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized `Result` type for mapkv operations.
pub type Result<T> = std::result::Result<T, Error>;
