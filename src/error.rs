//! Error types for ipxdb.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for ipxdb operations.
///
/// A search that exhausts its bucket without a match is not an error;
/// it is reported as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed dotted-decimal IPv4 address
    #[error("invalid ip address `{0}`")]
    InvalidAddress(String),

    /// xdb file could not be opened
    #[error("failed to open xdb file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Seek to an offset failed
    #[error("failed to seek to offset {offset}: {source}")]
    Seek {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// Read at an offset failed
    #[error("failed to read {len} bytes at offset {offset}: {source}")]
    Read {
        offset: u64,
        len: u32,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes available than requested
    #[error("short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Pre-loaded vector index has the wrong size
    #[error("invalid vector index size: expected {expected}, got {actual}")]
    InvalidVectorIndex { expected: usize, actual: usize },

    /// Unknown cache policy name
    #[error("invalid cache policy: {0}")]
    InvalidPolicy(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was caused by a failed or truncated read.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            Error::Seek { .. } | Error::Read { .. } | Error::ShortRead { .. }
        )
    }
}

/// Result type alias for ipxdb operations.
pub type Result<T> = std::result::Result<T, Error>;
