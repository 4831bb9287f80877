//! Error types for grid construction, serialization, and caching.

use thiserror::Error;

use crate::size::GridSize;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur while building, serializing, or loading a grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Array lengths do not match the grid dimensions.
    #[error("array length mismatch: size {size:?} requires {expected} entries, got {got}")]
    LengthMismatch {
        /// The grid dimensions.
        size: GridSize,
        /// Expected entry count (`size.volume()`).
        expected: u64,
        /// Actual entry count supplied.
        got: usize,
    },

    /// Serialized data uses a schema version newer than this build understands.
    #[error("unsupported schema version {version} (latest known is {latest})")]
    UnsupportedVersion {
        /// Version tag found in the stream.
        version: u32,
        /// Latest version this build can read.
        latest: u32,
    },

    /// Serialized stream ended before all expected fields were read.
    #[error("unexpected end of stream while reading {field}")]
    UnexpectedEof {
        /// Name of the field being read when the stream ended.
        field: &'static str,
    },

    /// Invalid serialized content (corrupt field encoding).
    #[error("invalid serialized content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
