//! Error types for the pngstrip-core library.
//!
//! Two layers of failure exist. [`Error`] covers faults that abort a whole
//! walk (bad signature, truncated chunk, I/O). [`SegmentError`] covers faults
//! local to one metadata chunk; the walker turns those into placeholder
//! reports and keeps going.

use crate::container::ChunkType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pngstrip operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for whole-input pngstrip operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The first 8 bytes are not the PNG signature
    #[error("invalid PNG signature")]
    InvalidSignature,

    /// A chunk's declared length runs past the end of the buffer
    #[error("truncated chunk at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedSegment {
        /// Byte offset of the chunk header
        offset: usize,
        /// Bytes the chunk claims to occupy
        needed: usize,
        /// Bytes remaining in the buffer from `offset`
        available: usize,
    },

    /// Both inflate attempts failed
    #[error("decompression failed: {details}")]
    DecompressionFailed {
        /// Description of the last failure
        details: String,
    },

    /// Inflated output grew past the configured limit
    #[error("inflated output exceeds limit of {limit} bytes")]
    InflateLimitExceeded {
        /// The configured limit in bytes
        limit: usize,
    },
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new truncated chunk error
    pub fn truncated_segment(offset: usize, needed: usize, available: usize) -> Self {
        Self::TruncatedSegment {
            offset,
            needed,
            available,
        }
    }

    /// Creates a new decompression error
    pub fn decompression_failed(details: impl Into<String>) -> Self {
        Self::DecompressionFailed {
            details: details.into(),
        }
    }

    /// Returns true if this error only affects a single chunk's report
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DecompressionFailed { .. } | Self::InflateLimitExceeded { .. }
        )
    }
}

/// Failure while decoding a single metadata chunk.
///
/// Never escapes the walker: see [`SegmentError::placeholder`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentError {
    /// A required delimiter or field is missing
    #[error("invalid {chunk} segment")]
    Invalid {
        /// Type of the offending chunk
        chunk: ChunkType,
    },

    /// A read ran past the end of the payload
    #[error("parse error (size: {size} bytes)")]
    Parse {
        /// Payload size in bytes
        size: usize,
    },
}

impl SegmentError {
    /// Creates a new invalid segment error
    pub fn invalid(chunk: ChunkType) -> Self {
        Self::Invalid { chunk }
    }

    /// Creates a new parse error for a payload of `size` bytes
    pub fn parse(size: usize) -> Self {
        Self::Parse { size }
    }

    /// Text shown in place of the decoded report
    pub fn placeholder(&self) -> String {
        self.to_string()
    }
}
