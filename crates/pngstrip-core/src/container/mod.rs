//! PNG container walking and reassembly.
//!
//! ## Algorithm Overview
//!
//! 1. Verify the 8-byte signature
//! 2. Walk chunks in byte order, bounds-checking every declared length
//! 3. Decode chunks whose type is in the [`StripSet`] and drop their bytes
//! 4. Copy every other chunk verbatim, CRC included
//!
//! The output is the signature followed by the kept chunks in their
//! original order. A bad signature or a truncated chunk aborts the walk;
//! a chunk that fails to decode only degrades its own report.
//!
//! ## Example
//!
//! ```no_run
//! use pngstrip_core::container::{split_and_decode, StripSet};
//!
//! let data = std::fs::read("photo.png")?;
//! let output = split_and_decode(&data, &StripSet::default())?;
//! for (chunk_type, report) in &output.reports {
//!     println!("[{}] {:?}", chunk_type, report);
//! }
//! std::fs::write("photo_checked.png", &output.kept)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod chunk;

use crate::decode::{decode_segment, DecodedReport, MetadataKind};
use crate::error::{Error, Result};
use crate::inflate::DEFAULT_INFLATE_LIMIT;
use tracing::{debug, trace};

pub use chunk::{
    has_signature, read_segment, ChunkType, Segment, SegmentIter, CHUNK_CRC_SIZE,
    CHUNK_HEADER_SIZE, PNG_SIGNATURE,
};

#[cfg(test)]
pub(crate) use chunk::encode_chunk;

/// The set of chunk types classified as metadata and removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripSet {
    types: Vec<ChunkType>,
}

impl Default for StripSet {
    fn default() -> Self {
        Self {
            types: MetadataKind::ALL.iter().map(|k| k.chunk_type()).collect(),
        }
    }
}

impl StripSet {
    /// Creates the default strip set (`tEXt zTXt iTXt tIME pHYs iCCP eXIf`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a strip set that removes nothing
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Adds a chunk type to strip
    pub fn strip(mut self, chunk_type: ChunkType) -> Self {
        if !self.contains(chunk_type) {
            self.types.push(chunk_type);
        }
        self
    }

    /// Removes a chunk type from the set so it is kept verbatim
    pub fn keep(mut self, chunk_type: ChunkType) -> Self {
        self.types.retain(|t| *t != chunk_type);
        self
    }

    /// Returns true if chunks of this type are removed
    pub fn contains(&self, chunk_type: ChunkType) -> bool {
        self.types.contains(&chunk_type)
    }

    /// Iterates over the stripped types
    pub fn iter(&self) -> impl Iterator<Item = ChunkType> + '_ {
        self.types.iter().copied()
    }
}

/// Configuration for the stripper
#[derive(Debug, Clone)]
pub struct StripperConfig {
    /// Chunk types to decode and remove
    pub strip_set: StripSet,
    /// Maximum inflated size of a single compressed text chunk
    pub max_inflated_size: usize,
}

impl Default for StripperConfig {
    fn default() -> Self {
        Self {
            strip_set: StripSet::default(),
            max_inflated_size: DEFAULT_INFLATE_LIMIT,
        }
    }
}

impl StripperConfig {
    /// Creates a new stripper config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strip set
    pub fn strip_set(mut self, strip_set: StripSet) -> Self {
        self.strip_set = strip_set;
        self
    }

    /// Sets the inflated size cap for compressed text
    pub fn max_inflated_size(mut self, size: usize) -> Self {
        self.max_inflated_size = size;
        self
    }
}

/// Result of a walk: the cleaned container and one report per removed chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    /// Signature plus every kept chunk, in input order
    pub kept: Vec<u8>,
    /// `(chunk type, report)` for each removed chunk, in input order
    pub reports: Vec<(ChunkType, DecodedReport)>,
}

impl SplitOutput {
    /// Returns the cleaned container bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.kept
    }

    /// Returns true if nothing was removed
    pub fn is_clean(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Walks a PNG, decoding and removing metadata chunks
#[derive(Debug, Clone, Default)]
pub struct Stripper {
    config: StripperConfig,
}

impl Stripper {
    /// Creates a new stripper with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new stripper with custom configuration
    pub fn with_config(config: StripperConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &StripperConfig {
        &self.config
    }

    /// Split `data` into kept bytes and reports for the removed chunks
    pub fn strip(&self, data: &[u8]) -> Result<SplitOutput> {
        let mut kept = Vec::with_capacity(data.len());
        let mut reports = Vec::new();

        debug!("Starting walk of {} bytes", data.len());

        let segments = SegmentIter::new(data)?;
        kept.extend_from_slice(&PNG_SIGNATURE);

        for segment in segments {
            let segment = segment?;
            let chunk_type = segment.chunk_type;

            if self.config.strip_set.contains(chunk_type) {
                trace!(
                    "Stripping {} #{} ({} bytes at {})",
                    chunk_type,
                    segment.position,
                    segment.declared_length,
                    segment.range.start
                );
                let report =
                    decode_segment(chunk_type, segment.payload, self.config.max_inflated_size);
                reports.push((chunk_type, report));
            } else {
                trace!("Keeping {} #{}", chunk_type, segment.position);
                kept.extend_from_slice(segment.as_bytes());
            }
        }

        debug!(
            "Walk complete: removed {} chunks, {} -> {} bytes",
            reports.len(),
            data.len(),
            kept.len()
        );
        Ok(SplitOutput { kept, reports })
    }
}

/// Split `data` using the given strip set and default limits
pub fn split_and_decode(data: &[u8], strip_set: &StripSet) -> Result<SplitOutput> {
    Stripper::with_config(StripperConfig::new().strip_set(strip_set.clone())).strip(data)
}

/// Read a file and strip it
///
/// This is a convenience function that reads the file and walks it.
pub fn strip_file(path: impl AsRef<std::path::Path>, config: StripperConfig) -> Result<SplitOutput> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;
    Stripper::with_config(config).strip(&data)
}
