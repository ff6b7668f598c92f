//! # pngstrip-core
//!
//! A library for reporting and removing metadata chunks from PNG files.
//!
//! This crate provides the core functionality for:
//! - Walking the chunk structure of a PNG losslessly
//! - Decoding textual, timestamp, physical-size, ICC and Exif chunks
//! - Reassembling a PNG with those chunks removed
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`container`]: Chunk walking, classification and reassembly
//! - [`decode`]: Per-chunk decoders and the [`DecodedReport`] type
//! - [`exif`]: TIFF IFD decoding for `eXIf` chunks
//! - [`inflate`]: zlib text decoding with a raw-deflate fallback
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use pngstrip_core::{Stripper, DecodedReport};
//! use std::fs;
//!
//! let data = fs::read("photo.png")?;
//! let output = Stripper::new().strip(&data)?;
//!
//! for (chunk_type, report) in &output.reports {
//!     if let DecodedReport::PlainText(text) = report {
//!         println!("[{}] {}", chunk_type, text);
//!     }
//! }
//! fs::write("photo_checked.png", output.as_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod container;
pub mod decode;
pub mod error;
pub mod exif;
pub mod inflate;

// Re-export primary types for convenience
pub use container::{
    split_and_decode, strip_file, ChunkType, SplitOutput, StripSet, Stripper, StripperConfig,
    PNG_SIGNATURE,
};
pub use decode::{DecodedReport, MetadataKind};
pub use error::{Error, Result, SegmentError};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
