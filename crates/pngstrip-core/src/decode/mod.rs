//! Per-chunk metadata decoders.
//!
//! Every stripped chunk produces exactly one [`DecodedReport`]. Decoders
//! return `Result<DecodedReport, SegmentError>`; [`decode_segment`] turns
//! errors into placeholder text so a bad chunk never aborts the walk.

mod ancillary;
mod text;

use crate::container::ChunkType;
use crate::error::SegmentError;
use crate::exif;
use tracing::{debug, trace};

pub use ancillary::{decode_exif, decode_iccp, decode_phys, decode_time};
pub use text::{decode_itxt, decode_text, decode_ztxt};

/// Report shown when an `eXIf` chunk contains no recognized tags
pub const EXIF_FALLBACK: &str = "exif data present (no recognized tags)";

/// Marker substituted for text that could not be inflated
pub const DECOMPRESSION_FAILED: &str = "(decompression failed)";

/// Human-readable description of one removed chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedReport {
    /// A single line of text
    PlainText(String),
    /// An ordered list of lines
    List(Vec<String>),
    /// Ordered key/value rows
    KeyValueTable(Vec<(String, String)>),
}

impl DecodedReport {
    /// Creates a plain text report
    pub fn text(s: impl Into<String>) -> Self {
        Self::PlainText(s.into())
    }

    /// Returns true for a list whose every entry reads as `key: value`
    pub fn is_key_value_list(&self) -> bool {
        match self {
            DecodedReport::List(items) => items.iter().all(|item| item.contains(": ")),
            _ => false,
        }
    }

    /// Rows for table-style rendering, if this report has a tabular shape.
    ///
    /// Lists are split at the first `": "`; anything after it, further
    /// separators included, is the value.
    pub fn as_rows(&self) -> Option<Vec<(&str, &str)>> {
        match self {
            DecodedReport::KeyValueTable(rows) => {
                Some(rows.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
            }
            DecodedReport::List(items) if self.is_key_value_list() => Some(
                items
                    .iter()
                    .filter_map(|item| item.split_once(": "))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// The fixed set of metadata chunk types this crate knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    /// `tEXt`
    Text,
    /// `zTXt`
    CompressedText,
    /// `iTXt`
    InternationalText,
    /// `tIME`
    Time,
    /// `pHYs`
    PhysicalDimensions,
    /// `iCCP`
    ColorProfile,
    /// `eXIf`
    Exif,
}

impl MetadataKind {
    /// All kinds, in the order they are listed in the default strip set
    pub const ALL: [MetadataKind; 7] = [
        MetadataKind::Text,
        MetadataKind::CompressedText,
        MetadataKind::InternationalText,
        MetadataKind::Time,
        MetadataKind::PhysicalDimensions,
        MetadataKind::ColorProfile,
        MetadataKind::Exif,
    ];

    /// Classify a chunk type
    pub fn from_chunk_type(chunk_type: ChunkType) -> Option<Self> {
        match chunk_type {
            ChunkType::TEXT => Some(MetadataKind::Text),
            ChunkType::ZTXT => Some(MetadataKind::CompressedText),
            ChunkType::ITXT => Some(MetadataKind::InternationalText),
            ChunkType::TIME => Some(MetadataKind::Time),
            ChunkType::PHYS => Some(MetadataKind::PhysicalDimensions),
            ChunkType::ICCP => Some(MetadataKind::ColorProfile),
            ChunkType::EXIF => Some(MetadataKind::Exif),
            _ => None,
        }
    }

    /// The chunk type tag for this kind
    pub fn chunk_type(self) -> ChunkType {
        match self {
            MetadataKind::Text => ChunkType::TEXT,
            MetadataKind::CompressedText => ChunkType::ZTXT,
            MetadataKind::InternationalText => ChunkType::ITXT,
            MetadataKind::Time => ChunkType::TIME,
            MetadataKind::PhysicalDimensions => ChunkType::PHYS,
            MetadataKind::ColorProfile => ChunkType::ICCP,
            MetadataKind::Exif => ChunkType::EXIF,
        }
    }

    /// Run the decoder for this kind
    pub fn decode(
        self,
        payload: &[u8],
        inflate_limit: usize,
    ) -> Result<DecodedReport, SegmentError> {
        match self {
            MetadataKind::Text => decode_text(payload),
            MetadataKind::CompressedText => decode_ztxt(payload, inflate_limit),
            MetadataKind::InternationalText => decode_itxt(payload, inflate_limit),
            MetadataKind::Time => decode_time(payload),
            MetadataKind::PhysicalDimensions => decode_phys(payload),
            MetadataKind::ColorProfile => decode_iccp(payload),
            MetadataKind::Exif => decode_exif(payload),
        }
    }
}

/// Decode one stripped chunk. Never fails.
pub fn decode_segment(chunk_type: ChunkType, payload: &[u8], inflate_limit: usize) -> DecodedReport {
    let Some(kind) = MetadataKind::from_chunk_type(chunk_type) else {
        trace!("No decoder for {}, reporting size only", chunk_type);
        return DecodedReport::PlainText(format!("size: {} bytes", payload.len()));
    };

    match kind.decode(payload, inflate_limit) {
        Ok(report) => report,
        Err(e) => {
            debug!("Failed to decode {} chunk: {}", chunk_type, e);
            DecodedReport::PlainText(e.placeholder())
        }
    }
}

/// Position of the first NUL at or after `start`
pub(crate) fn find_nul(data: &[u8], start: usize) -> Option<usize> {
    data.get(start..)?
        .iter()
        .position(|&b| b == 0)
        .map(|i| start + i)
}

impl From<exif::ExifError> for DecodedReport {
    fn from(err: exif::ExifError) -> Self {
        DecodedReport::PlainText(err.to_string())
    }
}
