//! Exif (TIFF IFD) decoding for `eXIf` chunks.
//!
//! ## Layout
//!
//! ```text
//! Bytes 0-1: Byte order ("II" little-endian, "MM" big-endian)
//! Bytes 2-3: Magic (42)
//! Bytes 4-7: Offset of the first IFD, relative to the start of the blob
//!
//! IFD:   u16 entry count, then `count` 12-byte entries
//! Entry: u16 tag | u16 type | u32 count | 4-byte value field
//! ```
//!
//! When `type_size * count <= 4` the value lives in the value field itself;
//! otherwise the value field holds an offset into the blob. Only the first
//! IFD is decoded.
//!
//! Values are rendered for ASCII, SHORT, LONG, UNDEFINED and single-component
//! RATIONAL / SRATIONAL entries. Any other entry keeps its tag but no value.

mod reader;
mod tags;

pub use reader::{format_rational, ByteOrder};
pub use tags::{tag_name, type_size, FieldType, TAG_NAMES};

use std::fmt::Write as FmtWrite;
use thiserror::Error;
use tracing::trace;

/// TIFF magic number following the byte-order marker
pub const TIFF_MAGIC: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of a single IFD entry in bytes
pub const IFD_ENTRY_SIZE: usize = 12;

/// Maximum number of bytes shown for `UNDEFINED` values
pub const UNDEFINED_DISPLAY_LIMIT: usize = 20;

/// Header-level faults; each becomes a one-line report
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifError {
    /// Blob too small to hold a TIFF header
    #[error("invalid exif header")]
    TooShort,

    /// Byte-order marker is neither "II" nor "MM"
    #[error("unknown header")]
    UnknownHeader,

    /// Magic number is not 42
    #[error("invalid magic")]
    InvalidMagic(u16),

    /// First IFD offset points at or past the end of the blob
    #[error("invalid offset")]
    InvalidOffset(u32),

    /// The entry count or a numeric value runs past the end of the blob
    #[error("read out of bounds at offset {0}")]
    OutOfBounds(usize),
}

/// Parsed TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the blob
    pub byte_order: ByteOrder,
    /// Offset of the first IFD
    pub first_ifd_offset: u32,
}

impl TiffHeader {
    /// Parse and validate the 8-byte header at the start of `blob`
    pub fn parse(blob: &[u8]) -> Result<Self, ExifError> {
        if blob.len() < TIFF_HEADER_SIZE {
            return Err(ExifError::TooShort);
        }

        let byte_order =
            ByteOrder::from_marker([blob[0], blob[1]]).ok_or(ExifError::UnknownHeader)?;

        let magic = byte_order.read_u16(blob, 2).ok_or(ExifError::TooShort)?;
        if magic != TIFF_MAGIC {
            return Err(ExifError::InvalidMagic(magic));
        }

        let first_ifd_offset = byte_order.read_u32(blob, 4).ok_or(ExifError::TooShort)?;
        if first_ifd_offset as usize >= blob.len() {
            return Err(ExifError::InvalidOffset(first_ifd_offset));
        }

        Ok(Self {
            byte_order,
            first_ifd_offset,
        })
    }
}

/// One IFD entry with its value resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag identifier
    pub tag_id: u16,
    /// Raw field type code
    pub value_type: u16,
    /// Number of components
    pub count: u32,
    /// Rendered value, `None` when it could not be resolved
    pub value: Option<String>,
}

impl TagEntry {
    /// Display name from the tag table
    pub fn name(&self) -> Option<&'static str> {
        tag_name(self.tag_id)
    }

    /// Render as `"name: value"`, or `"name (ID: 0xhex)"` when the value is absent.
    ///
    /// Returns `None` for tags outside the table.
    pub fn render(&self) -> Option<String> {
        let name = self.name()?;
        Some(match &self.value {
            Some(value) => format!("{}: {}", name, value),
            None => format!("{} (ID: 0x{:x})", name, self.tag_id),
        })
    }
}

/// Parse every entry of the first IFD.
///
/// A directory cut off between entries yields the entries that were fully
/// readable. An entry count or numeric value that lies past the end of the
/// blob is [`ExifError::OutOfBounds`].
pub fn parse_ifd(blob: &[u8]) -> Result<Vec<TagEntry>, ExifError> {
    let header = TiffHeader::parse(blob)?;
    let order = header.byte_order;
    let ifd_offset = header.first_ifd_offset as usize;

    let entry_count = order
        .read_u16(blob, ifd_offset)
        .ok_or(ExifError::OutOfBounds(ifd_offset))?;

    let mut entries = Vec::with_capacity(entry_count as usize);
    let mut offset = ifd_offset + 2;

    for _ in 0..entry_count {
        if offset + IFD_ENTRY_SIZE > blob.len() {
            trace!(
                "IFD truncated after {} of {} entries",
                entries.len(),
                entry_count
            );
            break;
        }

        let out_of_bounds = ExifError::OutOfBounds(offset);
        let tag_id = order.read_u16(blob, offset).ok_or(out_of_bounds)?;
        let value_type = order.read_u16(blob, offset + 2).ok_or(out_of_bounds)?;
        let count = order.read_u32(blob, offset + 4).ok_or(out_of_bounds)?;

        let value = resolve_value(blob, order, offset, value_type, count)?;
        entries.push(TagEntry {
            tag_id,
            value_type,
            count,
            value,
        });

        offset += IFD_ENTRY_SIZE;
    }

    Ok(entries)
}

/// Decode the first IFD into `"name: value"` strings for the known tags
pub fn decode_ifd(blob: &[u8]) -> Result<Vec<String>, ExifError> {
    Ok(parse_ifd(blob)?
        .iter()
        .filter_map(TagEntry::render)
        .collect())
}

/// Resolve and render the value of the entry at `entry_offset`.
///
/// `Ok(None)` means the entry has no displayable value.
fn resolve_value(
    blob: &[u8],
    order: ByteOrder,
    entry_offset: usize,
    value_type: u16,
    count: u32,
) -> Result<Option<String>, ExifError> {
    let size = type_size(value_type);
    let total = size as u64 * count as u64;
    let inline = total <= FieldType::INLINE_THRESHOLD;

    let data_offset = if inline {
        entry_offset + 8
    } else {
        order
            .read_u32(blob, entry_offset + 8)
            .ok_or(ExifError::OutOfBounds(entry_offset + 8))? as usize
    };
    if data_offset >= blob.len() {
        return Ok(None);
    }

    let Some(field_type) = FieldType::from_u16(value_type) else {
        return Ok(None);
    };
    let count = count as usize;

    let value = match field_type {
        FieldType::Ascii => {
            let limit = if inline { 4 } else { blob.len() - data_offset };
            let mut bytes = &blob[data_offset..data_offset + count.min(limit)];
            if let Some((&0, rest)) = bytes.split_last() {
                bytes = rest;
            }
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        FieldType::Undefined => {
            let end = data_offset
                .saturating_add(count.min(UNDEFINED_DISPLAY_LIMIT))
                .min(blob.len());
            let mut hex = blob[data_offset..end]
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            if count > UNDEFINED_DISPLAY_LIMIT {
                hex.push_str("...");
            }
            Some(hex)
        }
        FieldType::Short | FieldType::Long => {
            if data_offset as u64 + total > blob.len() as u64 {
                return Err(ExifError::OutOfBounds(data_offset));
            }
            join_components(count, |i| {
                let at = data_offset + i * size;
                match field_type {
                    FieldType::Short => order.read_u16(blob, at).map(|v| v.to_string()),
                    _ => order.read_u32(blob, at).map(|v| v.to_string()),
                }
            })
        }
        FieldType::Rational | FieldType::SignedRational if count == 1 => {
            let value = match field_type {
                FieldType::Rational => order
                    .read_rational(blob, data_offset)
                    .map(|(n, d)| format_rational(n as f64, d as f64)),
                _ => order
                    .read_srational(blob, data_offset)
                    .map(|(n, d)| format_rational(n as f64, d as f64)),
            };
            Some(value.ok_or(ExifError::OutOfBounds(data_offset))?)
        }
        FieldType::Byte
        | FieldType::SignedLong
        | FieldType::Rational
        | FieldType::SignedRational => None,
    };
    Ok(value)
}

/// A single component on its own, several joined with `", "`
fn join_components(count: usize, mut read: impl FnMut(usize) -> Option<String>) -> Option<String> {
    if count == 0 {
        return None;
    }
    let mut out = read(0)?;
    for i in 1..count {
        let component = read(i)?;
        let _ = write!(out, ", {}", component);
    }
    Some(out)
}

/// Builds TIFF blobs for tests.
#[cfg(test)]
pub(crate) mod fixture {
    use super::{ByteOrder, IFD_ENTRY_SIZE, TIFF_HEADER_SIZE};

    /// An IFD entry: tag, type, count, 4-byte value field
    pub(crate) type Entry = (u16, u16, u32, [u8; 4]);

    /// Offset at which [`tiff`] places its `extra` bytes for `entries` entries
    pub(crate) fn extra_offset(entries: usize) -> u32 {
        (TIFF_HEADER_SIZE + 2 + entries * IFD_ENTRY_SIZE + 4) as u32
    }

    /// Header + single IFD + next-IFD pointer, followed by `extra`
    pub(crate) fn tiff(order: ByteOrder, entries: &[Entry], extra: &[u8]) -> Vec<u8> {
        let u16b = |v: u16| match order {
            ByteOrder::LittleEndian => v.to_le_bytes(),
            ByteOrder::BigEndian => v.to_be_bytes(),
        };
        let u32b = |v: u32| match order {
            ByteOrder::LittleEndian => v.to_le_bytes(),
            ByteOrder::BigEndian => v.to_be_bytes(),
        };

        let mut blob = match order {
            ByteOrder::LittleEndian => b"II".to_vec(),
            ByteOrder::BigEndian => b"MM".to_vec(),
        };
        blob.extend_from_slice(&u16b(42));
        blob.extend_from_slice(&u32b(TIFF_HEADER_SIZE as u32));
        blob.extend_from_slice(&u16b(entries.len() as u16));
        for &(tag, ty, count, field) in entries {
            blob.extend_from_slice(&u16b(tag));
            blob.extend_from_slice(&u16b(ty));
            blob.extend_from_slice(&u32b(count));
            blob.extend_from_slice(&field);
        }
        blob.extend_from_slice(&u32b(0));
        blob.extend_from_slice(extra);
        blob
    }
}
