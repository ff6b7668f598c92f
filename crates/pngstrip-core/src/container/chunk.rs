//! Low-level PNG chunk framing.
//!
//! ## Chunk Layout
//!
//! ```text
//! +----------+----------+-----------------+----------+
//! | length   | type     | payload         | crc      |
//! | u32 BE   | 4 ASCII  | `length` bytes  | 4 bytes  |
//! +----------+----------+-----------------+----------+
//! ```
//!
//! The CRC is carried through untouched; it is never verified.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::Range;

/// The fixed 8-byte PNG signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Length field plus type field
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Trailing CRC field
pub const CHUNK_CRC_SIZE: usize = 4;

/// A four-byte chunk type tag such as `IHDR` or `tEXt`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkType([u8; 4]);

impl ChunkType {
    /// Image header
    pub const IHDR: Self = Self(*b"IHDR");
    /// Image data
    pub const IDAT: Self = Self(*b"IDAT");
    /// Image trailer
    pub const IEND: Self = Self(*b"IEND");
    /// Uncompressed Latin-1 text
    pub const TEXT: Self = Self(*b"tEXt");
    /// zlib-compressed Latin-1 text
    pub const ZTXT: Self = Self(*b"zTXt");
    /// International (UTF-8) text
    pub const ITXT: Self = Self(*b"iTXt");
    /// Last-modification time
    pub const TIME: Self = Self(*b"tIME");
    /// Physical pixel dimensions
    pub const PHYS: Self = Self(*b"pHYs");
    /// Embedded ICC profile
    pub const ICCP: Self = Self(*b"iCCP");
    /// Exif metadata
    pub const EXIF: Self = Self(*b"eXIf");

    /// Creates a chunk type from its raw bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Returns the raw tag bytes
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl TryFrom<&str> for ChunkType {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| format!("chunk type must be exactly 4 bytes: '{}'", value))?;
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(format!("chunk type must be ASCII letters: '{}'", value));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType(\"{}\")", self)
    }
}

/// One chunk of the container, borrowed from the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The chunk type tag
    pub chunk_type: ChunkType,
    /// Payload bytes, excluding header and CRC
    pub payload: &'a [u8],
    /// Length field as read from the stream
    pub declared_length: u32,
    /// Index of this chunk in the input ordering
    pub position: usize,
    /// Byte range of the whole chunk (header, payload, CRC) in the input
    pub range: Range<usize>,
    raw: &'a [u8],
}

impl<'a> Segment<'a> {
    /// Returns the whole chunk exactly as it appeared in the input
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw
    }
}

/// Read the chunk starting at `offset`.
///
/// The declared length is only trusted after it has been checked against
/// the remaining buffer.
pub fn read_segment(data: &[u8], offset: usize, position: usize) -> Result<Segment<'_>> {
    let available = data.len().saturating_sub(offset);
    if available < CHUNK_HEADER_SIZE {
        return Err(Error::truncated_segment(offset, CHUNK_HEADER_SIZE, available));
    }

    let header = &data[offset..offset + CHUNK_HEADER_SIZE];
    let declared_length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let chunk_type = ChunkType::new([header[4], header[5], header[6], header[7]]);

    let needed = (declared_length as usize)
        .checked_add(CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE)
        .ok_or_else(|| Error::truncated_segment(offset, usize::MAX, available))?;
    if needed > available {
        return Err(Error::truncated_segment(offset, needed, available));
    }

    let range = offset..offset + needed;
    let payload_start = offset + CHUNK_HEADER_SIZE;
    let payload = &data[payload_start..payload_start + declared_length as usize];

    Ok(Segment {
        chunk_type,
        payload,
        declared_length,
        position,
        raw: &data[range.clone()],
        range,
    })
}

/// Iterator over the chunks following the signature.
///
/// Yields at most one error, after which it is exhausted.
#[derive(Debug, Clone)]
pub struct SegmentIter<'a> {
    data: &'a [u8],
    offset: usize,
    position: usize,
    done: bool,
}

impl<'a> SegmentIter<'a> {
    /// Checks the signature and positions the iterator on the first chunk
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if !has_signature(data) {
            return Err(Error::InvalidSignature);
        }
        Ok(Self {
            data,
            offset: PNG_SIGNATURE.len(),
            position: 0,
            done: false,
        })
    }
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.data.len() {
            return None;
        }

        match read_segment(self.data, self.offset, self.position) {
            Ok(segment) => {
                self.offset = segment.range.end;
                self.position += 1;
                Some(Ok(segment))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Returns true if `data` starts with the PNG signature
pub fn has_signature(data: &[u8]) -> bool {
    data.len() >= PNG_SIGNATURE.len() && data[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Encode one chunk with a zeroed CRC.
///
/// Only used to build fixtures; the walker never re-encodes chunks.
#[cfg(test)]
pub(crate) fn encode_chunk(chunk_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + CHUNK_HEADER_SIZE + CHUNK_CRC_SIZE);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_segment() {
        let chunk = encode_chunk(b"IHDR", &[1, 2, 3, 4]);
        let segment = read_segment(&chunk, 0, 0).unwrap();
        assert_eq!(segment.chunk_type, ChunkType::IHDR);
        assert_eq!(segment.payload, &[1, 2, 3, 4]);
        assert_eq!(segment.declared_length, 4);
        assert_eq!(segment.range, 0..16);
        assert_eq!(segment.as_bytes(), &chunk[..]);
    }

    #[test]
    fn test_read_segment_truncated_payload() {
        let mut chunk = encode_chunk(b"IDAT", &[0; 10]);
        chunk.truncate(15);
        match read_segment(&chunk, 0, 0) {
            Err(Error::TruncatedSegment {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 22);
                assert_eq!(available, 15);
            }
            other => panic!("expected TruncatedSegment, got {:?}", other),
        }
    }

    #[test]
    fn test_read_segment_truncated_header() {
        assert!(matches!(
            read_segment(&[0, 0, 0], 0, 0),
            Err(Error::TruncatedSegment { .. })
        ));
    }

    #[test]
    fn test_read_segment_huge_length() {
        let mut chunk = vec![0xFF, 0xFF, 0xFF, 0xFF];
        chunk.extend_from_slice(b"IDAT");
        assert!(matches!(
            read_segment(&chunk, 0, 0),
            Err(Error::TruncatedSegment { .. })
        ));
    }

    #[test]
    fn test_iter_requires_signature() {
        assert!(matches!(
            SegmentIter::new(b"GIF89a.."),
            Err(Error::InvalidSignature)
        ));
        assert!(matches!(SegmentIter::new(&[0x89]), Err(Error::InvalidSignature)));
    }

    #[test]
    fn test_iter_positions() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(encode_chunk(b"IHDR", &[0; 13]));
        data.extend(encode_chunk(b"IEND", &[]));

        let segments: Vec<_> = SegmentIter::new(&data)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].position, 0);
        assert_eq!(segments[1].position, 1);
        assert_eq!(segments[1].chunk_type, ChunkType::IEND);
        assert_eq!(segments[1].range.end, data.len());
    }

    #[test]
    fn test_iter_stops_after_error() {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend(encode_chunk(b"IHDR", &[0; 13]));
        data.extend_from_slice(&[0, 0, 0]);

        let mut iter = SegmentIter::new(&data).unwrap();
        assert!(iter.next().unwrap().is_ok());
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_chunk_type_from_str() {
        assert_eq!(ChunkType::try_from("tIME").unwrap(), ChunkType::TIME);
        assert!(ChunkType::try_from("tIM").is_err());
        assert!(ChunkType::try_from("t1ME").is_err());
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(ChunkType::EXIF.to_string(), "eXIf");
        assert_eq!(ChunkType::new([b'a', 0, b'b', b'c']).to_string(), "a\\x00bc");
    }
}
