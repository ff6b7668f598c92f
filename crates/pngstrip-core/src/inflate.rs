//! Compressed text decoding for `zTXt` and `iTXt` chunks.
//!
//! Text is inflated with an explicit two-stage strategy:
//!
//! 1. [`try_full`] treats the input as a zlib stream (2-byte header followed
//!    by deflate data).
//! 2. [`try_skip_header`] drops the first two bytes and inflates the rest as
//!    raw deflate. This recovers streams whose zlib header is damaged.
//!
//! A stream only counts as decoded once it reaches its end marker, so a
//! truncated stream fails rather than yielding a silent prefix.

use crate::error::{Error, Result};
use flate2::{Decompress, FlushDecompress, Status};
use tracing::trace;

/// Default cap on inflated output per chunk (8 MiB)
pub const DEFAULT_INFLATE_LIMIT: usize = 8 * 1024 * 1024;

/// Size of the zlib header skipped by [`try_skip_header`]
const ZLIB_HEADER_SIZE: usize = 2;

/// Scratch buffer size per decompress call
const CHUNK_SIZE: usize = 16 * 1024;

/// Character set used to turn inflated bytes into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// ISO-8859-1: every byte maps to the code point of the same value
    Latin1,
    /// UTF-8, with invalid sequences replaced
    Utf8,
}

impl Charset {
    /// Decode `bytes` in this charset
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// Inflate `input` and decode it as text.
///
/// Fails with [`Error::DecompressionFailed`] only when both attempts fail.
pub fn inflate_to_text(input: &[u8], charset: Charset, limit: usize) -> Result<String> {
    let bytes = match try_full(input, limit) {
        Ok(bytes) => bytes,
        Err(first) => {
            trace!("zlib inflate failed ({}), retrying without header", first);
            try_skip_header(input, limit).map_err(|second| {
                Error::decompression_failed(format!("{}; {}", first, second))
            })?
        }
    };
    Ok(charset.decode(&bytes))
}

/// Inflate `input` as a complete zlib stream
pub fn try_full(input: &[u8], limit: usize) -> Result<Vec<u8>> {
    inflate(input, true, limit)
}

/// Inflate `input` as raw deflate after dropping the 2-byte zlib header
pub fn try_skip_header(input: &[u8], limit: usize) -> Result<Vec<u8>> {
    let body = input.get(ZLIB_HEADER_SIZE..).unwrap_or_default();
    inflate(body, false, limit)
}

fn inflate(input: &[u8], zlib_header: bool, limit: usize) -> Result<Vec<u8>> {
    let mut de = Decompress::new(zlib_header);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut out = Vec::new();
    let mut in_pos = 0usize;

    loop {
        let before_in = de.total_in();
        let before_out = de.total_out();

        let status = de
            .decompress(&input[in_pos..], &mut buf, FlushDecompress::None)
            .map_err(|e| Error::decompression_failed(e.to_string()))?;

        let consumed = (de.total_in() - before_in) as usize;
        let produced = (de.total_out() - before_out) as usize;
        in_pos += consumed;

        if produced != 0 {
            if out.len() + produced > limit {
                return Err(Error::InflateLimitExceeded { limit });
            }
            out.extend_from_slice(&buf[..produced]);
        }

        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError => {
                if consumed == 0 && produced == 0 {
                    let reason = if in_pos >= input.len() {
                        "truncated deflate stream"
                    } else {
                        "inflate stalled"
                    };
                    return Err(Error::decompression_failed(reason));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_full_zlib_stream() {
        let text = inflate_to_text(&zlib(b"hello world"), Charset::Latin1, DEFAULT_INFLATE_LIMIT);
        assert_eq!(text.unwrap(), "hello world");
    }

    #[test]
    fn test_corrupt_header_falls_back_to_raw_deflate() {
        let mut stream = zlib(b"fallback path");
        stream[0] = 0x00;
        stream[1] = 0x00;
        assert!(try_full(&stream, DEFAULT_INFLATE_LIMIT).is_err());

        let text = inflate_to_text(&stream, Charset::Latin1, DEFAULT_INFLATE_LIMIT).unwrap();
        assert_eq!(text, "fallback path");
    }

    #[test]
    fn test_header_less_prefix_stream() {
        // Two arbitrary bytes in front of a raw deflate body
        let mut enc = DeflateEncoder::new(vec![0xAB, 0xCD], Compression::default());
        enc.write_all(b"raw body").unwrap();
        let stream = enc.finish().unwrap();

        let text = inflate_to_text(&stream, Charset::Utf8, DEFAULT_INFLATE_LIMIT).unwrap();
        assert_eq!(text, "raw body");
    }

    #[test]
    fn test_both_attempts_fail() {
        let garbage = [0xFFu8; 12];
        let err = inflate_to_text(&garbage, Charset::Latin1, DEFAULT_INFLATE_LIMIT).unwrap_err();
        assert!(matches!(err, Error::DecompressionFailed { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_truncated_stream_fails() {
        let stream = zlib(b"a somewhat longer text that will not survive truncation");
        let cut = &stream[..stream.len() / 2];
        assert!(try_full(cut, DEFAULT_INFLATE_LIMIT).is_err());
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(inflate_to_text(&[], Charset::Utf8, DEFAULT_INFLATE_LIMIT).is_err());
    }

    #[test]
    fn test_limit_exceeded() {
        let stream = zlib(&[b'a'; 4096]);
        assert!(matches!(
            try_full(&stream, 100),
            Err(Error::InflateLimitExceeded { limit: 100 })
        ));
    }

    #[test]
    fn test_charsets() {
        assert_eq!(Charset::Latin1.decode(&[0x63, 0x61, 0x66, 0xE9]), "café");
        assert_eq!(Charset::Utf8.decode("café".as_bytes()), "café");
        assert_eq!(Charset::Utf8.decode(&[0x66, 0xFF]), "f\u{FFFD}");
    }
}
