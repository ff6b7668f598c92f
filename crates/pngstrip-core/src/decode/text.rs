//! Textual chunks: `tEXt`, `zTXt` and `iTXt`.
//!
//! ```text
//! tEXt: keyword NUL text
//! zTXt: keyword NUL method compressed-text
//! iTXt: keyword NUL flag method language NUL translated-keyword NUL text
//! ```

use super::{find_nul, DecodedReport, DECOMPRESSION_FAILED};
use crate::container::ChunkType;
use crate::error::SegmentError;
use crate::inflate::{inflate_to_text, Charset};
use tracing::debug;

/// The only compression method PNG defines (zlib deflate)
const COMPRESSION_DEFLATE: u8 = 0;

/// Decode a `tEXt` payload into `"keyword: text"`
pub fn decode_text(payload: &[u8]) -> Result<DecodedReport, SegmentError> {
    let nul = find_nul(payload, 0).ok_or(SegmentError::invalid(ChunkType::TEXT))?;
    let keyword = Charset::Latin1.decode(&payload[..nul]);
    let text = Charset::Latin1.decode(&payload[nul + 1..]);
    Ok(DecodedReport::PlainText(format!("{}: {}", keyword, text)))
}

/// Decode a `zTXt` payload, inflating the Latin-1 text
pub fn decode_ztxt(payload: &[u8], inflate_limit: usize) -> Result<DecodedReport, SegmentError> {
    let invalid = || SegmentError::invalid(ChunkType::ZTXT);

    let nul = find_nul(payload, 0).ok_or_else(invalid)?;
    let keyword = Charset::Latin1.decode(&payload[..nul]);
    let method = *payload.get(nul + 1).ok_or_else(invalid)?;

    if method != COMPRESSION_DEFLATE {
        return Ok(DecodedReport::PlainText(format!(
            "{}: (unknown compression method {})",
            keyword, method
        )));
    }

    let text = inflate_or_marker(&payload[nul + 2..], Charset::Latin1, inflate_limit);
    Ok(DecodedReport::PlainText(format!("{}: {}", keyword, text)))
}

/// Decode an `iTXt` payload, inflating the UTF-8 text when flagged
pub fn decode_itxt(payload: &[u8], inflate_limit: usize) -> Result<DecodedReport, SegmentError> {
    let invalid = || SegmentError::invalid(ChunkType::ITXT);

    let keyword_end = find_nul(payload, 0).ok_or_else(invalid)?;
    let keyword = Charset::Utf8.decode(&payload[..keyword_end]);

    let compressed = *payload.get(keyword_end + 1).ok_or_else(invalid)? != 0;
    // Compression method byte: only its presence matters
    payload.get(keyword_end + 2).ok_or_else(invalid)?;

    let language_end = find_nul(payload, keyword_end + 3).ok_or_else(invalid)?;
    let translated_end = find_nul(payload, language_end + 1).ok_or_else(invalid)?;
    let body = &payload[translated_end + 1..];

    let text = if compressed {
        inflate_or_marker(body, Charset::Utf8, inflate_limit)
    } else {
        Charset::Utf8.decode(body)
    };
    Ok(DecodedReport::PlainText(format!("{}: {}", keyword, text)))
}

fn inflate_or_marker(body: &[u8], charset: Charset, limit: usize) -> String {
    inflate_to_text(body, charset, limit).unwrap_or_else(|e| {
        debug!("Compressed text could not be inflated: {}", e);
        DECOMPRESSION_FAILED.to_string()
    })
}
