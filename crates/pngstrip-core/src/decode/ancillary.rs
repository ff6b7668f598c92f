//! Fixed-layout chunks (`tIME`, `pHYs`), `iCCP` and `eXIf`.

use super::{find_nul, DecodedReport, EXIF_FALLBACK};
use crate::container::ChunkType;
use crate::error::SegmentError;
use crate::exif;
use crate::inflate::Charset;

const TIME_SIZE: usize = 7;
const PHYS_SIZE: usize = 9;

/// `pHYs` unit code for pixels per meter
const UNIT_METER: u8 = 1;

fn read_u8(payload: &[u8], offset: usize) -> Result<u8, SegmentError> {
    payload
        .get(offset)
        .copied()
        .ok_or(SegmentError::parse(payload.len()))
}

fn read_u16_be(payload: &[u8], offset: usize) -> Result<u16, SegmentError> {
    Ok(u16::from_be_bytes([
        read_u8(payload, offset)?,
        read_u8(payload, offset + 1)?,
    ]))
}

fn read_u32_be(payload: &[u8], offset: usize) -> Result<u32, SegmentError> {
    Ok(u32::from_be_bytes([
        read_u8(payload, offset)?,
        read_u8(payload, offset + 1)?,
        read_u8(payload, offset + 2)?,
        read_u8(payload, offset + 3)?,
    ]))
}

/// Decode a `tIME` payload as `Y/M/D H:M:S`
pub fn decode_time(payload: &[u8]) -> Result<DecodedReport, SegmentError> {
    if payload.len() < TIME_SIZE {
        return Err(SegmentError::invalid(ChunkType::TIME));
    }
    let year = read_u16_be(payload, 0)?;
    let [month, day, hour, minute, second] = [2, 3, 4, 5, 6].map(|i| payload[i]);
    Ok(DecodedReport::PlainText(format!(
        "{}/{}/{} {}:{}:{}",
        year, month, day, hour, minute, second
    )))
}

/// Decode a `pHYs` payload into X / Y / unit rows
pub fn decode_phys(payload: &[u8]) -> Result<DecodedReport, SegmentError> {
    if payload.len() < PHYS_SIZE {
        return Err(SegmentError::invalid(ChunkType::PHYS));
    }
    let x = read_u32_be(payload, 0)?;
    let y = read_u32_be(payload, 4)?;
    let unit = match read_u8(payload, 8)? {
        UNIT_METER => "meter",
        _ => "unknown",
    };
    Ok(DecodedReport::KeyValueTable(vec![
        ("X".to_string(), x.to_string()),
        ("Y".to_string(), y.to_string()),
        ("unit".to_string(), unit.to_string()),
    ]))
}

/// Decode the profile name of an `iCCP` payload
pub fn decode_iccp(payload: &[u8]) -> Result<DecodedReport, SegmentError> {
    let nul = find_nul(payload, 0).ok_or(SegmentError::invalid(ChunkType::ICCP))?;
    Ok(DecodedReport::PlainText(format!(
        "profile name: {}",
        Charset::Latin1.decode(&payload[..nul])
    )))
}

/// Decode an `eXIf` payload through the IFD decoder.
///
/// Header faults become one-line reports; a directory that reads past the
/// end of the payload is a parse error.
pub fn decode_exif(payload: &[u8]) -> Result<DecodedReport, SegmentError> {
    match exif::decode_ifd(payload) {
        Ok(tags) if tags.is_empty() => Ok(DecodedReport::text(EXIF_FALLBACK)),
        Ok(tags) => Ok(DecodedReport::List(tags)),
        Err(exif::ExifError::OutOfBounds(_)) => Err(SegmentError::parse(payload.len())),
        Err(e) => Ok(e.into()),
    }
}
