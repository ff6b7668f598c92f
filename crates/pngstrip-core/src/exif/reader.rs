//! Endian-aware fixed-width value reads.
//!
//! Every read is bounds-checked and returns `None` instead of panicking, so
//! damaged Exif blobs can never index past their end.

/// Byte order declared by the first two bytes of a TIFF header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Detect the byte order from a two-byte marker
    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match &marker {
            b"II" => Some(ByteOrder::LittleEndian),
            b"MM" => Some(ByteOrder::BigEndian),
            _ => None,
        }
    }

    /// Read a u16 at `offset`
    #[inline]
    pub fn read_u16(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(bytes),
            ByteOrder::BigEndian => u16::from_be_bytes(bytes),
        })
    }

    /// Read a u32 at `offset`
    #[inline]
    pub fn read_u32(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(bytes),
            ByteOrder::BigEndian => u32::from_be_bytes(bytes),
        })
    }

    /// Read an i32 at `offset`
    #[inline]
    pub fn read_i32(self, data: &[u8], offset: usize) -> Option<i32> {
        self.read_u32(data, offset).map(|v| v as i32)
    }

    /// Read an unsigned rational (numerator, denominator) at `offset`
    pub fn read_rational(self, data: &[u8], offset: usize) -> Option<(u32, u32)> {
        Some((
            self.read_u32(data, offset)?,
            self.read_u32(data, offset.checked_add(4)?)?,
        ))
    }

    /// Read a signed rational (numerator, denominator) at `offset`
    pub fn read_srational(self, data: &[u8], offset: usize) -> Option<(i32, i32)> {
        Some((
            self.read_i32(data, offset)?,
            self.read_i32(data, offset.checked_add(4)?)?,
        ))
    }
}

/// Magnitudes below this switch to exponent notation
const EXPONENT_BELOW: f64 = 1e-6;

/// Magnitudes at or above this switch to exponent notation
const EXPONENT_FROM: f64 = 1e21;

/// Format a rational, leaving the numerator unchanged when the denominator is zero.
///
/// Very small and very large quotients use exponent notation with an explicit
/// exponent sign, e.g. `2.3283064370807974e-10`.
pub fn format_rational(numerator: f64, denominator: f64) -> String {
    let value = if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    };
    format_number(value)
}

fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0
        || !value.is_finite()
        || (EXPONENT_BELOW..EXPONENT_FROM).contains(&magnitude)
    {
        return value.to_string();
    }

    let exp = format!("{:e}", value);
    match exp.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exp,
    }
}
