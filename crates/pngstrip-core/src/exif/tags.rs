//! Exif field types and the tag display-name table.

/// Exif/TIFF field types that determine how values are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte = 1,
    /// 8-bit ASCII character, NUL terminated
    Ascii = 2,
    /// Unsigned 16-bit integer
    Short = 3,
    /// Unsigned 32-bit integer
    Long = 4,
    /// Two unsigned 32-bit integers (numerator, denominator)
    Rational = 5,
    /// Opaque bytes
    Undefined = 7,
    /// Signed 32-bit integer
    SignedLong = 9,
    /// Two signed 32-bit integers (numerator, denominator)
    SignedRational = 10,
}

impl FieldType {
    /// Maximum bytes stored inline in the 4-byte value field of an entry
    pub const INLINE_THRESHOLD: u64 = 4;

    /// Create a FieldType from its numeric value.
    ///
    /// Returns `None` for types this decoder does not render.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            7 => Some(FieldType::Undefined),
            9 => Some(FieldType::SignedLong),
            10 => Some(FieldType::SignedRational),
            _ => None,
        }
    }

    /// Size of a single value of this type in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Short => 2,
            FieldType::Long | FieldType::SignedLong => 4,
            FieldType::Rational | FieldType::SignedRational => 8,
        }
    }
}

/// Component size for a raw type code; unknown codes count as one byte
pub fn type_size(raw: u16) -> usize {
    FieldType::from_u16(raw).map_or(1, FieldType::size_in_bytes)
}

/// Tag id to display name, for the tags worth reporting
pub const TAG_NAMES: &[(u16, &str)] = &[
    (0x010F, "Make"),
    (0x0110, "Model"),
    (0x0112, "Orientation"),
    (0x0131, "Software"),
    (0x0132, "DateTime"),
    (0x8298, "Copyright"),
    (0x8769, "ExifOffset"),
    (0x8825, "GPSInfo"),
    (0x829A, "ExposureTime"),
    (0x829D, "FNumber"),
    (0x8822, "ExposureProgram"),
    (0x8827, "ISOSpeed"),
    (0x9000, "ExifVersion"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (0x9201, "ShutterSpeedValue"),
    (0x9202, "ApertureValue"),
    (0x9204, "ExposureBiasValue"),
    (0x9207, "MeteringMode"),
    (0x9209, "Flash"),
    (0x920A, "FocalLength"),
    (0x927C, "MakerNote"),
    (0x9286, "UserComment"),
    (0xA002, "PixelXDimension"),
    (0xA003, "PixelYDimension"),
    (0xA405, "FocalLengthIn35mmFilm"),
    (0xA433, "LensMake"),
    (0xA434, "LensModel"),
];

/// Look up the display name for a tag id
pub fn tag_name(id: u16) -> Option<&'static str> {
    TAG_NAMES
        .iter()
        .find(|(tag, _)| *tag == id)
        .map(|(_, name)| *name)
}
