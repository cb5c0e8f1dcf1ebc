//! Typed metadata tags.
//!
//! A [`Tag`] is a key, an element type, a declared element count and a raw
//! payload. The payload is well formed when
//! `count * tag_type.width() == value.len()`; the metadata store refuses
//! anything else.

use alloc::string::String;
use alloc::vec::Vec;

/// Id assigned when a key has no numeric id in its standard.
pub const UNKNOWN_TAG_ID: u16 = 0xFFFF;

/// Element type of a tag payload (TIFF/EXIF numbering).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
#[repr(u16)]
pub enum TagType {
    /// Placeholder, zero-width.
    #[default]
    NoType = 0,
    /// 8-bit unsigned integer.
    Byte = 1,
    /// 8-bit bytes holding NUL-terminated 7-bit ASCII text.
    Ascii = 2,
    /// 16-bit unsigned integer.
    Short = 3,
    /// 32-bit unsigned integer.
    Long = 4,
    /// Two longs: numerator, denominator.
    Rational = 5,
    /// 8-bit signed integer.
    SByte = 6,
    /// 8-bit opaque byte.
    Undefined = 7,
    /// 16-bit signed integer.
    SShort = 8,
    /// 32-bit signed integer.
    SLong = 9,
    /// Two slongs: numerator, denominator.
    SRational = 10,
    /// 32-bit IEEE float.
    Float = 11,
    /// 64-bit IEEE float.
    Double = 12,
    /// 32-bit IFD offset.
    Ifd = 13,
    /// 32-bit RGBQUAD.
    Palette = 14,
    /// 64-bit unsigned integer.
    Long8 = 16,
    /// 64-bit signed integer.
    SLong8 = 17,
    /// 64-bit IFD offset.
    Ifd8 = 18,
}

impl TagType {
    /// Size in bytes of one element.
    pub const fn width(self) -> u32 {
        match self {
            Self::NoType => 0,
            Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 1,
            Self::Short | Self::SShort => 2,
            Self::Long | Self::SLong | Self::Float | Self::Ifd | Self::Palette => 4,
            Self::Rational
            | Self::SRational
            | Self::Double
            | Self::Long8
            | Self::SLong8
            | Self::Ifd8 => 8,
        }
    }
}

/// A metadata tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tag {
    key: String,
    description: String,
    id: u16,
    tag_type: TagType,
    count: u32,
    value: Vec<u8>,
}

impl Tag {
    /// Create a tag with an explicit element type and count.
    ///
    /// Consistency of `count` with the payload length is not checked here;
    /// see [`is_consistent()`](Self::is_consistent).
    pub fn new(
        key: impl Into<String>,
        tag_type: TagType,
        count: u32,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            key: key.into(),
            description: String::new(),
            id: 0,
            tag_type,
            count,
            value: value.into(),
        }
    }

    /// NUL-terminated ASCII tag.
    ///
    /// `text` is cut at its first NUL; count and length are the kept
    /// length plus one.
    pub fn ascii(key: impl Into<String>, text: &str) -> Self {
        let text = text.split('\0').next().unwrap_or_default();
        let mut value = Vec::with_capacity(text.len() + 1);
        value.extend_from_slice(text.as_bytes());
        value.push(0);
        let count = value.len() as u32;
        Self::new(key, TagType::Ascii, count, value)
    }

    /// Tag of native-endian 16-bit unsigned values.
    pub fn shorts(key: impl Into<String>, values: &[u16]) -> Self {
        let value: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::new(key, TagType::Short, values.len() as u32, value)
    }

    /// Tag of native-endian 32-bit unsigned values.
    pub fn longs(key: impl Into<String>, values: &[u32]) -> Self {
        let value: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Self::new(key, TagType::Long, values.len() as u32, value)
    }

    /// Set a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the numeric id.
    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    /// Tag key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the tag key.
    pub fn set_key(&mut self, key: &str) {
        self.key.clear();
        self.key.push_str(key);
    }

    /// Human-readable description, empty if none.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Numeric id within the tag's standard.
    #[inline]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Set the numeric id.
    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    /// Element type.
    #[inline]
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    /// Declared element count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Payload length in bytes.
    #[inline]
    pub fn length(&self) -> usize {
        self.value.len()
    }

    /// Raw payload.
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replace payload, type and count together.
    pub fn set_value(&mut self, tag_type: TagType, count: u32, value: impl Into<Vec<u8>>) {
        self.tag_type = tag_type;
        self.count = count;
        self.value = value.into();
    }

    /// Whether `count * width == length`.
    pub fn is_consistent(&self) -> bool {
        self.count as u64 * self.tag_type.width() as u64 == self.value.len() as u64
    }

    /// Text of an ASCII tag, without the trailing NUL.
    ///
    /// `None` for other types or payloads that are not UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        if self.tag_type != TagType::Ascii {
            return None;
        }
        let text = self.value.strip_suffix(&[0]).unwrap_or(&self.value);
        core::str::from_utf8(text).ok()
    }

    /// First two payload bytes as a native-endian 16-bit value.
    ///
    /// The tag type is not checked; any payload of two bytes or more is
    /// read this way.
    pub fn first_short(&self) -> Option<u16> {
        match *self.value.get(..2)? {
            [lo, hi] => Some(u16::from_ne_bytes([lo, hi])),
            _ => None,
        }
    }

    /// Bytes held by the tag beyond its struct: key, description and payload.
    pub fn heap_size(&self) -> usize {
        self.key.len() + self.description.len() + self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(TagType::NoType.width(), 0);
        assert_eq!(TagType::Byte.width(), 1);
        assert_eq!(TagType::Ascii.width(), 1);
        assert_eq!(TagType::Short.width(), 2);
        assert_eq!(TagType::SShort.width(), 2);
        assert_eq!(TagType::Long.width(), 4);
        assert_eq!(TagType::Float.width(), 4);
        assert_eq!(TagType::Palette.width(), 4);
        assert_eq!(TagType::Rational.width(), 8);
        assert_eq!(TagType::SRational.width(), 8);
        assert_eq!(TagType::Double.width(), 8);
        assert_eq!(TagType::Ifd8.width(), 8);
    }

    #[test]
    fn ascii_tag_counts_terminator() {
        let tag = Tag::ascii("Artist", "Jane");
        assert_eq!(tag.key(), "Artist");
        assert_eq!(tag.tag_type(), TagType::Ascii);
        assert_eq!(tag.count(), 5);
        assert_eq!(tag.length(), 5);
        assert_eq!(tag.value(), b"Jane\0");
        assert_eq!(tag.as_str(), Some("Jane"));
        assert!(tag.is_consistent());
    }

    #[test]
    fn ascii_tag_stops_at_nul() {
        let tag = Tag::ascii("Comment", "ab\0cd");
        assert_eq!(tag.count(), 3);
        assert_eq!(tag.value(), b"ab\0");
        assert_eq!(tag.as_str(), Some("ab"));
        assert!(tag.is_consistent());
    }

    #[test]
    fn empty_ascii_tag() {
        let tag = Tag::ascii("Comment", "");
        assert_eq!(tag.count(), 1);
        assert_eq!(tag.as_str(), Some(""));
    }

    #[test]
    fn consistency_check() {
        let ok = Tag::new("k", TagType::Short, 2, alloc::vec![0; 4]);
        assert!(ok.is_consistent());
        let bad = Tag::new("k", TagType::Short, 3, alloc::vec![0; 4]);
        assert!(!bad.is_consistent());
        let rational = Tag::new("k", TagType::Rational, 1, alloc::vec![0; 8]);
        assert!(rational.is_consistent());
    }

    #[test]
    fn numeric_helpers() {
        let tag = Tag::shorts("PhotometricInterpretation", &[1]);
        assert_eq!(tag.count(), 1);
        assert_eq!(tag.length(), 2);
        assert_eq!(tag.first_short(), Some(1));
        assert!(tag.is_consistent());
        assert_eq!(tag.as_str(), None);

        let tag = Tag::longs("ImageWidth", &[640, 480]);
        assert_eq!(tag.length(), 8);
        assert!(tag.is_consistent());
        // the type is not checked; both halves are 7 in either byte order
        let tag = Tag::longs("Orientation", &[0x0007_0007]);
        assert_eq!(tag.first_short(), Some(7));

        let tag = Tag::new("Level", TagType::Byte, 1, alloc::vec![7]);
        assert_eq!(tag.first_short(), None);
    }

    #[test]
    fn builders_and_setters() {
        let mut tag = Tag::ascii("a", "x")
            .with_description("desc")
            .with_id(42);
        assert_eq!(tag.description(), "desc");
        assert_eq!(tag.id(), 42);
        tag.set_key("b");
        assert_eq!(tag.key(), "b");
        tag.set_value(TagType::Byte, 3, alloc::vec![1, 2, 3]);
        assert_eq!(tag.tag_type(), TagType::Byte);
        assert_eq!(tag.value(), &[1, 2, 3]);
        assert_eq!(tag.heap_size(), 1 + 4 + 3);
    }
}
