//! Legacy device-independent-bitmap info header.
//!
//! The info block is stored in the bitmap's backing block in the exact
//! `BITMAPINFOHEADER` layout (40 bytes, little-endian), followed directly by
//! the palette or the three channel masks. Consumers that map the block
//! onto a DIB structure read it with [`Bitmap::info_block()`](crate::Bitmap::info_block).

use crate::layout::INFO_HEADER_SIZE;

/// Plain layout: no channel masks.
pub const BI_RGB: u32 = 0;

/// Channel masks follow the info header.
pub const BI_BITFIELDS: u32 = 3;

/// 72 dpi expressed in pixels per meter.
pub const DEFAULT_PIXELS_PER_METER: i32 = 2835;

/// Decoded `BITMAPINFOHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InfoHeader {
    /// Declared struct size, always 40.
    pub size: u32,
    /// Image width in pixels.
    pub width: i32,
    /// Image height in pixels.
    pub height: i32,
    /// Plane count, always 1.
    pub planes: u16,
    /// Bits per pixel.
    pub bit_count: u16,
    /// [`BI_RGB`] or [`BI_BITFIELDS`].
    pub compression: u32,
    /// Image size hint; left at zero.
    pub size_image: u32,
    /// Horizontal resolution in pixels per meter.
    pub x_pels_per_meter: i32,
    /// Vertical resolution in pixels per meter.
    pub y_pels_per_meter: i32,
    /// Palette entries in use.
    pub colors_used: u32,
    /// Palette entries required to display the image.
    pub colors_important: u32,
}

impl InfoHeader {
    /// Header for a freshly allocated bitmap.
    pub(crate) fn new(width: u32, height: u32, bpp: u32, masks: bool, colors: u32) -> Self {
        Self {
            size: INFO_HEADER_SIZE as u32,
            width: width as i32,
            height: height as i32,
            planes: 1,
            bit_count: bpp as u16,
            compression: if masks { BI_BITFIELDS } else { BI_RGB },
            size_image: 0,
            x_pels_per_meter: DEFAULT_PIXELS_PER_METER,
            y_pels_per_meter: DEFAULT_PIXELS_PER_METER,
            colors_used: colors,
            colors_important: colors,
        }
    }

    /// Decode from the first 40 bytes of `bytes`.
    ///
    /// Returns `None` if fewer than 40 bytes are available.
    pub fn read(bytes: &[u8]) -> Option<Self> {
        bytes.get(..INFO_HEADER_SIZE).map(Self::decode)
    }

    /// Decode from a slice known to hold at least 40 bytes.
    pub(crate) fn decode(b: &[u8]) -> Self {
        Self {
            size: u32_at(b, 0),
            width: u32_at(b, 4) as i32,
            height: u32_at(b, 8) as i32,
            planes: u16_at(b, 12),
            bit_count: u16_at(b, 14),
            compression: u32_at(b, 16),
            size_image: u32_at(b, 20),
            x_pels_per_meter: u32_at(b, 24) as i32,
            y_pels_per_meter: u32_at(b, 28) as i32,
            colors_used: u32_at(b, 32),
            colors_important: u32_at(b, 36),
        }
    }

    /// Encode into the first 40 bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than 40 bytes.
    pub fn write(&self, out: &mut [u8]) {
        let b = &mut out[..INFO_HEADER_SIZE];
        b[0..4].copy_from_slice(&self.size.to_le_bytes());
        b[4..8].copy_from_slice(&self.width.to_le_bytes());
        b[8..12].copy_from_slice(&self.height.to_le_bytes());
        b[12..14].copy_from_slice(&self.planes.to_le_bytes());
        b[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        b[16..20].copy_from_slice(&self.compression.to_le_bytes());
        b[20..24].copy_from_slice(&self.size_image.to_le_bytes());
        b[24..28].copy_from_slice(&self.x_pels_per_meter.to_le_bytes());
        b[28..32].copy_from_slice(&self.y_pels_per_meter.to_le_bytes());
        b[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        b[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
    }

    /// Whether channel masks follow the header.
    #[inline]
    pub fn has_masks(&self) -> bool {
        self.compression == BI_BITFIELDS
    }
}

/// Byte offsets of the scalar fields read directly by accessors.
pub(crate) mod field {
    pub const WIDTH: usize = 4;
    pub const HEIGHT: usize = 8;
    pub const BIT_COUNT: usize = 14;
    pub const COMPRESSION: usize = 16;
    pub const X_PELS: usize = 24;
    pub const Y_PELS: usize = 28;
    pub const COLORS_USED: usize = 32;
}

#[inline]
pub(crate) fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
pub(crate) fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
pub(crate) fn put_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}
