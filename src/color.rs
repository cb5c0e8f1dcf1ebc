//! ICC profile slot and logical color classification.
//!
//! [`ColorType`] is inferred from the element type, bit depth, palette
//! contents and [`IccFlags`], optionally scanning the alpha channel of
//! 32-bpp images.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::ops::{BitOr, BitOrAssign};

use crate::bitmap::Bitmap;
use crate::metadata::MetadataModel;
use crate::pixel::ImageType;
use crate::tag::Tag;

/// Classification flags carried alongside ICC profile bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IccFlags(u16);

impl IccFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Pixel data is CMYK.
    pub const CMYK: Self = Self(0x01);
    /// Pixel data is YUV / YCbCr.
    pub const YUV: Self = Self(0x02);

    /// Raw flag bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Flags from raw bits. Unknown bits are kept.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Whether every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set or clear `flag`.
    pub fn set(&mut self, flag: Self, enabled: bool) {
        if enabled {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

impl BitOr for IccFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for IccFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Opaque ICC profile bytes plus [`IccFlags`].
///
/// Replacing or clearing the bytes never touches the flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IccProfile {
    data: Vec<u8>,
    flags: IccFlags,
}

impl IccProfile {
    /// Profile bytes; empty when no profile is attached.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Profile size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no profile bytes are attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Classification flags.
    #[inline]
    pub fn flags(&self) -> IccFlags {
        self.flags
    }

    /// Replace the classification flags.
    pub fn set_flags(&mut self, flags: IccFlags) {
        self.flags = flags;
    }

    /// Whether the CMYK flag is set.
    #[inline]
    pub fn is_cmyk(&self) -> bool {
        self.flags.contains(IccFlags::CMYK)
    }

    /// Whether the YUV flag is set.
    #[inline]
    pub fn is_yuv(&self) -> bool {
        self.flags.contains(IccFlags::YUV)
    }

    pub(crate) fn replace_data(&mut self, data: &[u8]) -> Result<(), TryReserveError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(data.len())?;
        bytes.extend_from_slice(data);
        self.data = bytes;
        Ok(())
    }

    pub(crate) fn clear_data(&mut self) {
        self.data = Vec::new();
    }
}

/// Logical color layout of a bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ColorType {
    /// Grey ramp, minimum value is white.
    MinIsWhite = 0,
    /// Grey ramp, minimum value is black.
    MinIsBlack = 1,
    /// RGB without alpha.
    Rgb = 2,
    /// Indexed through a non-grey palette.
    Palette = 3,
    /// RGB with alpha.
    RgbAlpha = 4,
    /// CMYK.
    Cmyk = 5,
    /// YUV / YCbCr.
    Yuv = 6,
}

const PHOTOMETRIC_INTERPRETATION: &str = "PhotometricInterpretation";

impl Bitmap<'_> {
    /// Color type, scanning the alpha channel of 32-bpp images.
    pub fn color_type(&self) -> ColorType {
        self.classify(true)
    }

    /// Color type.
    ///
    /// With `scan_alpha`, a 32-bpp generic bitmap with pixels is reported
    /// as [`ColorType::Rgb`] only if every alpha byte is 0xFF. Without it,
    /// such images are assumed to be [`ColorType::RgbAlpha`].
    pub fn classify(&self, scan_alpha: bool) -> ColorType {
        let icc = self.icc_profile();
        match self.image_type() {
            ImageType::Bitmap => {}
            ImageType::Uint16 => {
                // PhotometricInterpretation 0 is min-is-white, 1 min-is-black.
                // The first two bytes are read as a short whatever the tag type.
                return match self
                    .metadata()
                    .get(MetadataModel::ExifMain, PHOTOMETRIC_INTERPRETATION)
                    .and_then(Tag::first_short)
                {
                    Some(0) => ColorType::MinIsWhite,
                    _ => ColorType::MinIsBlack,
                };
            }
            ImageType::Rgb16 | ImageType::Rgb32 | ImageType::RgbF => {
                return if icc.is_yuv() {
                    ColorType::Yuv
                } else {
                    ColorType::Rgb
                };
            }
            ty if ty.has_alpha() => {
                return if icc.is_cmyk() {
                    ColorType::Cmyk
                } else if icc.is_yuv() {
                    ColorType::Yuv
                } else {
                    ColorType::RgbAlpha
                };
            }
            _ => return ColorType::MinIsBlack,
        }

        match self.bpp() {
            1 => classify_bilevel(self.palette()),
            4 | 8 => classify_grey_ramp(self.palette()),
            16 | 24 => {
                if icc.is_yuv() {
                    ColorType::Yuv
                } else {
                    ColorType::Rgb
                }
            }
            32 => {
                if icc.is_cmyk() {
                    ColorType::Cmyk
                } else if icc.is_yuv() {
                    ColorType::Yuv
                } else if scan_alpha && self.has_pixels() {
                    if self.has_translucent_pixel() {
                        ColorType::RgbAlpha
                    } else {
                        ColorType::Rgb
                    }
                } else {
                    ColorType::RgbAlpha
                }
            }
            _ => ColorType::MinIsBlack,
        }
    }

    /// Whether any 32-bpp pixel has alpha other than 0xFF.
    fn has_translucent_pixel(&self) -> bool {
        if let Some(view) = self.bgra8_view() {
            return view.rows().any(|row| row.iter().any(|px| px.a != 0xFF));
        }
        // unaligned external pitch: walk raw rows
        (0..self.height()).any(|y| {
            self.scanline(y)
                .is_some_and(|row| row.chunks_exact(4).any(|px| px[3] != 0xFF))
        })
    }
}

fn is_black(entry: &crate::PaletteEntry) -> bool {
    entry.r == 0 && entry.g == 0 && entry.b == 0
}

fn is_white(entry: &crate::PaletteEntry) -> bool {
    entry.r == 255 && entry.g == 255 && entry.b == 255
}

fn classify_bilevel(palette: &[crate::PaletteEntry]) -> ColorType {
    match palette {
        [first, second, ..] if is_black(first) && is_white(second) => ColorType::MinIsBlack,
        [first, second, ..] if is_white(first) && is_black(second) => ColorType::MinIsWhite,
        _ => ColorType::Palette,
    }
}

/// Grey-ramp test over the used palette entries.
///
/// Each entry must be grey. An entry that is off the forward ramp must sit
/// on the reversed ramp (`count - 1 - i`); any such entry flips the result
/// to min-is-white. Entries are checked one at a time, so a palette mixing
/// forward and reversed positions is still accepted.
fn classify_grey_ramp(palette: &[crate::PaletteEntry]) -> ColorType {
    let count = palette.len();
    let mut min_is_black = true;
    for (i, entry) in palette.iter().enumerate() {
        if entry.r != entry.g || entry.r != entry.b {
            return ColorType::Palette;
        }
        let value = usize::from(entry.r);
        if value != i {
            if count - i - 1 != value {
                return ColorType::Palette;
            }
            min_is_black = false;
        }
    }
    if min_is_black {
        ColorType::MinIsBlack
    } else {
        ColorType::MinIsWhite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaletteEntry;
    use crate::metadata::MetadataContext;

    fn grey(v: u8) -> PaletteEntry {
        PaletteEntry {
            b: v,
            g: v,
            r: v,
            a: 0,
        }
    }

    #[test]
    fn icc_flags_ops() {
        let mut flags = IccFlags::NONE;
        assert!(!flags.contains(IccFlags::CMYK));
        flags |= IccFlags::CMYK;
        assert!(flags.contains(IccFlags::CMYK));
        assert!(!flags.contains(IccFlags::YUV));
        flags.set(IccFlags::YUV, true);
        assert_eq!(flags, IccFlags::CMYK | IccFlags::YUV);
        flags.set(IccFlags::CMYK, false);
        assert_eq!(flags.bits(), 0x02);
        assert_eq!(IccFlags::from_bits(0x01), IccFlags::CMYK);
    }

    #[test]
    fn icc_profile_data_and_flags_are_independent() {
        let mut icc = IccProfile::default();
        icc.set_flags(IccFlags::CMYK);
        icc.replace_data(b"profile").unwrap();
        assert_eq!(icc.data(), b"profile");
        assert_eq!(icc.len(), 7);
        icc.clear_data();
        assert!(icc.is_empty());
        assert!(icc.is_cmyk());
    }

    #[test]
    fn default_8bpp_is_min_is_black() {
        let bitmap = Bitmap::new(4, 4, 8).unwrap();
        assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);
    }

    #[test]
    fn reversed_8bpp_ramp_is_min_is_white() {
        let mut bitmap = Bitmap::new(4, 4, 8).unwrap();
        for (i, entry) in bitmap.palette_mut().iter_mut().enumerate() {
            *entry = grey(255 - i as u8);
        }
        assert_eq!(bitmap.color_type(), ColorType::MinIsWhite);
    }

    #[test]
    fn coloured_or_broken_ramp_is_palette() {
        let mut bitmap = Bitmap::new(4, 4, 8).unwrap();
        bitmap.palette_mut()[10].r = 11;
        assert_eq!(bitmap.color_type(), ColorType::Palette);

        let mut bitmap = Bitmap::new(4, 4, 8).unwrap();
        bitmap.palette_mut()[10] = grey(100);
        assert_eq!(bitmap.color_type(), ColorType::Palette);
    }

    #[test]
    fn mixed_forward_and_reversed_ramp_is_accepted() {
        // 16 entries: first half forward, second half reversed positions.
        // entry 8 holds 7 (15 - 8), entry 9 holds 6, and so on.
        let mut bitmap = Bitmap::new(4, 4, 4).unwrap();
        for (i, entry) in bitmap.palette_mut().iter_mut().enumerate() {
            *entry = if i < 8 { grey(i as u8) } else { grey(15 - i as u8) };
        }
        assert_eq!(bitmap.color_type(), ColorType::MinIsWhite);
    }

    #[test]
    fn bilevel_palettes() {
        let mut bitmap = Bitmap::new(8, 1, 1).unwrap();
        bitmap.palette_mut()[0] = grey(0);
        bitmap.palette_mut()[1] = grey(255);
        assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);

        bitmap.palette_mut()[0] = grey(255);
        bitmap.palette_mut()[1] = grey(0);
        assert_eq!(bitmap.color_type(), ColorType::MinIsWhite);

        bitmap.palette_mut()[1] = grey(128);
        assert_eq!(bitmap.color_type(), ColorType::Palette);

        // a fresh 1-bpp palette is all black
        let fresh = Bitmap::new(8, 1, 1).unwrap();
        assert_eq!(fresh.color_type(), ColorType::Palette);
    }

    #[test]
    fn high_colour_depths() {
        let mut rgb = Bitmap::new(2, 2, 24).unwrap();
        assert_eq!(rgb.color_type(), ColorType::Rgb);
        rgb.set_icc_flags(IccFlags::YUV);
        assert_eq!(rgb.color_type(), ColorType::Yuv);

        let rgb565 = Bitmap::new(2, 2, 16).unwrap();
        assert_eq!(rgb565.color_type(), ColorType::Rgb);

        let two_bit = Bitmap::new(2, 2, 2).unwrap();
        assert_eq!(two_bit.color_type(), ColorType::MinIsBlack);
    }

    #[test]
    fn alpha_scan_on_32bpp() {
        let mut bitmap = Bitmap::new(3, 2, 32).unwrap();
        // zeroed pixels have alpha 0
        assert_eq!(bitmap.classify(true), ColorType::RgbAlpha);
        assert_eq!(bitmap.classify(false), ColorType::RgbAlpha);

        for y in 0..2 {
            for px in bitmap.scanline_mut(y).unwrap().chunks_exact_mut(4) {
                px[3] = 0xFF;
            }
        }
        assert_eq!(bitmap.classify(true), ColorType::Rgb);
        assert_eq!(bitmap.classify(false), ColorType::RgbAlpha);

        bitmap.set_icc_flags(IccFlags::YUV);
        assert_eq!(bitmap.color_type(), ColorType::Yuv);
        bitmap.set_icc_flags(IccFlags::CMYK | IccFlags::YUV);
        assert_eq!(bitmap.color_type(), ColorType::Cmyk);
    }

    #[test]
    fn alpha_scan_on_unaligned_external_pitch() {
        // pitch 13 is not a multiple of 4, so the typed view is unavailable
        let mut bytes = [0xFFu8; 13 * 2];
        let desc = crate::BitmapDesc::new(3, 2, 32);
        let bitmap = Bitmap::wrap_external(&desc, &mut bytes, 13).unwrap();
        assert!(bitmap.bgra8_view().is_none());
        assert_eq!(bitmap.color_type(), ColorType::Rgb);
    }

    #[test]
    fn header_only_32bpp_skips_scan() {
        let bitmap = Bitmap::new_header(ImageType::Bitmap, 3, 2, 32).unwrap();
        assert_eq!(bitmap.classify(true), ColorType::RgbAlpha);
    }

    #[test]
    fn uint16_uses_photometric_tag() {
        let cx = MetadataContext::default();
        let mut bitmap = Bitmap::new_typed(ImageType::Uint16, 2, 2, 0).unwrap();
        assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);

        let tag = Tag::shorts(PHOTOMETRIC_INTERPRETATION, &[0]);
        bitmap
            .metadata_mut()
            .insert(&cx, MetadataModel::ExifMain, PHOTOMETRIC_INTERPRETATION, &tag)
            .unwrap();
        assert_eq!(bitmap.color_type(), ColorType::MinIsWhite);

        let tag = Tag::shorts(PHOTOMETRIC_INTERPRETATION, &[1]);
        bitmap
            .metadata_mut()
            .insert(&cx, MetadataModel::ExifMain, PHOTOMETRIC_INTERPRETATION, &tag)
            .unwrap();
        assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);

        // a long zero still reads as a zero short
        let tag = Tag::longs(PHOTOMETRIC_INTERPRETATION, &[0]);
        bitmap
            .metadata_mut()
            .insert(&cx, MetadataModel::ExifMain, PHOTOMETRIC_INTERPRETATION, &tag)
            .unwrap();
        assert_eq!(bitmap.color_type(), ColorType::MinIsWhite);
    }

    #[test]
    fn typed_images() {
        let mut rgba = Bitmap::new_typed(ImageType::Rgba16, 1, 1, 0).unwrap();
        assert_eq!(rgba.color_type(), ColorType::RgbAlpha);
        rgba.set_icc_flags(IccFlags::YUV);
        assert_eq!(rgba.color_type(), ColorType::Yuv);
        rgba.set_icc_flags(IccFlags::CMYK);
        assert_eq!(rgba.color_type(), ColorType::Cmyk);

        let mut rgbf = Bitmap::new_typed(ImageType::RgbF, 1, 1, 0).unwrap();
        assert_eq!(rgbf.color_type(), ColorType::Rgb);
        rgbf.set_icc_flags(IccFlags::CMYK);
        assert_eq!(rgbf.color_type(), ColorType::Rgb);
        rgbf.set_icc_flags(IccFlags::YUV);
        assert_eq!(rgbf.color_type(), ColorType::Yuv);

        for ty in [ImageType::Float, ImageType::Complex, ImageType::Int32] {
            let bitmap = Bitmap::new_typed(ty, 1, 1, 0).unwrap();
            assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);
        }
    }
}
