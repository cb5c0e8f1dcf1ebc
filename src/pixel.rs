//! Element types and channel descriptions.
//!
//! [`ImageType`] is the closed set of pixel element types a
//! [`Bitmap`](crate::Bitmap) can carry. Everything except the generic
//! [`ImageType::Bitmap`] has a fixed native bit depth.

/// Palette entry in the legacy blue, green, red, reserved byte order.
pub type PaletteEntry = rgb::alt::BGRA<u8>;

/// Pixel element type of a bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
#[repr(u8)]
pub enum ImageType {
    /// Unknown or unsupported type. Cannot be allocated.
    #[default]
    Unknown = 0,
    /// Generic bitmap: 1, 2, 4, 8, 16, 24 or 32 bits per pixel.
    Bitmap = 1,
    /// Array of unsigned 16-bit integers.
    Uint16 = 2,
    /// Array of signed 16-bit integers.
    Int16 = 3,
    /// Array of unsigned 32-bit integers.
    Uint32 = 4,
    /// Array of signed 32-bit integers.
    Int32 = 5,
    /// Array of 32-bit floats.
    Float = 6,
    /// Array of 64-bit floats.
    Double = 7,
    /// Array of complex numbers made of two 64-bit floats.
    Complex = 8,
    /// 48-bit RGB image, 16 bits per channel.
    Rgb16 = 9,
    /// 64-bit RGBA image, 16 bits per channel.
    Rgba16 = 10,
    /// 96-bit RGB image, 32-bit float per channel.
    RgbF = 11,
    /// 128-bit RGBA image, 32-bit float per channel.
    RgbaF = 12,
    /// Array of complex numbers made of two 32-bit floats.
    ComplexF = 13,
    /// 96-bit RGB image, 32-bit unsigned integer per channel.
    Rgb32 = 14,
    /// 128-bit RGBA image, 32-bit unsigned integer per channel.
    Rgba32 = 15,
}

impl ImageType {
    /// Fixed bit depth of this element type.
    ///
    /// `None` for [`Bitmap`](Self::Bitmap), whose depth is caller-chosen,
    /// and for [`Unknown`](Self::Unknown).
    pub const fn native_bpp(self) -> Option<u32> {
        match self {
            Self::Unknown | Self::Bitmap => None,
            Self::Uint16 | Self::Int16 => Some(16),
            Self::Uint32 | Self::Int32 | Self::Float => Some(32),
            Self::Double | Self::ComplexF | Self::Rgba16 => Some(64),
            Self::Rgb16 => Some(48),
            Self::RgbF | Self::Rgb32 => Some(96),
            Self::Complex | Self::RgbaF | Self::Rgba32 => Some(128),
        }
    }

    /// Whether the type carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba16 | Self::Rgba32 | Self::RgbaF)
    }
}

/// Resolve the bit depth a bitmap of `image_type` is stored with.
///
/// Generic bitmaps accept 1, 2, 4, 8, 16, 24 and 32 bpp and coerce any other
/// request to 8. Other types always use their native depth.
pub(crate) fn resolve_bpp(image_type: ImageType, requested: u32) -> Option<u32> {
    match image_type {
        ImageType::Unknown => None,
        ImageType::Bitmap => Some(match requested {
            1 | 2 | 4 | 8 | 16 | 24 | 32 => requested,
            _ => 8,
        }),
        other => other.native_bpp(),
    }
}

/// Red, green and blue bit masks of a 16-bit generic bitmap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMasks {
    /// Bits holding the red component.
    pub red: u32,
    /// Bits holding the green component.
    pub green: u32,
    /// Bits holding the blue component.
    pub blue: u32,
}

impl ChannelMasks {
    /// 5-6-5 layout.
    pub const RGB565: Self = Self {
        red: 0xF800,
        green: 0x07E0,
        blue: 0x001F,
    };

    /// 5-5-5 layout, top bit unused.
    pub const RGB555: Self = Self {
        red: 0x7C00,
        green: 0x03E0,
        blue: 0x001F,
    };

    /// Masks implied by 24 and 32 bpp generic bitmaps (BGR(A) byte order).
    pub const BGRA8: Self = Self {
        red: 0x00FF_0000,
        green: 0x0000_FF00,
        blue: 0x0000_00FF,
    };

    /// No masks.
    pub const NONE: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
    };

    /// Create masks from individual channel masks.
    pub const fn new(red: u32, green: u32, blue: u32) -> Self {
        Self { red, green, blue }
    }
}
