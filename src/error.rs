//! Error types for bitmap allocation and metadata mutation.

use alloc::string::String;

use crate::limits::LimitExceeded;
use crate::pixel::ImageType;

/// Errors from bitmap allocation, wrapping and cloning.
///
/// Every variant is reported before any partially built state escapes:
/// a failed allocation never returns a half-initialized [`Bitmap`](crate::Bitmap).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BitmapError {
    /// Width or height is zero after taking the absolute value.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// An external pixel buffer was supplied with a zero pitch.
    #[error("external pixel buffer supplied without a pitch")]
    MissingPitch,

    /// The external pitch cannot hold one scanline.
    #[error("pitch {pitch} is smaller than the scanline size {line}")]
    StrideTooSmall { pitch: usize, line: usize },

    /// The external pixel buffer is shorter than `pitch * (height - 1) + line`.
    #[error("external buffer holds {actual} bytes, {required} required")]
    InsufficientData { required: usize, actual: usize },

    /// The element type cannot be allocated.
    #[error("unsupported image type: {0:?}")]
    UnsupportedType(ImageType),

    /// The block size would wrap or exceed the address-space margin.
    #[error("block size overflow for {width}x{height} at {bpp} bpp")]
    SizeOverflow { width: u32, height: u32, bpp: u32 },

    /// The underlying allocator could not provide the block.
    #[error("out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },

    /// Block alignment must be a non-zero power of two.
    #[error("alignment {0} is not a power of two")]
    InvalidAlignment(usize),

    /// A configured resource limit rejected the allocation.
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
}

/// Errors from metadata store mutation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum MetadataError {
    /// Declared `count * element width` disagrees with the payload length.
    #[error("invalid data count for tag '{key}': {count} x {width} != {length}")]
    MalformedTag {
        key: String,
        count: u32,
        width: u32,
        length: usize,
    },
}
