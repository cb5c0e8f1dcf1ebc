//! Owned raster bitmaps with a legacy DIB-compatible layout.
//!
//! This crate defines the in-memory bitmap handle shared by image codecs
//! and processing code:
//!
//! - [`Bitmap`]: type-tagged pixels, palette or channel masks, ICC profile,
//!   metadata and an owned thumbnail, laid out in one aligned block
//! - [`BitmapDesc`] / [`ResourceLimits`]: allocation requests and caps
//! - [`BlockLayout`] / [`compute_block_size`]: overflow-checked sizing
//! - [`MetadataStore`] / [`Tag`]: per-model tag maps with cursors
//! - [`ColorType`]: logical color classification
//! - [`InfoHeader`]: the legacy `BITMAPINFOHEADER` stored in the block
//!
//! Codecs fill bitmaps; the tag-id table and diagnostic sink used by the
//! metadata store are supplied by the caller through [`MetadataContext`].
//!
//! ```
//! use zenraster::{Bitmap, ColorType, MetadataContext, MetadataModel};
//!
//! let mut bitmap = Bitmap::new(64, 48, 8).unwrap();
//! assert_eq!(bitmap.color_type(), ColorType::MinIsBlack);
//!
//! let cx = MetadataContext::default();
//! bitmap
//!     .metadata_mut()
//!     .set_key_value(&cx, MetadataModel::Comments, "Comment", "grey ramp")
//!     .unwrap();
//!
//! let copy = bitmap.try_clone().unwrap();
//! assert_eq!(copy.metadata().count(MetadataModel::Comments), 1);
//! ```

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod bitmap;
mod block;
mod clone;
mod color;
mod diagnostics;
mod error;
mod info;
mod layout;
mod limits;
mod memory;
mod metadata;
mod pixel;
mod tag;

pub use bitmap::{Bitmap, BitmapDesc};
pub use block::AlignedBlock;
pub use color::{ColorType, IccFlags, IccProfile};
pub use diagnostics::{DiagnosticSink, LogSink, NullSink, Severity};
pub use error::{BitmapError, MetadataError};
pub use info::{BI_BITFIELDS, BI_RGB, DEFAULT_PIXELS_PER_METER, InfoHeader};
pub use layout::{BITMAP_ALIGNMENT, BlockLayout, compute_block_size, palette_entries};
pub use limits::{LimitExceeded, ResourceLimits};
pub use metadata::{
    MetadataContext, MetadataModel, MetadataStore, NoTagLookup, TagCursor, TagLookup, TagMap,
};
pub use pixel::{ChannelMasks, ImageType, PaletteEntry};
pub use tag::{Tag, TagType, UNKNOWN_TAG_ID};

// Re-exports for callers working with pixel views.
pub use imgref::{Img, ImgRef, ImgRefMut};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
