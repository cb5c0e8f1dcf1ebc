//! The bitmap handle.
//!
//! A [`Bitmap`] owns a header record (element type, background colour,
//! transparency, ICC profile, metadata, thumbnail) and one
//! [`AlignedBlock`] laid out by [`BlockLayout`]: the legacy info header,
//! the palette or channel masks, then the pixel rows. Every accessor is
//! offset arithmetic over that block.
//!
//! A bitmap may instead wrap a caller-supplied pixel buffer. The lifetime
//! parameter ties the handle to that buffer; owned bitmaps are
//! `Bitmap<'static>`. The wrapped buffer is never freed or reallocated by
//! the handle.
//!
//! Dropping a bitmap releases everything it owns, thumbnail included.

use alloc::boxed::Box;
use core::fmt;

use imgref::{Img, ImgRef, ImgRefMut};
use rgb::FromSlice;
use rgb::alt::BGRA;

use crate::block::AlignedBlock;
use crate::color::{IccFlags, IccProfile};
use crate::error::BitmapError;
use crate::info::{self, BI_BITFIELDS, InfoHeader, field};
use crate::layout::{BITMAP_ALIGNMENT, BlockLayout, INFO_HEADER_SIZE, PALETTE_ENTRY_SIZE, palette_entries};
use crate::limits::ResourceLimits;
use crate::metadata::{MetadataModel, MetadataStore};
use crate::pixel::{ChannelMasks, ImageType, PaletteEntry, resolve_bpp};

/// EXIF-main tag mirroring the attached ICC profile.
const EXIF_ICC_PROFILE_KEY: &str = "InterColorProfile";

/// Handle-owned state that lives outside the aligned block.
pub(crate) struct Header {
    pub(crate) image_type: ImageType,
    /// Alpha is the enabled flag: non-zero when a background colour is set.
    pub(crate) background: PaletteEntry,
    pub(crate) transparent: bool,
    pub(crate) transparency_count: u16,
    pub(crate) transparency_table: [u8; 256],
    pub(crate) icc: IccProfile,
    pub(crate) metadata: MetadataStore,
    pub(crate) has_pixels: bool,
    pub(crate) thumbnail: Option<Box<Bitmap<'static>>>,
}

impl Header {
    fn new(image_type: ImageType, has_pixels: bool) -> Self {
        Self {
            image_type,
            background: PaletteEntry::default(),
            transparent: false,
            transparency_count: 0,
            transparency_table: [0xFF; 256],
            icc: IccProfile::default(),
            metadata: MetadataStore::new(),
            has_pixels,
            thumbnail: None,
        }
    }
}

/// Caller-owned pixel rows.
pub(crate) struct ExternalPixels<'a> {
    pub(crate) bits: &'a mut [u8],
    pub(crate) pitch: usize,
}

/// Allocation request.
///
/// Width and height are signed like the legacy API; their absolute values
/// are used. Generic bitmaps take `bpp` from {1, 2, 4, 8, 16, 24, 32} and
/// fall back to 8 for anything else. Other element types ignore `bpp`.
/// Channel masks are only stored for 16-bpp generic bitmaps.
///
/// # Example
///
/// ```
/// use zenraster::{Bitmap, BitmapDesc, ChannelMasks, ResourceLimits};
///
/// let desc = BitmapDesc::new(320, 240, 16)
///     .with_masks(ChannelMasks::RGB565)
///     .with_limits(ResourceLimits::none().with_max_pixels(1 << 20));
/// let bitmap = Bitmap::allocate(&desc).unwrap();
/// assert_eq!(bitmap.red_mask(), 0xF800);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct BitmapDesc {
    /// Element type.
    pub image_type: ImageType,
    /// Width in pixels; the sign is ignored.
    pub width: i32,
    /// Height in pixels; the sign is ignored.
    pub height: i32,
    /// Requested bit depth.
    pub bpp: u32,
    /// Channel masks for 16-bpp generic bitmaps.
    pub masks: ChannelMasks,
    /// Allocate the header, info block and palette without pixel storage.
    pub header_only: bool,
    /// Caps checked before any memory is touched.
    pub limits: ResourceLimits,
}

impl BitmapDesc {
    /// Generic bitmap of the given shape.
    pub fn new(width: i32, height: i32, bpp: u32) -> Self {
        Self {
            image_type: ImageType::Bitmap,
            width,
            height,
            bpp,
            masks: ChannelMasks::NONE,
            header_only: false,
            limits: ResourceLimits::none(),
        }
    }

    /// Set the element type.
    pub fn with_image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = image_type;
        self
    }

    /// Set the requested bit depth.
    pub fn with_bpp(mut self, bpp: u32) -> Self {
        self.bpp = bpp;
        self
    }

    /// Set the channel masks.
    pub fn with_masks(mut self, masks: ChannelMasks) -> Self {
        self.masks = masks;
        self
    }

    /// Skip pixel storage.
    pub fn with_header_only(mut self, header_only: bool) -> Self {
        self.header_only = header_only;
        self
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    fn dimensions(&self) -> Result<(u32, u32), BitmapError> {
        let width = self.width.unsigned_abs();
        let height = self.height.unsigned_abs();
        // i32::MIN has no positive counterpart in the info header
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(BitmapError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok((width, height))
    }
}

/// Validated shape, ready to allocate.
struct Plan {
    image_type: ImageType,
    width: u32,
    height: u32,
    bpp: u32,
    masks: Option<ChannelMasks>,
    layout: BlockLayout,
}

impl Plan {
    fn new(desc: &BitmapDesc, header_only: bool) -> Result<Self, BitmapError> {
        let (width, height) = desc.dimensions()?;
        let bpp = resolve_bpp(desc.image_type, desc.bpp)
            .ok_or(BitmapError::UnsupportedType(desc.image_type))?;
        let needs_masks = desc.image_type == ImageType::Bitmap && bpp == 16;

        desc.limits.check_shape(width, height).inspect_err(|e| {
            log::debug!("bitmap {width}x{height} rejected: {e}");
        })?;

        let layout = BlockLayout::compute(header_only, width, height, bpp, needs_masks)
            .ok_or_else(|| {
                log::debug!("bitmap {width}x{height} at {bpp} bpp overflows the address space");
                BitmapError::SizeOverflow { width, height, bpp }
            })?;

        desc.limits
            .check_block(layout.total_size() as u64)
            .inspect_err(|e| log::debug!("bitmap {width}x{height} rejected: {e}"))?;

        Ok(Self {
            image_type: desc.image_type,
            width,
            height,
            bpp,
            masks: needs_masks.then_some(desc.masks),
            layout,
        })
    }

    /// Allocate and initialize the block.
    fn allocate(&self) -> Result<AlignedBlock, BitmapError> {
        let mut block = AlignedBlock::allocate(self.layout.block_len(), BITMAP_ALIGNMENT)
            .inspect_err(|e| log::debug!("bitmap block allocation failed: {e}"))?;
        let bytes = block.as_mut_slice();

        let colors = palette_entries(self.bpp) as u32;
        InfoHeader::new(self.width, self.height, self.bpp, self.masks.is_some(), colors)
            .write(&mut bytes[self.layout.info_offset()..]);

        let extra_start = self.layout.extra_offset();
        let extra = &mut bytes[extra_start..extra_start + self.layout.extra_len()];
        if let Some(masks) = self.masks {
            info::put_u32(extra, 0, masks.red);
            info::put_u32(extra, 4, masks.green);
            info::put_u32(extra, 8, masks.blue);
        }
        if self.bpp == 8 {
            for (i, entry) in extra.as_bgra_mut().iter_mut().enumerate() {
                let v = i as u8;
                entry.r = v;
                entry.g = v;
                entry.b = v;
            }
        }
        Ok(block)
    }
}

/// A raster image with its palette, ICC profile, metadata and thumbnail.
pub struct Bitmap<'a> {
    pub(crate) header: Header,
    pub(crate) layout: BlockLayout,
    pub(crate) block: AlignedBlock,
    pub(crate) external: Option<ExternalPixels<'a>>,
}

impl Bitmap<'static> {
    /// Allocate a generic bitmap with zeroed pixels.
    ///
    /// 16-bpp bitmaps get zero channel masks; use [`allocate`](Self::allocate)
    /// with [`BitmapDesc::with_masks`] to set them.
    pub fn new(width: i32, height: i32, bpp: u32) -> Result<Self, BitmapError> {
        Self::allocate(&BitmapDesc::new(width, height, bpp))
    }

    /// Allocate a bitmap of any element type.
    pub fn new_typed(
        image_type: ImageType,
        width: i32,
        height: i32,
        bpp: u32,
    ) -> Result<Self, BitmapError> {
        Self::allocate(&BitmapDesc::new(width, height, bpp).with_image_type(image_type))
    }

    /// Allocate header, info block and palette only, without pixel storage.
    pub fn new_header(
        image_type: ImageType,
        width: i32,
        height: i32,
        bpp: u32,
    ) -> Result<Self, BitmapError> {
        Self::allocate(
            &BitmapDesc::new(width, height, bpp)
                .with_image_type(image_type)
                .with_header_only(true),
        )
    }

    /// Allocate a bitmap from a full description.
    ///
    /// The whole block is zeroed. 8-bpp bitmaps get a linear grey palette,
    /// resolution defaults to 72 dpi, the transparency table is all 0xFF.
    ///
    /// # Errors
    ///
    /// Invalid dimensions, unsupported element type, size overflow,
    /// exceeded limits or allocator failure. Nothing is allocated on the
    /// validation paths.
    pub fn allocate(desc: &BitmapDesc) -> Result<Self, BitmapError> {
        let plan = Plan::new(desc, desc.header_only)?;
        let block = plan.allocate()?;
        Ok(Self {
            header: Header::new(plan.image_type, !desc.header_only),
            layout: plan.layout,
            block,
            external: None,
        })
    }
}

impl<'a> Bitmap<'a> {
    /// Wrap caller-owned pixel rows.
    ///
    /// Only the header, info block and palette are allocated. `pitch` is
    /// used verbatim and need not be aligned. `desc.header_only` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`BitmapError::MissingPitch`] for a zero pitch,
    /// [`BitmapError::StrideTooSmall`] if `pitch` cannot hold a scanline,
    /// [`BitmapError::InsufficientData`] if `bits` is shorter than
    /// `pitch * (height - 1) + line`, plus every [`allocate`](Bitmap::allocate)
    /// error.
    pub fn wrap_external(
        desc: &BitmapDesc,
        bits: &'a mut [u8],
        pitch: usize,
    ) -> Result<Self, BitmapError> {
        desc.dimensions()?;
        if pitch == 0 {
            return Err(BitmapError::MissingPitch);
        }
        let plan = Plan::new(desc, true)?;

        let line = plan.layout.line();
        if pitch < line {
            return Err(BitmapError::StrideTooSmall { pitch, line });
        }
        let required = pitch
            .checked_mul(plan.height as usize - 1)
            .and_then(|rows| rows.checked_add(line))
            .ok_or(BitmapError::SizeOverflow {
                width: plan.width,
                height: plan.height,
                bpp: plan.bpp,
            })?;
        if bits.len() < required {
            return Err(BitmapError::InsufficientData {
                required,
                actual: bits.len(),
            });
        }

        let block = plan.allocate()?;
        Ok(Self {
            header: Header::new(plan.image_type, true),
            layout: plan.layout,
            block,
            external: Some(ExternalPixels { bits, pitch }),
        })
    }

    /// Release the bitmap and everything it owns.
    ///
    /// Equivalent to dropping it. A wrapped external buffer is left alone.
    pub fn unload(self) {}

    fn info(&self) -> &[u8] {
        let at = self.layout.info_offset();
        &self.block.as_slice()[at..at + INFO_HEADER_SIZE]
    }

    fn info_mut(&mut self) -> &mut [u8] {
        let at = self.layout.info_offset();
        &mut self.block.as_mut_slice()[at..at + INFO_HEADER_SIZE]
    }

    // ---- shape ----

    /// Element type.
    #[inline]
    pub fn image_type(&self) -> ImageType {
        self.header.image_type
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        info::u32_at(self.info(), field::WIDTH)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        info::u32_at(self.info(), field::HEIGHT)
    }

    /// Bits per pixel.
    pub fn bpp(&self) -> u32 {
        u32::from(info::u16_at(self.info(), field::BIT_COUNT))
    }

    /// Bytes of pixel data per scanline, without padding.
    #[inline]
    pub fn line(&self) -> usize {
        self.layout.line()
    }

    /// Byte stride between scanlines.
    ///
    /// A multiple of 4 for owned pixels; the caller's pitch for wrapped ones.
    pub fn pitch(&self) -> usize {
        match &self.external {
            Some(ext) => ext.pitch,
            None => self.layout.pitch(),
        }
    }

    /// Palette entries in use.
    pub fn colors_used(&self) -> u32 {
        info::u32_at(self.info(), field::COLORS_USED)
    }

    /// Number of samples per pixel.
    pub fn channels(&self) -> u32 {
        match self.image_type() {
            ImageType::Bitmap => match self.bpp() {
                32 => 4,
                24 => 3,
                _ => 1,
            },
            ImageType::Rgb16 | ImageType::Rgb32 | ImageType::RgbF => 3,
            ty if ty.has_alpha() => 4,
            ImageType::Complex | ImageType::ComplexF => 2,
            _ => 1,
        }
    }

    /// Block layout computed at allocation time.
    #[inline]
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    // ---- info block ----

    /// Decoded legacy info header.
    pub fn info_header(&self) -> InfoHeader {
        InfoHeader::decode(self.info())
    }

    /// Raw info header followed by the palette or channel masks, as stored.
    pub fn info_block(&self) -> &[u8] {
        let start = self.layout.info_offset();
        let end = self.layout.extra_offset() + self.layout.extra_len();
        &self.block.as_slice()[start..end]
    }

    /// Size of the equivalent packed DIB: info header, palette and rows.
    pub fn dib_size(&self) -> usize {
        INFO_HEADER_SIZE
            + self.colors_used() as usize * PALETTE_ENTRY_SIZE
            + self.pitch() * self.height() as usize
    }

    /// Horizontal resolution in pixels per meter.
    pub fn dots_per_meter_x(&self) -> u32 {
        info::u32_at(self.info(), field::X_PELS)
    }

    /// Vertical resolution in pixels per meter.
    pub fn dots_per_meter_y(&self) -> u32 {
        info::u32_at(self.info(), field::Y_PELS)
    }

    /// Set horizontal resolution in pixels per meter.
    pub fn set_dots_per_meter_x(&mut self, res: u32) {
        info::put_u32(self.info_mut(), field::X_PELS, res);
    }

    /// Set vertical resolution in pixels per meter.
    pub fn set_dots_per_meter_y(&mut self, res: u32) {
        info::put_u32(self.info_mut(), field::Y_PELS, res);
    }

    // ---- palette and masks ----

    fn palette_range(&self) -> core::ops::Range<usize> {
        let start = self.layout.extra_offset();
        start..start + palette_entries(self.bpp()) * PALETTE_ENTRY_SIZE
    }

    /// Palette; empty for depths of 16 bpp and more.
    pub fn palette(&self) -> &[PaletteEntry] {
        let range = self.palette_range();
        self.block.as_slice()[range].as_bgra()
    }

    /// Palette, mutably.
    pub fn palette_mut(&mut self) -> &mut [PaletteEntry] {
        let range = self.palette_range();
        self.block.as_mut_slice()[range].as_bgra_mut()
    }

    /// Whether channel masks are stored after the info header.
    pub fn has_channel_masks(&self) -> bool {
        info::u32_at(self.info(), field::COMPRESSION) == BI_BITFIELDS
    }

    /// Channel masks.
    ///
    /// Stored masks for 16-bpp generic bitmaps, the BGR(A) byte masks for
    /// 24 and 32 bpp, zero otherwise.
    pub fn channel_masks(&self) -> ChannelMasks {
        if self.image_type() != ImageType::Bitmap {
            return ChannelMasks::NONE;
        }
        if self.has_channel_masks() {
            let at = self.layout.extra_offset();
            let masks = &self.block.as_slice()[at..at + 12];
            return ChannelMasks::new(
                info::u32_at(masks, 0),
                info::u32_at(masks, 4),
                info::u32_at(masks, 8),
            );
        }
        if self.bpp() >= 24 {
            ChannelMasks::BGRA8
        } else {
            ChannelMasks::NONE
        }
    }

    /// Red channel mask.
    pub fn red_mask(&self) -> u32 {
        self.channel_masks().red
    }

    /// Green channel mask.
    pub fn green_mask(&self) -> u32 {
        self.channel_masks().green
    }

    /// Blue channel mask.
    pub fn blue_mask(&self) -> u32 {
        self.channel_masks().blue
    }

    // ---- pixels ----

    /// Whether the bitmap carries pixel data.
    #[inline]
    pub fn has_pixels(&self) -> bool {
        self.header.has_pixels
    }

    /// Whether pixels live in a caller-supplied buffer.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    /// Pixel rows, bottom-up in pitch steps.
    ///
    /// The owned region is `pitch * height` bytes starting on a 16-byte
    /// boundary. A wrapped buffer is returned whole. `None` for header-only
    /// bitmaps.
    pub fn bits(&self) -> Option<&[u8]> {
        if !self.header.has_pixels {
            return None;
        }
        Some(match &self.external {
            Some(ext) => &ext.bits[..],
            None => &self.block.as_slice()[self.layout.pixels_offset()..],
        })
    }

    /// Pixel rows, mutably.
    pub fn bits_mut(&mut self) -> Option<&mut [u8]> {
        if !self.header.has_pixels {
            return None;
        }
        let start = self.layout.pixels_offset();
        Some(match &mut self.external {
            Some(ext) => &mut ext.bits[..],
            None => &mut self.block.as_mut_slice()[start..],
        })
    }

    fn row_range(&self, y: u32) -> Option<core::ops::Range<usize>> {
        if y >= self.height() {
            return None;
        }
        let start = y as usize * self.pitch();
        Some(start..start + self.line())
    }

    /// Scanline `y`, `line()` bytes long.
    pub fn scanline(&self, y: u32) -> Option<&[u8]> {
        let range = self.row_range(y)?;
        self.bits()?.get(range)
    }

    /// Scanline `y`, mutably.
    pub fn scanline_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        let range = self.row_range(y)?;
        self.bits_mut()?.get_mut(range)
    }

    /// Bytes spanned by the rows: `pitch * (height - 1) + line`.
    fn rows_len(&self) -> usize {
        self.pitch() * (self.height() as usize - 1) + self.line()
    }

    fn bgra8_shape(&self) -> Option<(usize, usize, usize)> {
        let pitch = self.pitch();
        if self.image_type() != ImageType::Bitmap || self.bpp() != 32 || pitch % 4 != 0 {
            return None;
        }
        Some((self.width() as usize, self.height() as usize, pitch / 4))
    }

    /// Typed view of a 32-bpp generic bitmap.
    ///
    /// `None` for other layouts, for header-only bitmaps and for wrapped
    /// buffers whose pitch is not a multiple of 4.
    pub fn bgra8_view(&self) -> Option<ImgRef<'_, BGRA<u8>>> {
        let (width, height, stride) = self.bgra8_shape()?;
        let len = self.rows_len();
        let bits = self.bits()?.get(..len)?;
        Some(Img::new_stride(bits.as_bgra(), width, height, stride))
    }

    /// Mutable typed view of a 32-bpp generic bitmap.
    pub fn bgra8_view_mut(&mut self) -> Option<ImgRefMut<'_, BGRA<u8>>> {
        let (width, height, stride) = self.bgra8_shape()?;
        let len = self.rows_len();
        let bits = self.bits_mut()?.get_mut(..len)?;
        Some(Img::new_stride(bits.as_bgra_mut(), width, height, stride))
    }

    // ---- background ----

    /// Whether a background colour is set.
    #[inline]
    pub fn has_background_color(&self) -> bool {
        self.header.background.a != 0
    }

    /// Background colour.
    ///
    /// For 8-bpp bitmaps the alpha byte holds the index of the first
    /// palette entry with the same colour, or 0 if none matches. Other
    /// depths always report alpha 0.
    pub fn background_color(&self) -> Option<PaletteEntry> {
        if !self.has_background_color() {
            return None;
        }
        let stored = self.header.background;
        let mut color = PaletteEntry { a: 0, ..stored };
        if self.bpp() == 8
            && let Some(index) = self
                .palette()
                .iter()
                .position(|p| p.r == stored.r && p.g == stored.g && p.b == stored.b)
        {
            color.a = index as u8;
        }
        Some(color)
    }

    /// Set or clear the background colour. The alpha of `color` is ignored.
    pub fn set_background_color(&mut self, color: Option<PaletteEntry>) {
        self.header.background = match color {
            Some(color) => PaletteEntry { a: 1, ..color },
            None => PaletteEntry::default(),
        };
    }

    // ---- transparency ----

    /// Whether the bitmap should be treated as transparent.
    ///
    /// 32-bpp generic bitmaps are transparent when alpha-scanning
    /// classification says RGB-with-alpha. 16-bit and float RGBA are
    /// transparent unless flagged CMYK; 32-bit integer RGBA never is. Other
    /// generic depths report the stored flag.
    pub fn is_transparent(&self) -> bool {
        match self.image_type() {
            ImageType::Bitmap => {
                if self.bpp() == 32 {
                    self.color_type() == crate::ColorType::RgbAlpha
                } else {
                    self.header.transparent
                }
            }
            ImageType::Rgba16 | ImageType::RgbaF => !self.header.icc.is_cmyk(),
            _ => false,
        }
    }

    /// Set the transparency flag. Only honoured at 8 bpp or less and at 32
    /// bpp; other depths always clear it.
    pub fn set_transparent(&mut self, enabled: bool) {
        let bpp = self.bpp();
        self.header.transparent = enabled && (bpp <= 8 || bpp == 32);
    }

    /// Per-palette-index alpha values in use.
    pub fn transparency_table(&self) -> &[u8] {
        &self.header.transparency_table[..usize::from(self.header.transparency_count)]
    }

    /// Entries in the transparency table.
    #[inline]
    pub fn transparency_count(&self) -> u32 {
        u32::from(self.header.transparency_count)
    }

    /// Replace the transparency table of a palettized bitmap.
    ///
    /// `count` is clamped to 0..=256. Entries not covered by `table` become
    /// 0xFF. The transparency flag is set when `count > 0`. No effect above
    /// 8 bpp.
    pub fn set_transparency_table(&mut self, table: Option<&[u8]>, count: i32) {
        if self.bpp() > 8 {
            return;
        }
        let count = count.clamp(0, 256) as usize;
        let header = &mut self.header;
        header.transparent = count > 0;
        header.transparency_count = count as u16;
        let copied = table.map_or(0, |t| t.len().min(count));
        if let Some(table) = table {
            header.transparency_table[..copied].copy_from_slice(&table[..copied]);
        }
        header.transparency_table[copied..count].fill(0xFF);
    }

    /// Make palette entry `index` the only transparent one.
    ///
    /// Out-of-range indices leave every entry opaque. No effect on bitmaps
    /// without a palette.
    pub fn set_transparent_index(&mut self, index: i32) {
        let count = self.colors_used() as usize;
        if count == 0 {
            return;
        }
        let mut table = [0xFFu8; 256];
        if let Ok(index) = usize::try_from(index)
            && index < count
        {
            table[index] = 0;
        }
        self.set_transparency_table(Some(&table[..count]), count as i32);
    }

    /// First fully transparent palette index.
    pub fn transparent_index(&self) -> Option<usize> {
        self.transparency_table().iter().position(|&alpha| alpha == 0)
    }

    // ---- ICC profile ----

    /// ICC profile slot.
    #[inline]
    pub fn icc_profile(&self) -> &IccProfile {
        &self.header.icc
    }

    /// Replace the ICC profile bytes. Flags are preserved.
    ///
    /// Also drops the EXIF-main `InterColorProfile` tag.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfMemory`] if the copy cannot be allocated; the
    /// profile is then left empty.
    pub fn create_icc_profile(&mut self, data: &[u8]) -> Result<&IccProfile, BitmapError> {
        self.destroy_icc_profile();
        self.header
            .icc
            .replace_data(data)
            .map_err(|_| BitmapError::OutOfMemory { bytes: data.len() })?;
        Ok(&self.header.icc)
    }

    /// Drop the ICC profile bytes and the EXIF-main `InterColorProfile`
    /// tag. Flags are preserved.
    pub fn destroy_icc_profile(&mut self) {
        self.header.icc.clear_data();
        self.header
            .metadata
            .remove(MetadataModel::ExifMain, EXIF_ICC_PROFILE_KEY);
    }

    /// Replace the ICC classification flags.
    pub fn set_icc_flags(&mut self, flags: IccFlags) {
        self.header.icc.set_flags(flags);
    }

    // ---- metadata ----

    /// Metadata store.
    #[inline]
    pub fn metadata(&self) -> &MetadataStore {
        &self.header.metadata
    }

    /// Metadata store, mutably.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.header.metadata
    }

    // ---- thumbnail ----

    /// Attached thumbnail.
    pub fn thumbnail(&self) -> Option<&Bitmap<'static>> {
        self.header.thumbnail.as_deref()
    }

    /// Replace the thumbnail with a deep copy of `source`.
    ///
    /// The previous thumbnail is released first. A missing source, or one
    /// without pixels, leaves no thumbnail.
    ///
    /// # Errors
    ///
    /// Any [`try_clone`](Self::try_clone) error; the thumbnail is then
    /// left empty.
    pub fn set_thumbnail(&mut self, source: Option<&Bitmap<'_>>) -> Result<(), BitmapError> {
        self.header.thumbnail = None;
        if let Some(source) = source.filter(|s| s.has_pixels()) {
            self.header.thumbnail = Some(Box::new(source.try_clone()?));
        }
        Ok(())
    }
}

impl fmt::Debug for Bitmap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("image_type", &self.image_type())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("bpp", &self.bpp())
            .field("pitch", &self.pitch())
            .field("has_pixels", &self.has_pixels())
            .field("external", &self.is_external())
            .field("thumbnail", &self.header.thumbnail.is_some())
            .finish_non_exhaustive()
    }
}
