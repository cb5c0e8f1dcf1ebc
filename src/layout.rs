//! Block layout and overflow-checked size calculation.
//!
//! A bitmap's backing block is laid out as
//!
//! ```text
//! [header record][pad][info header][palette | masks][pad][pixels ...]
//!  ^ handle        ^ aligned        ^ aligned              ^ aligned
//! ```
//!
//! The header record lives in the [`Bitmap`](crate::Bitmap) handle itself; the
//! rest is one [`AlignedBlock`](crate::AlignedBlock). [`BlockLayout`] is
//! computed once at allocation time and every typed accessor reads through
//! its offsets.

/// Alignment of the info header end, the palette and the first scanline.
pub const BITMAP_ALIGNMENT: usize = 16;

/// Size of the legacy `BITMAPINFOHEADER` record.
pub const INFO_HEADER_SIZE: usize = 40;

/// Size of the three `u32` channel masks stored after the info header.
pub const MASKS_SIZE: usize = 12;

/// Size of one palette entry.
pub const PALETTE_ENTRY_SIZE: usize = 4;

/// Number of palette entries implied by a bit depth.
///
/// `1 << bpp` for depths 1 to 8, zero for everything deeper.
pub const fn palette_entries(bpp: u32) -> usize {
    if bpp >= 1 && bpp <= 8 { 1 << bpp } else { 0 }
}

/// Bytes needed for one scanline without padding: `ceil(width * bpp / 8)`.
pub const fn line_bytes(width: u32, bpp: u32) -> u64 {
    (width as u64 * bpp as u64).div_ceil(8)
}

/// Scanline stride padded up to a 4-byte boundary.
pub const fn aligned_pitch(line: u64) -> u64 {
    (line + 3) & !3
}

/// Offsets of every region of a bitmap block.
///
/// Offsets are relative to the start of the aligned block, which begins
/// right after the header record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    header_len: usize,
    info_offset: usize,
    extra_offset: usize,
    extra_len: usize,
    pixels_offset: usize,
    pixels_len: usize,
    line: usize,
    pitch: usize,
}

impl BlockLayout {
    /// Compute the layout against the host address space.
    ///
    /// Returns `None` when the size would wrap or come within
    /// `8 * BITMAP_ALIGNMENT` bytes of `usize::MAX`.
    pub fn compute(
        header_only: bool,
        width: u32,
        height: u32,
        bpp: u32,
        needs_masks: bool,
    ) -> Option<Self> {
        Self::compute_with_max(header_only, width, height, bpp, needs_masks, usize::MAX as u64)
    }

    /// Compute the layout for a size type whose largest value is `size_max`.
    ///
    /// `size_max` must be of the form `2^k - 1`; integer sizes are wrapped
    /// to that range, and the result is cross-checked against the same
    /// formula evaluated in `f64`. Any disagreement, or a size above
    /// `size_max - 8 * BITMAP_ALIGNMENT`, yields `None`.
    pub fn compute_with_max(
        header_only: bool,
        width: u32,
        height: u32,
        bpp: u32,
        needs_masks: bool,
        size_max: u64,
    ) -> Option<Self> {
        let align = BITMAP_ALIGNMENT as u128;
        let header_len = align_up(core::mem::size_of::<crate::bitmap::Header>() as u128, align);
        let info_offset = align - (INFO_HEADER_SIZE as u128 % align);
        let extra_offset = info_offset + INFO_HEADER_SIZE as u128;
        // masks only ever coexist with an empty palette (16 bpp)
        let extra_len = (palette_entries(bpp) * PALETTE_ENTRY_SIZE) as u128
            + if needs_masks { MASKS_SIZE as u128 } else { 0 };
        let pixels_offset = align_up(extra_offset + extra_len, align);

        let line = line_bytes(width, bpp);
        let pitch = aligned_pitch(line);
        let pixels_len = if header_only {
            0
        } else {
            let header_size = header_len + pixels_offset;
            let exact = header_size + pitch as u128 * height as u128;
            let wrapped = exact & size_max as u128;

            let d_pitch = ((bpp as f64 * width as f64 + 31.0) / 32.0) as u64 as f64 * 4.0;
            let d_size = header_size as f64 + d_pitch * height as f64;
            if d_size != wrapped as f64 {
                return None;
            }
            let max_memory = size_max as f64 - (8 * BITMAP_ALIGNMENT) as f64;
            if d_size > max_memory {
                return None;
            }
            pitch as u128 * height as u128
        };

        let total = header_len + pixels_offset + pixels_len;
        if total > size_max as u128 || total > usize::MAX as u128 {
            return None;
        }
        Some(Self {
            header_len: header_len as usize,
            info_offset: info_offset as usize,
            extra_offset: extra_offset as usize,
            extra_len: extra_len as usize,
            pixels_offset: pixels_offset as usize,
            pixels_len: pixels_len as usize,
            line: usize::try_from(line).ok()?,
            pitch: usize::try_from(pitch).ok()?,
        })
    }

    /// Full size: aligned header record plus the block.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.header_len + self.block_len()
    }

    /// Bytes of the aligned block itself.
    #[inline]
    pub fn block_len(&self) -> usize {
        self.pixels_offset + self.pixels_len
    }

    /// Size reserved for the header record, rounded up to the alignment.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Offset of the info header.
    #[inline]
    pub fn info_offset(&self) -> usize {
        self.info_offset
    }

    /// Offset of the palette or channel masks, directly after the info header.
    #[inline]
    pub fn extra_offset(&self) -> usize {
        self.extra_offset
    }

    /// Length of the palette or channel masks region.
    #[inline]
    pub fn extra_len(&self) -> usize {
        self.extra_len
    }

    /// Offset of the first scanline.
    #[inline]
    pub fn pixels_offset(&self) -> usize {
        self.pixels_offset
    }

    /// Length of the pixel region; zero for header-only layouts.
    #[inline]
    pub fn pixels_len(&self) -> usize {
        self.pixels_len
    }

    /// Unpadded scanline size.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Padded scanline stride of the owned pixel region.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }
}

/// Exact byte size of a bitmap of the given shape, or `None` on overflow risk.
pub fn compute_block_size(
    header_only: bool,
    width: u32,
    height: u32,
    bpp: u32,
    needs_masks: bool,
) -> Option<usize> {
    BlockLayout::compute(header_only, width, height, bpp, needs_masks).map(|l| l.total_size())
}

const fn align_up(val: u128, align: u128) -> u128 {
    (val + align - 1) & !(align - 1)
}
