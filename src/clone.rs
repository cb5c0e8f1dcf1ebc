//! Deep copies of bitmaps and their metadata.

use crate::bitmap::{Bitmap, BitmapDesc};
use crate::error::BitmapError;

impl Bitmap<'_> {
    /// Independent deep copy.
    ///
    /// The info block, palette or masks and owned pixels are copied in one
    /// pass. ICC bytes and flags, every metadata model, background colour,
    /// transparency state and the thumbnail are copied into storage owned
    /// by the new handle. A bitmap wrapping external pixels yields an owned
    /// bitmap holding a copy of those rows.
    ///
    /// # Errors
    ///
    /// [`BitmapError::OutOfMemory`] if any part cannot be allocated. No
    /// partial copy is returned.
    pub fn try_clone(&self) -> Result<Bitmap<'static>, BitmapError> {
        let desc = BitmapDesc::new(self.width() as i32, self.height() as i32, self.bpp())
            .with_image_type(self.image_type())
            .with_masks(self.channel_masks())
            .with_header_only(!self.has_pixels());
        let mut clone = Bitmap::allocate(&desc)?;

        // external sources are laid out header-only; stop before the pixels
        let copied = if self.is_external() {
            self.layout.pixels_offset()
        } else {
            self.layout.block_len()
        };
        clone.block.as_mut_slice()[..copied].copy_from_slice(&self.block.as_slice()[..copied]);

        let src = &self.header;
        let dst = &mut clone.header;
        dst.background = src.background;
        dst.transparent = src.transparent;
        dst.transparency_count = src.transparency_count;
        dst.transparency_table = src.transparency_table;
        dst.icc
            .replace_data(src.icc.data())
            .map_err(|_| BitmapError::OutOfMemory {
                bytes: src.icc.len(),
            })?;
        dst.icc.set_flags(src.icc.flags());
        dst.metadata = src.metadata.clone();

        clone.set_thumbnail(self.thumbnail())?;

        if let Some(ext) = &self.external {
            let line = self.line();
            let pitch = clone.pitch();
            if let Some(bits) = clone.bits_mut() {
                for (dst_row, src_row) in bits.chunks_mut(pitch).zip(ext.bits.chunks(ext.pitch)) {
                    dst_row[..line].copy_from_slice(&src_row[..line]);
                }
            }
        }
        Ok(clone)
    }

    /// Copy metadata and resolution from `src`.
    ///
    /// Every model of `src` except [`Animation`](crate::MetadataModel::Animation)
    /// replaces the same model here. Models `src` lacks are kept.
    pub fn clone_metadata_from(&mut self, src: &Bitmap<'_>) {
        self.header.metadata.clone_models_from(&src.header.metadata);
        self.set_dots_per_meter_x(src.dots_per_meter_x());
        self.set_dots_per_meter_y(src.dots_per_meter_y());
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rayon::prelude::*;

    use crate::{
        Bitmap, BitmapDesc, ChannelMasks, IccFlags, ImageType, MetadataContext, MetadataModel,
        PaletteEntry,
    };

    fn cx() -> MetadataContext<'static> {
        MetadataContext::default()
    }

    #[test]
    fn clone_matches_shape_and_pixels() {
        let mut src = Bitmap::new(5, 3, 24).unwrap();
        for y in 0..3 {
            for (i, b) in src.scanline_mut(y).unwrap().iter_mut().enumerate() {
                *b = (y as usize * 31 + i) as u8;
            }
        }
        let clone = src.try_clone().unwrap();
        assert_eq!(clone.width(), 5);
        assert_eq!(clone.height(), 3);
        assert_eq!(clone.bpp(), 24);
        assert_eq!(clone.image_type(), ImageType::Bitmap);
        assert_eq!(clone.bits(), src.bits());
        assert_ne!(clone.bits().unwrap().as_ptr(), src.bits().unwrap().as_ptr());
        assert_eq!(clone.info_block(), src.info_block());
    }

    #[test]
    fn clone_keeps_palette_masks_and_resolution() {
        let mut src = Bitmap::new(4, 4, 8).unwrap();
        src.palette_mut()[3] = PaletteEntry {
            b: 1,
            g: 2,
            r: 3,
            a: 0,
        };
        src.set_dots_per_meter_x(1234);
        let clone = src.try_clone().unwrap();
        assert_eq!(clone.palette(), src.palette());
        assert_eq!(clone.dots_per_meter_x(), 1234);

        let desc = BitmapDesc::new(4, 4, 16).with_masks(ChannelMasks::RGB565);
        let clone = Bitmap::allocate(&desc).unwrap().try_clone().unwrap();
        assert_eq!(clone.channel_masks(), ChannelMasks::RGB565);
    }

    #[test]
    fn clone_is_independent() {
        let mut src = Bitmap::new(2, 2, 8).unwrap();
        src.metadata_mut()
            .set_key_value(&cx(), MetadataModel::Comments, "Comment", "original")
            .unwrap();
        src.set_icc_flags(IccFlags::YUV);
        src.create_icc_profile(&[1, 2, 3, 4]).unwrap();
        src.set_transparent_index(7);
        src.set_background_color(Some(PaletteEntry {
            b: 9,
            g: 9,
            r: 9,
            a: 0,
        }));

        let mut clone = src.try_clone().unwrap();
        assert_eq!(clone.icc_profile(), src.icc_profile());
        assert_ne!(clone.icc_profile().data().as_ptr(), src.icc_profile().data().as_ptr());
        assert_eq!(clone.metadata(), src.metadata());
        assert_eq!(clone.transparent_index(), Some(7));
        assert!(clone.is_transparent());
        assert_eq!(clone.background_color(), src.background_color());

        clone
            .metadata_mut()
            .set_key_value(&cx(), MetadataModel::Comments, "Comment", "changed")
            .unwrap();
        clone.scanline_mut(0).unwrap()[0] = 0xEE;
        clone.destroy_icc_profile();

        let comment = src.metadata().get(MetadataModel::Comments, "Comment").unwrap();
        assert_eq!(comment.as_str(), Some("original"));
        assert_eq!(src.scanline(0).unwrap()[0], 0);
        assert_eq!(src.icc_profile().len(), 4);
    }

    #[test]
    fn clone_copies_animation_metadata() {
        let mut src = Bitmap::new(1, 1, 8).unwrap();
        src.metadata_mut()
            .set_key_value(&cx(), MetadataModel::Animation, "Loop", "0")
            .unwrap();
        let clone = src.try_clone().unwrap();
        assert_eq!(clone.metadata().count(MetadataModel::Animation), 1);
    }

    #[test]
    fn clone_of_header_only_has_no_pixels() {
        let src = Bitmap::new_header(ImageType::Float, 10, 10, 0).unwrap();
        let clone = src.try_clone().unwrap();
        assert!(!clone.has_pixels());
        assert_eq!(clone.bpp(), 32);
        assert_eq!(clone.image_type(), ImageType::Float);
    }

    #[test]
    fn clone_of_external_owns_its_rows() {
        // pitch 7 with 6-byte lines, padding bytes set to 0xFF
        let mut bytes = [0xFFu8; 7 * 2 + 6];
        for (y, row) in bytes.chunks_mut(7).enumerate() {
            row[..6].fill(y as u8 + 1);
        }
        let desc = BitmapDesc::new(2, 3, 24);
        let src = Bitmap::wrap_external(&desc, &mut bytes, 7).unwrap();
        let clone = src.try_clone().unwrap();
        drop(src);

        assert!(!clone.is_external());
        assert_eq!(clone.pitch(), 8);
        assert_eq!(clone.scanline(0).unwrap(), &[1; 6]);
        assert_eq!(clone.scanline(1).unwrap(), &[2; 6]);
        assert_eq!(clone.scanline(2).unwrap(), &[3; 6]);
        // padding stays zero in the owned copy
        assert_eq!(&clone.bits().unwrap()[6..8], &[0, 0]);
        bytes[0] = 0;
        assert_eq!(clone.scanline(0).unwrap()[0], 1);
    }

    #[test]
    fn clone_copies_thumbnail_subtree() {
        let mut src = Bitmap::new(32, 32, 24).unwrap();
        let mut thumb = Bitmap::new(4, 4, 24).unwrap();
        thumb.scanline_mut(3).unwrap()[0] = 77;
        src.set_thumbnail(Some(&thumb)).unwrap();

        let clone = src.try_clone().unwrap();
        let a = src.thumbnail().unwrap();
        let b = clone.thumbnail().unwrap();
        assert_eq!(b.scanline(3).unwrap()[0], 77);
        assert_ne!(a.bits().unwrap().as_ptr(), b.bits().unwrap().as_ptr());
    }

    #[test]
    fn clone_metadata_overwrites_and_copies_resolution() {
        let mut src = Bitmap::new(1, 1, 8).unwrap();
        src.metadata_mut()
            .set_key_value(&cx(), MetadataModel::ExifMain, "Make", "Acme")
            .unwrap();
        src.metadata_mut()
            .set_key_value(&cx(), MetadataModel::Animation, "Loop", "0")
            .unwrap();
        src.set_dots_per_meter_x(100);
        src.set_dots_per_meter_y(200);

        let mut dst = Bitmap::new(2, 2, 24).unwrap();
        dst.metadata_mut()
            .set_key_value(&cx(), MetadataModel::ExifMain, "Model", "X")
            .unwrap();
        dst.clone_metadata_from(&src);

        assert_eq!(dst.metadata().count(MetadataModel::ExifMain), 1);
        assert!(dst.metadata().get(MetadataModel::ExifMain, "Make").is_some());
        assert_eq!(dst.metadata().count(MetadataModel::Animation), 0);
        assert_eq!(dst.dots_per_meter_x(), 100);
        assert_eq!(dst.dots_per_meter_y(), 200);
    }

    #[test]
    fn independent_handles_in_parallel() {
        let results: Vec<(u32, usize, usize)> = (1..=64i32)
            .into_par_iter()
            .map(|n| {
                let mut bitmap = Bitmap::new(n, n, 32).unwrap();
                bitmap
                    .metadata_mut()
                    .set_key_value(&cx(), MetadataModel::Custom, "n", "value")
                    .unwrap();
                let clone = bitmap.try_clone().unwrap();
                (clone.width(), clone.memory_size(), bitmap.memory_size())
            })
            .collect();
        assert_eq!(results.len(), 64);
        for (i, (width, clone_size, src_size)) in results.iter().enumerate() {
            assert_eq!(*width, i as u32 + 1);
            assert_eq!(clone_size, src_size);
        }
    }
}
