//! Resident memory accounting.

use alloc::string::String;
use core::mem::size_of;

use crate::bitmap::{Bitmap, Header};
use crate::layout::compute_block_size;
use crate::metadata::{MetadataModel, MetadataStore, TagMap};
use crate::tag::Tag;

/// Approximate cost of one ordered-map entry: key, value and link overhead.
const fn map_node<K, V>() -> usize {
    size_of::<K>() + size_of::<V>() + 4 * size_of::<usize>()
}

impl Bitmap<'_> {
    /// Approximate bytes held by this bitmap and everything it owns.
    ///
    /// Counts the handle, the block as the size calculator sizes it
    /// (header-only when there are no owned pixels), ICC bytes, the
    /// thumbnail and the metadata store. A wrapped external buffer is not
    /// counted.
    pub fn memory_size(&self) -> usize {
        let header_only = !self.has_pixels() || self.is_external();
        let block = compute_block_size(
            header_only,
            self.width(),
            self.height(),
            self.bpp(),
            self.has_channel_masks(),
        )
        .unwrap_or(self.layout.total_size());

        // the header record is already part of the block size
        let mut size = size_of::<Self>() - size_of::<Header>() + block;
        size += self.header.icc.len();
        // thumbnails never carry thumbnails of their own
        if let Some(thumbnail) = &self.header.thumbnail {
            size += thumbnail.memory_size();
        }
        size + metadata_size(&self.header.metadata)
    }
}

/// Map overhead of a metadata store, beyond the store struct itself.
pub(crate) fn metadata_size(store: &MetadataStore) -> usize {
    store
        .models()
        .map(|(_, tags)| {
            map_node::<MetadataModel, TagMap>()
                + tags
                    .iter()
                    .map(|(key, tag)| map_node::<String, Tag>() + key.len() + tag.heap_size())
                    .sum::<usize>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitmapDesc, ImageType, MetadataContext};

    #[test]
    fn pixels_are_counted() {
        let full = Bitmap::new(64, 64, 24).unwrap();
        let header = Bitmap::new_header(ImageType::Bitmap, 64, 64, 24).unwrap();
        assert_eq!(full.memory_size() - header.memory_size(), 64 * 192);
        assert!(header.memory_size() >= size_of::<Bitmap<'static>>());
    }

    #[test]
    fn external_rows_are_not_counted() {
        let mut bytes = [0u8; 16 * 16 * 4];
        let desc = BitmapDesc::new(16, 16, 32);
        let wrapped = Bitmap::wrap_external(&desc, &mut bytes, 64).unwrap();
        let header = Bitmap::new_header(ImageType::Bitmap, 16, 16, 32).unwrap();
        assert_eq!(wrapped.memory_size(), header.memory_size());
    }

    #[test]
    fn icc_and_metadata_are_counted() {
        let cx = MetadataContext::default();
        let mut bitmap = Bitmap::new(4, 4, 8).unwrap();
        let base = bitmap.memory_size();

        bitmap.create_icc_profile(&[0; 100]).unwrap();
        assert_eq!(bitmap.memory_size(), base + 100);

        bitmap
            .metadata_mut()
            .set_key_value(&cx, MetadataModel::Comments, "Comment", "hello")
            .unwrap();
        let expected = map_node::<MetadataModel, TagMap>()
            + map_node::<String, Tag>()
            + "Comment".len()
            + "Comment".len()
            + "hello\0".len();
        assert_eq!(bitmap.memory_size(), base + 100 + expected);
        assert_eq!(metadata_size(bitmap.metadata()), expected);
    }

    #[test]
    fn thumbnail_is_counted_once() {
        let mut bitmap = Bitmap::new(32, 32, 24).unwrap();
        let base = bitmap.memory_size();
        let thumb = Bitmap::new(8, 8, 24).unwrap();
        bitmap.set_thumbnail(Some(&thumb)).unwrap();
        assert_eq!(bitmap.memory_size(), base + thumb.memory_size());
    }
}
