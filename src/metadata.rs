//! Per-model tag metadata.
//!
//! A [`MetadataStore`] maps each [`MetadataModel`] to its own tag map, keyed
//! by string. Keys are unique within a model and the store always holds its
//! own copies of tags; callers never share tag storage with it.
//!
//! Iteration goes through [`TagCursor`], which borrows the store. Mutating
//! the store while a cursor is alive is a compile error rather than a
//! silently stale position.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::string::{String, ToString};
use core::fmt;

use crate::diagnostics::{DiagnosticSink, LogSink, Severity};
use crate::error::MetadataError;
use crate::tag::{Tag, UNKNOWN_TAG_ID};

/// Tag map of a single model, ordered by key.
pub type TagMap = BTreeMap<String, Tag>;

/// Metadata category. Each model has an independent key space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum MetadataModel {
    /// Single comment or keyword strings.
    Comments = 0,
    /// EXIF TIFF-level tags (IFD0).
    ExifMain = 1,
    /// EXIF sub-IFD tags.
    ExifExif = 2,
    /// EXIF GPS tags.
    ExifGps = 3,
    /// EXIF maker note tags.
    ExifMakernote = 4,
    /// EXIF interoperability tags.
    ExifInterop = 5,
    /// IPTC/NAA records.
    Iptc = 6,
    /// Adobe XMP packet.
    Xmp = 7,
    /// GeoTIFF tags.
    GeoTiff = 8,
    /// Animation frame data. Never copied between bitmaps.
    Animation = 9,
    /// Application-defined tags.
    Custom = 10,
    /// Raw EXIF block.
    ExifRaw = 11,
}

impl MetadataModel {
    /// Every model, in numeric order.
    pub const ALL: [Self; 12] = [
        Self::Comments,
        Self::ExifMain,
        Self::ExifExif,
        Self::ExifGps,
        Self::ExifMakernote,
        Self::ExifInterop,
        Self::Iptc,
        Self::Xmp,
        Self::GeoTiff,
        Self::Animation,
        Self::Custom,
        Self::ExifRaw,
    ];

    /// Whether keys of this model resolve to numeric ids on insert.
    pub const fn resolves_tag_ids(self) -> bool {
        matches!(self, Self::Iptc)
    }
}

/// Read-only tag-id table for metadata standards.
pub trait TagLookup {
    /// Numeric id of `key` within `model`, or `None` if the table has none.
    fn tag_id(&self, model: MetadataModel, key: &str) -> Option<u16>;
}

/// Lookup table that knows no ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTagLookup;

impl TagLookup for NoTagLookup {
    fn tag_id(&self, _model: MetadataModel, _key: &str) -> Option<u16> {
        None
    }
}

impl<F> TagLookup for F
where
    F: Fn(MetadataModel, &str) -> Option<u16>,
{
    fn tag_id(&self, model: MetadataModel, key: &str) -> Option<u16> {
        self(model, key)
    }
}

/// Collaborators used while mutating metadata.
#[derive(Clone, Copy)]
pub struct MetadataContext<'a> {
    /// Tag-id table.
    pub lookup: &'a dyn TagLookup,
    /// Receiver for malformed-tag diagnostics.
    pub sink: &'a dyn DiagnosticSink,
}

impl<'a> MetadataContext<'a> {
    /// Context with explicit collaborators.
    pub fn new(lookup: &'a dyn TagLookup, sink: &'a dyn DiagnosticSink) -> Self {
        Self { lookup, sink }
    }

    /// Replace the tag-id table.
    pub fn with_lookup(mut self, lookup: &'a dyn TagLookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }
}

impl Default for MetadataContext<'static> {
    fn default() -> Self {
        Self {
            lookup: &NoTagLookup,
            sink: &LogSink,
        }
    }
}

impl fmt::Debug for MetadataContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataContext").finish_non_exhaustive()
    }
}

/// Metadata of one bitmap: one [`TagMap`] per populated model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataStore {
    models: BTreeMap<MetadataModel, TagMap>,
}

impl MetadataStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replace or delete in one call.
    ///
    /// - `key` and `tag` present: validate and upsert a copy of `tag`.
    /// - `tag` absent: delete `key` from `model` (no-op if missing).
    /// - `key` absent: delete the whole model.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MalformedTag`] if the tag payload length disagrees
    /// with `count * width`. The store is left untouched.
    pub fn set_tag(
        &mut self,
        cx: &MetadataContext<'_>,
        model: MetadataModel,
        key: Option<&str>,
        tag: Option<&Tag>,
    ) -> Result<(), MetadataError> {
        let Some(key) = key else {
            self.remove_model(model);
            return Ok(());
        };
        match tag {
            Some(tag) => self.insert(cx, model, key, tag),
            None => {
                self.remove(model, key);
                Ok(())
            }
        }
    }

    /// Validate and upsert a copy of `tag` under `key`.
    ///
    /// The stored copy carries `key` as its key. Models that resolve
    /// numeric ids get the id from `cx.lookup`, or
    /// [`UNKNOWN_TAG_ID`] if the table has none.
    ///
    /// # Errors
    ///
    /// [`MetadataError::MalformedTag`] on a count/length mismatch, after
    /// reporting a warning to `cx.sink`.
    pub fn insert(
        &mut self,
        cx: &MetadataContext<'_>,
        model: MetadataModel,
        key: &str,
        tag: &Tag,
    ) -> Result<(), MetadataError> {
        if !tag.is_consistent() {
            let width = tag.tag_type().width();
            cx.sink.emit(
                Severity::Warning,
                format_args!(
                    "invalid data count for tag '{key}': {} x {width} != {}",
                    tag.count(),
                    tag.length()
                ),
            );
            return Err(MetadataError::MalformedTag {
                key: key.to_string(),
                count: tag.count(),
                width,
                length: tag.length(),
            });
        }

        let mut stored = tag.clone();
        if stored.key() != key {
            stored.set_key(key);
        }
        if model.resolves_tag_ids() {
            stored.set_id(cx.lookup.tag_id(model, key).unwrap_or(UNKNOWN_TAG_ID));
        }
        self.models
            .entry(model)
            .or_default()
            .insert(key.to_string(), stored);
        Ok(())
    }

    /// Upsert a NUL-terminated ASCII tag holding `value`.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the generated tag is always consistent.
    pub fn set_key_value(
        &mut self,
        cx: &MetadataContext<'_>,
        model: MetadataModel,
        key: &str,
        value: &str,
    ) -> Result<(), MetadataError> {
        self.insert(cx, model, key, &Tag::ascii(key, value))
    }

    /// Remove one tag, returning it.
    ///
    /// An emptied model stays present with zero tags.
    pub fn remove(&mut self, model: MetadataModel, key: &str) -> Option<Tag> {
        self.models.get_mut(&model)?.remove(key)
    }

    /// Remove a model and every tag in it. Returns whether it existed.
    pub fn remove_model(&mut self, model: MetadataModel) -> bool {
        self.models.remove(&model).is_some()
    }

    /// Remove every model.
    pub fn clear(&mut self) {
        self.models.clear();
    }

    /// Tag stored under `key` in `model`.
    pub fn get(&self, model: MetadataModel, key: &str) -> Option<&Tag> {
        self.models.get(&model)?.get(key)
    }

    /// Number of tags in `model`; zero if the model does not exist.
    pub fn count(&self, model: MetadataModel) -> usize {
        self.models.get(&model).map_or(0, BTreeMap::len)
    }

    /// Whether `model` has an entry, even an empty one.
    pub fn contains_model(&self, model: MetadataModel) -> bool {
        self.models.contains_key(&model)
    }

    /// Whether no model is present.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Present models with their tag maps, in model order.
    pub fn models(&self) -> impl Iterator<Item = (MetadataModel, &TagMap)> {
        self.models.iter().map(|(model, tags)| (*model, tags))
    }

    /// Cursor over the tags of `model` in key order.
    pub fn tags(&self, model: MetadataModel) -> TagCursor<'_> {
        TagCursor {
            inner: self.models.get(&model).map(BTreeMap::values),
            position: 0,
        }
    }

    /// Begin iterating `model`: the cursor positioned after the first tag,
    /// and that tag. `None` if the model is missing or empty.
    pub fn find_first(&self, model: MetadataModel) -> Option<(TagCursor<'_>, &Tag)> {
        let mut cursor = self.tags(model);
        let first = cursor.next()?;
        Some((cursor, first))
    }

    /// Replace each model of `other` in `self` with a deep copy.
    ///
    /// [`MetadataModel::Animation`] is skipped. Models present only in
    /// `self` are kept; models present in both are overwritten, not merged.
    pub fn clone_models_from(&mut self, other: &MetadataStore) {
        for (model, tags) in &other.models {
            if *model == MetadataModel::Animation {
                continue;
            }
            self.models.insert(*model, tags.clone());
        }
    }
}

/// Position within one model's tag map.
///
/// Yields tags in key order. Dropping the cursor ends iteration.
#[derive(Clone, Debug)]
pub struct TagCursor<'a> {
    inner: Option<btree_map::Values<'a, String, Tag>>,
    position: usize,
}

impl TagCursor<'_> {
    /// Number of tags yielded so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a> Iterator for TagCursor<'a> {
    type Item = &'a Tag;

    fn next(&mut self) -> Option<&'a Tag> {
        let tag = self.inner.as_mut()?.next()?;
        self.position += 1;
        Some(tag)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.as_ref().map_or((0, Some(0)), Iterator::size_hint)
    }
}

impl ExactSizeIterator for TagCursor<'_> {}
