//! Copy a stream between stores, remapping the ids it references
//!
//! Sub-categories, line styles, materials, geometry parts, fonts and
//! textures are store specific. [`Importer`] rewrites every operation that
//! names one through an [`IdRemapper`] and copies everything else as is.
//! An id that cannot be remapped is reported and kept, so one missing
//! definition never loses the rest of the stream.

use std::hash::Hash;

use ahash::RandomState;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::ImportOptions;
use crate::error::{GeomStreamError, Result};
use crate::notification::{Notification, NotificationCollection, NotificationType};
use crate::stream::codec::{self, MaterialRecord};
use crate::stream::{Collection, GeometryStream, HeaderFlags, OpCode, Operation, Writer};
use crate::types::{FontId, GeometryPartId, LineStyleId, MaterialId, SubCategoryId, TextureId};

/// Destination ids for source ids.
///
/// `None` means the destination has no counterpart. Implementations may
/// copy the definition on first request, hence `&mut self`.
pub trait IdRemapper {
    fn find_sub_category(&mut self, source: SubCategoryId) -> Option<SubCategoryId>;

    fn find_line_style(&mut self, source: LineStyleId) -> Option<LineStyleId>;

    fn find_material(&mut self, source: MaterialId) -> Option<MaterialId>;

    fn find_geometry_part(&mut self, source: GeometryPartId) -> Option<GeometryPartId>;

    fn find_font(&mut self, source: FontId) -> Option<FontId>;

    fn find_texture(&mut self, source: TextureId) -> Option<TextureId>;
}

type Cache<I> = IndexMap<I, Option<I>, RandomState>;

/// Remap results already asked for, per id kind
#[derive(Debug, Default)]
struct RemapCache {
    sub_categories: Cache<SubCategoryId>,
    line_styles: Cache<LineStyleId>,
    materials: Cache<MaterialId>,
    parts: Cache<GeometryPartId>,
    fonts: Cache<FontId>,
    textures: Cache<TextureId>,
}

fn cached<I: Copy + Eq + Hash>(cache: &mut Cache<I>, id: I, find: impl FnOnce(I) -> Option<I>) -> Option<I> {
    *cache.entry(id).or_insert_with(|| find(id))
}

/// Where the current operation sits, for reporting
#[derive(Clone, Copy)]
struct Site {
    opcode: OpCode,
    offset: usize,
}

/// Stream import pass.
///
/// Remap answers are cached for the importer's lifetime, so one importer
/// should serve one source/destination pair.
#[derive(Debug, Default)]
pub struct Importer {
    options: ImportOptions,
    cache: RemapCache,
    notifications: NotificationCollection,
}

impl Importer {
    pub fn new(options: ImportOptions) -> Self {
        Importer {
            options,
            cache: RemapCache::default(),
            notifications: NotificationCollection::new(),
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Forget cached remap answers
    pub fn clear_cache(&mut self) {
        self.cache = RemapCache::default();
    }

    /// Remapped copy of `stream` and what went wrong along the way.
    ///
    /// Any non-empty stream imports with a leading `Header` carrying the
    /// source flags. While a sub-category listed in
    /// [`ImportOptions::skip_sub_categories`] is active, its operations are
    /// dropped.
    pub fn import(&mut self, stream: &[u8], remapper: &mut dyn IdRemapper) -> (GeometryStream, NotificationCollection) {
        if stream.is_empty() {
            return (GeometryStream::default(), std::mem::take(&mut self.notifications));
        }
        let collection = Collection::new(stream);
        let flags = collection
            .iter()
            .next()
            .filter(|op| op.opcode == OpCode::Header)
            .and_then(|op| codec::decode_header(op.data).ok())
            .map(|(_, flags)| flags)
            .unwrap_or(HeaderFlags::NONE);

        let mut writer = Writer::new(true);
        if let Err(err) = writer.append_header(flags) {
            warn!(target: "geomstream::import", error = %err, "header not written");
            self.notifications
                .push(Notification::new(NotificationType::Error, format!("header not written: {err}")));
        }
        let mut filtering = false;
        for (offset, op) in collection.operations_with_offsets() {
            if op.opcode == OpCode::Header {
                continue;
            }
            let site = Site {
                opcode: op.opcode,
                offset,
            };

            if op.opcode == OpCode::BasicSymbology && !self.options.skip_sub_categories.is_empty() {
                // the default sub-category (0) is never filtered
                filtering = codec::decode_basic_symbology(op.data)
                    .map(|record| {
                        record.sub_category_id.is_valid()
                            && self.options.skip_sub_categories.contains(&record.sub_category_id)
                    })
                    .unwrap_or(false);
            }
            if filtering {
                debug!(target: "geomstream::import", opcode = %op.opcode, offset, "operation of filtered sub-category dropped");
                continue;
            }

            if let Err(err) = self.import_operation(&op, site, remapper, &mut writer) {
                warn!(target: "geomstream::import", opcode = %op.opcode, offset, error = %err, "operation copied without remapping");
                self.notifications.push(
                    Notification::new(NotificationType::Error, format!("payload not remapped: {err}"))
                        .at(op.opcode, offset),
                );
                writer.append_operation(&op);
            }
        }

        (GeometryStream::from(writer), std::mem::take(&mut self.notifications))
    }

    fn import_operation(
        &mut self,
        op: &Operation<'_>,
        site: Site,
        remapper: &mut dyn IdRemapper,
        writer: &mut Writer,
    ) -> Result<()> {
        match op.opcode {
            OpCode::BasicSymbology => {
                let mut record = codec::decode_basic_symbology(op.data)?;
                if record.sub_category_id.is_valid() {
                    record.sub_category_id = self.sub_category(record.sub_category_id, site, remapper);
                }
                if record.line_style_id.is_valid() {
                    record.line_style_id = self.line_style(record.line_style_id, site, remapper);
                }
                writer.append_op(op.opcode, &codec::encode_basic_symbology(&record)?);
            }
            OpCode::GeometryPartInstance => {
                let mut record = codec::decode_part_instance(op.data)?;
                record.part_id = self.geometry_part(record.part_id, site, remapper);
                writer.append_op(op.opcode, &codec::encode_part_instance(&record)?);
            }
            OpCode::Pattern => {
                let mut pattern = codec::decode_pattern(op.data)?;
                if !pattern.symbol_id.is_valid() {
                    writer.append_operation(op);
                    return Ok(());
                }
                pattern.symbol_id = self.geometry_part(pattern.symbol_id, site, remapper);
                writer.append_op(op.opcode, &codec::encode_pattern(&pattern)?);
            }
            OpCode::Material => {
                let record = codec::decode_material(op.data)?;
                let material_id = if record.material_id.is_valid() {
                    self.material(record.material_id, site, remapper)
                } else {
                    record.material_id
                };
                let record = MaterialRecord { material_id, ..record };
                writer.append_op(op.opcode, &codec::encode_material(&record)?);
            }
            OpCode::ParasolidBRep => {
                let mut entity = codec::decode_brep(op.data)?;
                let Some(attachments) = entity.attachments.as_mut() else {
                    writer.append_operation(op);
                    return Ok(());
                };
                for symbology in attachments.table.iter_mut() {
                    if let Some(material_id) = symbology.material.filter(|id| id.is_valid()) {
                        symbology.material = Some(self.material(material_id, site, remapper));
                    }
                }
                writer.append_op(op.opcode, &codec::encode_brep(&entity)?);
            }
            OpCode::TextString => {
                let mut text = codec::decode_text(op.data)?;
                if text.font.is_valid() {
                    text.font = self.font(text.font, site, remapper);
                }
                writer.append_op(op.opcode, &codec::encode_text(&text)?);
            }
            OpCode::Image => {
                let mut image = codec::decode_image(op.data)?;
                if image.texture_id.is_valid() {
                    image.texture_id = self.texture(image.texture_id, site, remapper);
                }
                writer.append_op(op.opcode, &codec::encode_image(&image)?);
            }
            OpCode::Invalid => {
                debug!(target: "geomstream::import", code = op.code, offset = site.offset, "unrecognized operation copied");
                self.notifications.push(
                    Notification::new(NotificationType::NotSupported, format!("unrecognized opcode {}", op.code))
                        .at(op.opcode, site.offset),
                );
                writer.append_operation(op);
            }
            _ => writer.append_operation(op),
        }
        Ok(())
    }

    fn sub_category(&mut self, id: SubCategoryId, site: Site, remapper: &mut dyn IdRemapper) -> SubCategoryId {
        let found = cached(&mut self.cache.sub_categories, id, |id| remapper.find_sub_category(id));
        self.resolved("sub-category", id, found, site)
    }

    fn line_style(&mut self, id: LineStyleId, site: Site, remapper: &mut dyn IdRemapper) -> LineStyleId {
        let found = cached(&mut self.cache.line_styles, id, |id| remapper.find_line_style(id));
        self.resolved("line style", id, found, site)
    }

    fn material(&mut self, id: MaterialId, site: Site, remapper: &mut dyn IdRemapper) -> MaterialId {
        let found = cached(&mut self.cache.materials, id, |id| remapper.find_material(id));
        self.resolved("material", id, found, site)
    }

    fn geometry_part(&mut self, id: GeometryPartId, site: Site, remapper: &mut dyn IdRemapper) -> GeometryPartId {
        let found = cached(&mut self.cache.parts, id, |id| remapper.find_geometry_part(id));
        self.resolved("geometry part", id, found, site)
    }

    fn font(&mut self, id: FontId, site: Site, remapper: &mut dyn IdRemapper) -> FontId {
        let found = cached(&mut self.cache.fonts, id, |id| remapper.find_font(id));
        self.resolved("font", id, found, site)
    }

    fn texture(&mut self, id: TextureId, site: Site, remapper: &mut dyn IdRemapper) -> TextureId {
        let found = cached(&mut self.cache.textures, id, |id| remapper.find_texture(id));
        self.resolved("texture", id, found, site)
    }

    /// The remapped id, or the source id after reporting the failure
    fn resolved<I: Copy + Into<u64>>(&mut self, kind: &'static str, id: I, found: Option<I>, site: Site) -> I {
        if let Some(found) = found {
            return found;
        }
        let err = GeomStreamError::RemapFailed { kind, id: id.into() };
        warn!(target: "geomstream::import", opcode = %site.opcode, offset = site.offset, "{err}");
        debug_assert!(!self.options.strict, "{err}");
        self.notifications
            .push(Notification::new(NotificationType::Warning, err.to_string()).at(site.opcode, site.offset));
        id
    }
}
