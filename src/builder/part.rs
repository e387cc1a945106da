//! Geometry part streams from existing element geometry

use tracing::debug;

use super::GeometryBuilder;
use crate::error::{GeomStreamError, Result};
use crate::stream::codec::{self, BasicSymbologyRecord};
use crate::stream::{Collection, GeometryStream, OpCode, Reader, Writer};
use crate::symbology::{GeometryClass, GeometryParams};
use crate::types::SubCategoryId;

impl GeometryBuilder<'_> {
    /// Turn an element stream into a geometry part stream.
    ///
    /// `Header` and `SubGraphicRange` are dropped, since a part yields a
    /// single graphic. Part instances cannot nest. Unless
    /// `ignore_symbology` is set, the first symbology run is returned as
    /// params instead of being baked into the part, and later
    /// `BasicSymbology` keeps only its appearance overrides. Everything
    /// else, BRep data included, is copied verbatim.
    pub fn create_geometry_part(
        stream: &[u8],
        ignore_symbology: bool,
    ) -> Result<(GeometryStream, Option<GeometryParams>)> {
        let reader = Reader::new();
        let mut writer = Writer::new(true);
        let mut params: Option<GeometryParams> = None;
        let mut basic_count = 0usize;

        for op in Collection::new(stream).iter() {
            match op.opcode {
                OpCode::Header | OpCode::SubGraphicRange => {}
                OpCode::GeometryPartInstance => {
                    return Err(GeomStreamError::DisallowedOperation(
                        "nested geometry parts are not supported".to_string(),
                    ));
                }
                OpCode::BasicSymbology => {
                    if ignore_symbology {
                        continue;
                    }
                    basic_count += 1;
                    if basic_count == 1 {
                        let mut initial = GeometryParams::default();
                        reader.get_params(&op, &mut initial)?;
                        params = Some(initial);
                        continue;
                    }

                    let record = codec::decode_basic_symbology(op.data)?;
                    if !record.sub_category_id.is_valid() {
                        writer.append_operation(&op);
                        continue;
                    }
                    if !has_overrides(&record) {
                        debug!(target: "geomstream::builder", sub_category = %record.sub_category_id, "sub-category change dropped from part");
                        continue;
                    }
                    // a part cannot change sub-category, only its overrides survive
                    let record = BasicSymbologyRecord {
                        sub_category_id: SubCategoryId::INVALID,
                        ..record
                    };
                    writer.append_op(OpCode::BasicSymbology, &codec::encode_basic_symbology(&record)?);
                }
                OpCode::LineStyleModifiers | OpCode::AreaFill | OpCode::Pattern | OpCode::Material => {
                    if ignore_symbology {
                        continue;
                    }
                    if basic_count == 1 {
                        if let Some(initial) = params.as_mut() {
                            reader.get_params(&op, initial)?;
                            continue;
                        }
                    }
                    writer.append_operation(&op);
                }
                _ => writer.append_operation(&op),
            }
        }

        Ok((GeometryStream::from(writer), params))
    }
}

fn has_overrides(record: &BasicSymbologyRecord) -> bool {
    record.use_color
        || record.use_weight
        || record.use_style
        || record.transparency != 0.0
        || record.display_priority != 0
        || record.geometry_class != GeometryClass::Primary
}
