//! Element store seams: symbology resolution and geometry part lookup
//!
//! [`MemoryStore`] implements both over in-memory maps and is what the
//! tests and benches run against.

use ahash::RandomState;
use indexmap::IndexMap;

use crate::stream::GeometryStream;
use crate::symbology::{GeometryParams, SubCategoryAppearance};
use crate::types::{CategoryId, GeometryPartId, LineStyleId, Range3d, SubCategoryId};

/// Sub-category appearance lookup used to resolve inherited symbology
pub trait SymbologyResolver {
    fn sub_category_appearance(&self, sub_category_id: SubCategoryId) -> Option<SubCategoryAppearance>;

    fn category_of_sub_category(&self, sub_category_id: SubCategoryId) -> Option<CategoryId>;

    /// Width of a line style definition, for stroked styles
    fn line_style_width(&self, style_id: LineStyleId) -> Option<f64>;

    /// Fill inherited properties from the sub-category. Unknown
    /// sub-categories resolve against the default appearance.
    fn resolve(&self, params: &mut GeometryParams) {
        let appearance = self
            .sub_category_appearance(params.sub_category_id())
            .unwrap_or_default();
        params.resolve_with(&appearance);
    }

    /// Resolve for display, including line style definition widths
    fn cook(&self, params: &mut GeometryParams) {
        self.resolve(params);
        if let Some(style) = params.line_style_mut() {
            if let Some(width) = self.line_style_width(style.style_id) {
                style.definition_width = width;
            }
        }
    }
}

/// Geometry part streams and their ranges
pub trait GeometrySource {
    fn part_stream(&self, part_id: GeometryPartId) -> Option<&[u8]>;

    fn part_range(&self, part_id: GeometryPartId) -> Option<Range3d>;
}

#[derive(Debug, Clone)]
struct SubCategoryEntry {
    category_id: CategoryId,
    appearance: SubCategoryAppearance,
}

#[derive(Debug, Clone)]
struct PartEntry {
    stream: GeometryStream,
    range: Range3d,
}

/// In-memory sub-categories, line styles and geometry parts
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sub_categories: IndexMap<SubCategoryId, SubCategoryEntry, RandomState>,
    line_styles: IndexMap<LineStyleId, f64, RandomState>,
    parts: IndexMap<GeometryPartId, PartEntry, RandomState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_sub_category(
        &mut self,
        sub_category_id: SubCategoryId,
        category_id: CategoryId,
        appearance: SubCategoryAppearance,
    ) {
        self.sub_categories.insert(
            sub_category_id,
            SubCategoryEntry {
                category_id,
                appearance,
            },
        );
    }

    pub fn insert_line_style(&mut self, style_id: LineStyleId, definition_width: f64) {
        self.line_styles.insert(style_id, definition_width);
    }

    /// Store a finished part stream and its range
    pub fn insert_part(&mut self, part_id: GeometryPartId, stream: GeometryStream, range: Range3d) {
        self.parts.insert(part_id, PartEntry { stream, range });
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn part_ids(&self) -> impl Iterator<Item = GeometryPartId> + '_ {
        self.parts.keys().copied()
    }
}

impl SymbologyResolver for MemoryStore {
    fn sub_category_appearance(&self, sub_category_id: SubCategoryId) -> Option<SubCategoryAppearance> {
        self.sub_categories
            .get(&sub_category_id)
            .map(|entry| entry.appearance.clone())
    }

    fn category_of_sub_category(&self, sub_category_id: SubCategoryId) -> Option<CategoryId> {
        self.sub_categories.get(&sub_category_id).map(|entry| entry.category_id)
    }

    fn line_style_width(&self, style_id: LineStyleId) -> Option<f64> {
        self.line_styles.get(&style_id).copied()
    }
}

impl GeometrySource for MemoryStore {
    fn part_stream(&self, part_id: GeometryPartId) -> Option<&[u8]> {
        self.parts.get(&part_id).map(|entry| entry.stream.as_bytes())
    }

    fn part_range(&self, part_id: GeometryPartId) -> Option<Range3d> {
        self.parts.get(&part_id).map(|entry| entry.range)
    }
}
