//! Running symbology state: `GeometryParams`

use bitflags::bitflags;

use super::{
    BackgroundFill, FillDisplay, GeometryClass, GradientSymb, LineStyleInfo, PatternParams,
    SubCategoryAppearance,
};
use crate::types::{CategoryId, ColorDef, MaterialId, SubCategoryId, Transform};

bitflags! {
    /// Appearance properties set explicitly on the params rather than
    /// inherited from the sub-category.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AppearanceOverrides: u32 {
        /// Nothing overridden.
        const NONE = 0;
        /// Line color.
        const COLOR = 0x01;
        /// Line weight.
        const WEIGHT = 0x02;
        /// Line style.
        const STYLE = 0x04;
        /// Render material.
        const MATERIAL = 0x08;
        /// Fill color.
        const FILL = 0x10;
    }
}

const TRANSPARENCY_TOLERANCE: f64 = 1.0e-9;

/// Symbology in effect for the geometry that follows it in a stream.
///
/// Every appearance property is either explicit (recorded in
/// [`AppearanceOverrides`]) or inherited from the sub-category. Inherited
/// values are only meaningful after the params have been resolved against
/// a [`SymbologyResolver`](crate::store::SymbologyResolver).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryParams {
    category_id: CategoryId,
    sub_category_id: SubCategoryId,
    geometry_class: GeometryClass,
    overrides: AppearanceOverrides,
    line_color: ColorDef,
    weight: u32,
    line_style: Option<LineStyleInfo>,
    transparency: f64,
    display_priority: i32,
    net_priority: i32,
    fill_display: FillDisplay,
    fill_color: ColorDef,
    background_fill: BackgroundFill,
    fill_transparency: f64,
    gradient: Option<GradientSymb>,
    pattern: Option<PatternParams>,
    material_id: MaterialId,
    resolved: bool,
}

impl Default for GeometryParams {
    fn default() -> Self {
        GeometryParams {
            category_id: CategoryId::INVALID,
            sub_category_id: SubCategoryId::INVALID,
            geometry_class: GeometryClass::Primary,
            overrides: AppearanceOverrides::NONE,
            line_color: ColorDef::BLACK,
            weight: 0,
            line_style: None,
            transparency: 0.0,
            display_priority: 0,
            net_priority: 0,
            fill_display: FillDisplay::Never,
            fill_color: ColorDef::BLACK,
            background_fill: BackgroundFill::None,
            fill_transparency: 0.0,
            gradient: None,
            pattern: None,
            material_id: MaterialId::INVALID,
            resolved: false,
        }
    }
}

impl GeometryParams {
    pub fn new(category_id: CategoryId, sub_category_id: SubCategoryId) -> Self {
        GeometryParams {
            category_id,
            sub_category_id,
            ..Default::default()
        }
    }

    // ----- category -----

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Changing the category drops the sub-category and every override
    pub fn set_category_id(&mut self, category_id: CategoryId) {
        self.category_id = category_id;
        self.sub_category_id = SubCategoryId::INVALID;
        self.overrides = AppearanceOverrides::NONE;
        self.resolved = false;
    }

    pub fn sub_category_id(&self) -> SubCategoryId {
        self.sub_category_id
    }

    /// Changing the sub-category drops every override
    pub fn set_sub_category_id(&mut self, sub_category_id: SubCategoryId) {
        self.sub_category_id = sub_category_id;
        self.overrides = AppearanceOverrides::NONE;
        self.resolved = false;
    }

    pub fn geometry_class(&self) -> GeometryClass {
        self.geometry_class
    }

    pub fn set_geometry_class(&mut self, geometry_class: GeometryClass) {
        self.geometry_class = geometry_class;
    }

    pub fn overrides(&self) -> AppearanceOverrides {
        self.overrides
    }

    // ----- line appearance -----

    pub fn line_color(&self) -> ColorDef {
        self.line_color
    }

    pub fn set_line_color(&mut self, color: ColorDef) {
        self.overrides |= AppearanceOverrides::COLOR;
        self.line_color = color;
    }

    pub fn is_line_color_from_sub_category_appearance(&self) -> bool {
        !self.overrides.contains(AppearanceOverrides::COLOR)
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: u32) {
        self.overrides |= AppearanceOverrides::WEIGHT;
        self.weight = weight;
    }

    pub fn is_weight_from_sub_category_appearance(&self) -> bool {
        !self.overrides.contains(AppearanceOverrides::WEIGHT)
    }

    pub fn line_style(&self) -> Option<&LineStyleInfo> {
        self.line_style.as_ref()
    }

    pub fn line_style_mut(&mut self) -> Option<&mut LineStyleInfo> {
        self.line_style.as_mut()
    }

    /// `None` overrides the sub-category style with a continuous line
    pub fn set_line_style(&mut self, line_style: Option<LineStyleInfo>) {
        self.overrides |= AppearanceOverrides::STYLE;
        self.line_style = line_style;
    }

    pub fn is_line_style_from_sub_category_appearance(&self) -> bool {
        !self.overrides.contains(AppearanceOverrides::STYLE)
    }

    pub fn has_stroked_line_style(&self) -> bool {
        self.line_style.as_ref().map_or(false, |ls| ls.is_stroked())
    }

    /// 0.0 = opaque, 1.0 = invisible
    pub fn transparency(&self) -> f64 {
        self.transparency
    }

    pub fn set_transparency(&mut self, transparency: f64) {
        self.transparency = transparency.clamp(0.0, 1.0);
    }

    /// Element-relative priority; only stored for 2-D geometry
    pub fn display_priority(&self) -> i32 {
        self.display_priority
    }

    pub fn set_display_priority(&mut self, priority: i32) {
        self.display_priority = priority;
    }

    /// Element priority plus sub-category priority, set when resolved
    pub fn net_display_priority(&self) -> i32 {
        self.net_priority
    }

    // ----- fill -----

    pub fn fill_display(&self) -> FillDisplay {
        self.fill_display
    }

    pub fn set_fill_display(&mut self, fill_display: FillDisplay) {
        self.fill_display = fill_display;
    }

    pub fn fill_color(&self) -> ColorDef {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: ColorDef) {
        self.overrides |= AppearanceOverrides::FILL;
        self.background_fill = BackgroundFill::None;
        self.fill_color = color;
    }

    pub fn set_fill_color_from_view_background(&mut self, outline: bool) {
        self.overrides |= AppearanceOverrides::FILL;
        self.background_fill = if outline {
            BackgroundFill::Outline
        } else {
            BackgroundFill::Solid
        };
    }

    pub fn background_fill(&self) -> BackgroundFill {
        self.background_fill
    }

    pub fn is_fill_color_from_view_background(&self) -> bool {
        self.background_fill != BackgroundFill::None
    }

    pub fn is_fill_color_from_sub_category_appearance(&self) -> bool {
        !self.overrides.contains(AppearanceOverrides::FILL)
    }

    pub fn fill_transparency(&self) -> f64 {
        self.fill_transparency
    }

    pub fn set_fill_transparency(&mut self, transparency: f64) {
        self.fill_transparency = transparency.clamp(0.0, 1.0);
    }

    pub fn gradient(&self) -> Option<&GradientSymb> {
        self.gradient.as_ref()
    }

    pub fn set_gradient(&mut self, gradient: Option<GradientSymb>) {
        self.gradient = gradient;
    }

    pub fn pattern(&self) -> Option<&PatternParams> {
        self.pattern.as_ref()
    }

    pub fn set_pattern(&mut self, pattern: Option<PatternParams>) {
        self.pattern = pattern;
    }

    // ----- material -----

    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    /// The invalid id overrides the sub-category material with none
    pub fn set_material_id(&mut self, material_id: MaterialId) {
        self.overrides |= AppearanceOverrides::MATERIAL;
        self.material_id = material_id;
    }

    pub fn is_material_from_sub_category_appearance(&self) -> bool {
        !self.overrides.contains(AppearanceOverrides::MATERIAL)
    }

    // ----- resolution -----

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Keep category and sub-category, drop everything else
    pub fn reset_appearance(&mut self) {
        *self = GeometryParams::new(self.category_id, self.sub_category_id);
    }

    /// Fill inherited properties from the sub-category appearance
    pub fn resolve_with(&mut self, appearance: &SubCategoryAppearance) {
        if self.is_line_color_from_sub_category_appearance() {
            self.line_color = appearance.color;
        }
        if self.is_weight_from_sub_category_appearance() {
            self.weight = appearance.weight;
        }
        if self.is_line_style_from_sub_category_appearance() {
            self.line_style = appearance
                .style
                .is_valid()
                .then(|| LineStyleInfo::new(appearance.style, None));
        }
        if self.is_material_from_sub_category_appearance() {
            self.material_id = appearance.material;
        }
        if self.is_fill_color_from_sub_category_appearance() {
            self.fill_color = appearance.fill_color;
        }
        self.net_priority = self.display_priority + appearance.priority;
        self.resolved = true;
    }

    /// Equality as far as the stream encoding is concerned.
    ///
    /// Inherited property values are ignored; two params that differ only
    /// in what they resolved to are equivalent.
    pub fn is_equivalent(&self, other: &GeometryParams) -> bool {
        if self.category_id != other.category_id
            || self.sub_category_id != other.sub_category_id
            || self.geometry_class != other.geometry_class
            || self.overrides != other.overrides
        {
            return false;
        }
        if self.overrides.contains(AppearanceOverrides::COLOR) && self.line_color != other.line_color {
            return false;
        }
        if self.overrides.contains(AppearanceOverrides::WEIGHT) && self.weight != other.weight {
            return false;
        }
        if self.overrides.contains(AppearanceOverrides::STYLE) {
            let same = match (&self.line_style, &other.line_style) {
                (Some(a), Some(b)) => a.is_equivalent(b),
                (None, None) => true,
                _ => false,
            };
            if !same {
                return false;
            }
        }
        if self.overrides.contains(AppearanceOverrides::MATERIAL) && self.material_id != other.material_id {
            return false;
        }
        if (self.transparency - other.transparency).abs() > TRANSPARENCY_TOLERANCE
            || self.display_priority != other.display_priority
            || self.fill_display != other.fill_display
        {
            return false;
        }
        if self.fill_display != FillDisplay::Never {
            if (self.fill_transparency - other.fill_transparency).abs() > TRANSPARENCY_TOLERANCE
                || self.background_fill != other.background_fill
                || self.gradient != other.gradient
            {
                return false;
            }
            if self.overrides.contains(AppearanceOverrides::FILL) && self.fill_color != other.fill_color {
                return false;
            }
        }
        self.pattern == other.pattern
    }

    /// Params carry location-dependent data (pattern frame, style scale)
    pub fn is_transformable(&self) -> bool {
        self.pattern.is_some()
            || self
                .line_style
                .as_ref()
                .map_or(false, |ls| ls.params.is_some())
    }

    pub fn apply_transform(&mut self, transform: &Transform) {
        if let Some(pattern) = &mut self.pattern {
            pattern.apply_transform(transform);
        }
        if let Some(params) = self.line_style.as_mut().and_then(|ls| ls.params.as_mut()) {
            params.apply_transform(transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LineStyleId;

    fn appearance() -> SubCategoryAppearance {
        SubCategoryAppearance {
            color: ColorDef::BLUE,
            weight: 3,
            style: LineStyleId::new(0x20),
            priority: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_fills_inherited_only() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_line_color(ColorDef::RED);
        params.set_display_priority(2);
        params.resolve_with(&appearance());
        assert!(params.is_resolved());
        assert_eq!(params.line_color(), ColorDef::RED);
        assert_eq!(params.weight(), 3);
        assert_eq!(params.line_style().map(|ls| ls.style_id), Some(LineStyleId::new(0x20)));
        assert_eq!(params.net_display_priority(), 7);
    }

    #[test]
    fn test_equivalence_ignores_resolved_values() {
        let a = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        let mut b = a.clone();
        b.resolve_with(&appearance());
        assert!(a.is_equivalent(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_equivalence_sees_overrides() {
        let a = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        let mut b = a.clone();
        b.set_weight(0);
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn test_sub_category_change_clears_overrides() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_line_color(ColorDef::GREEN);
        params.set_sub_category_id(SubCategoryId::new(3));
        assert!(params.is_line_color_from_sub_category_appearance());
    }

    #[test]
    fn test_reset_appearance_keeps_category() {
        let mut params = GeometryParams::new(CategoryId::new(1), SubCategoryId::new(2));
        params.set_fill_display(FillDisplay::Always);
        params.set_transparency(0.5);
        params.reset_appearance();
        assert_eq!(params.category_id(), CategoryId::new(1));
        assert_eq!(params.sub_category_id(), SubCategoryId::new(2));
        assert_eq!(params.fill_display(), FillDisplay::Never);
        assert_eq!(params.transparency(), 0.0);
    }

    #[test]
    fn test_transformable_with_pattern() {
        let mut params = GeometryParams::default();
        assert!(!params.is_transformable());
        params.set_pattern(Some(PatternParams::hatch(1.0, 0.0)));
        assert!(params.is_transformable());
        params.apply_transform(&Transform::from_scale(2.0));
        assert!((params.pattern().unwrap().primary_spacing - 2.0).abs() < 1e-12);
    }
}
