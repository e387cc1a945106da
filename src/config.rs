//! Configuration for the builder, replay engine and import pass

use crate::geometry::MIN_PIECES_PER_PATCH;
use crate::stream::HeaderFlags;
use crate::types::SubCategoryId;

/// Facetting controls handed to the solid kernel for mesh fallbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacetOptions {
    /// Maximum distance between a chord and its curve.
    ///
    /// Default: `0.0` (kernel chooses).
    pub chord_tolerance: f64,

    /// Maximum facet edge length, `0.0` for unlimited.
    pub max_edge_length: f64,

    /// Minimum pieces per B-spline patch in each direction.
    pub min_pieces_per_patch: usize,
}

impl Default for FacetOptions {
    fn default() -> Self {
        Self {
            chord_tolerance: 0.0,
            max_edge_length: 0.0,
            min_pieces_per_patch: MIN_PIECES_PER_PATCH,
        }
    }
}

/// Configuration for [`GeometryBuilder`](crate::builder::GeometryBuilder).
#[derive(Debug, Clone)]
pub struct BuilderConfiguration {
    /// Facetting used when a BRep needs a mesh fallback.
    pub facet_options: FacetOptions,

    /// Flags of the `Header` operation written first.
    ///
    /// Default: `None` (no header is written).
    pub header_flags: Option<HeaderFlags>,

    /// When `false`, sub-graphic range requests are ignored.
    ///
    /// Default: `true`.
    pub allow_sub_graphic_ranges: bool,
}

impl Default for BuilderConfiguration {
    fn default() -> Self {
        Self {
            facet_options: FacetOptions::default(),
            header_flags: None,
            allow_sub_graphic_ranges: true,
        }
    }
}

/// Options for [`Replay::draw`](crate::replay::Replay::draw).
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Draw the fallback representations even when the consumer can draw
    /// the BRep itself.
    pub brep_fallbacks_only: bool,

    /// When `false`, `SubGraphicRange` operations are skipped and everything
    /// draws into the main graphic.
    ///
    /// Default: `true`.
    pub honor_sub_graphic_ranges: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            brep_fallbacks_only: false,
            honor_sub_graphic_ranges: true,
        }
    }
}

/// Options for [`Importer`](crate::import::Importer).
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// When `true`, a failed remap also trips a debug assertion.
    ///
    /// Default: `false` (failures are only reported).
    pub strict: bool,

    /// Operations are dropped while one of these sub-categories is active.
    pub skip_sub_categories: Vec<SubCategoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(FacetOptions::default().min_pieces_per_patch, 3);
        assert!(BuilderConfiguration::default().allow_sub_graphic_ranges);
        assert!(BuilderConfiguration::default().header_flags.is_none());
        assert!(ReplayOptions::default().honor_sub_graphic_ranges);
        assert!(!ImportOptions::default().strict);
    }
}
