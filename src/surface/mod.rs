//! Surface stores and the field-transfer engine built on them.
//!
//! [`Surface3d`] holds a triangulated surface with cell and point fields,
//! [`Surface2d`] an ordered polyline with point fields. Both answer
//! interpolation queries for arbitrary target points through a
//! nearest-feature search; neither assumes any shared structure with the
//! mesh that owns the targets.

mod convert;
mod fields;
mod locate;
mod surface2d;
mod surface3d;

use std::fmt;

use crate::metrics::SurfaceMetrics;

pub use convert::{cell_to_point, point_to_cell};
pub use fields::FieldTable;
pub use locate::{SegmentHit, TriangleHit, nearest_segment, nearest_triangle};
pub use surface2d::Surface2d;
pub use surface3d::Surface3d;

/// Where the values of a field live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// One value per triangle.
    Cell,
    /// One value per surface point.
    Point,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => f.write_str("cell"),
            Self::Point => f.write_str("point"),
        }
    }
}

/// Tuning for the nearest-triangle search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationOptions {
    /// Triangles whose center is farther than `prune_factor` times their
    /// longest side from the target are skipped in the first pass.
    pub prune_factor: f64,
    /// Scan every triangle when the pruned pass finds no candidate.
    pub exhaustive_fallback: bool,
}

impl InterpolationOptions {
    pub const DEFAULT_PRUNE_FACTOR: f64 = 3.0;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            prune_factor: Self::DEFAULT_PRUNE_FACTOR,
            exhaustive_fallback: true,
        }
    }
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options plus the caller-owned metrics accumulator for the
/// `*_with_context` entry points.
#[derive(Debug, Clone, Default)]
pub struct TransferContext {
    pub options: InterpolationOptions,
    pub metrics: SurfaceMetrics,
}

impl TransferContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: InterpolationOptions) -> Self {
        Self {
            options,
            metrics: SurfaceMetrics::default(),
        }
    }
}
