//! Readers and writers for surface files.
//!
//! Every reader parses into a [`SurfaceMesh`] first; the stores only accept
//! a mesh that passed [`SurfaceMesh::validate`], so a failed load never
//! leaves half a surface behind.

pub mod columnar;
pub mod vtk_legacy;
pub mod vtu;

use std::fs;
use std::path::Path;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::Point3;
use crate::surface::{FieldKind, FieldTable};

/// Triangulated surface with its fields, as read from or written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub points: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
    pub cell_data: FieldTable,
    pub point_data: FieldTable,
}

impl SurfaceMesh {
    /// Number of entries a field of `kind` must hold.
    #[must_use]
    pub fn count(&self, kind: FieldKind) -> usize {
        match kind {
            FieldKind::Cell => self.triangles.len(),
            FieldKind::Point => self.points.len(),
        }
    }

    #[must_use]
    pub fn table(&self, kind: FieldKind) -> &FieldTable {
        match kind {
            FieldKind::Cell => &self.cell_data,
            FieldKind::Point => &self.point_data,
        }
    }

    pub fn table_mut(&mut self, kind: FieldKind) -> &mut FieldTable {
        match kind {
            FieldKind::Cell => &mut self.cell_data,
            FieldKind::Point => &mut self.point_data,
        }
    }

    /// Checks vertex indices and field lengths.
    pub fn validate(&self) -> SurfaceResult<()> {
        let n_points = self.points.len();
        for (cell, triangle) in self.triangles.iter().enumerate() {
            if let Some(id) = triangle.iter().find(|&&id| id >= n_points) {
                return Err(SurfaceError::format(format!(
                    "triangle {cell} references point {id}, but the surface has {n_points} points"
                )));
            }
        }
        self.cell_data.check_lengths(FieldKind::Cell, self.triangles.len())?;
        self.point_data.check_lengths(FieldKind::Point, n_points)
    }
}

/// Reads a whole input file, mapping open failures to
/// [`SurfaceError::FileNotFound`].
pub(crate) fn read_to_string(path: &Path) -> SurfaceResult<String> {
    fs::read_to_string(path).map_err(|source| {
        log::warn!("could not open '{}': {source}", path.display());
        SurfaceError::FileNotFound {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// `count * factor` for counts declared in a file; overflow is a format
/// error.
pub(crate) fn scaled_count(count: usize, factor: usize, what: &str) -> SurfaceResult<usize> {
    count
        .checked_mul(factor)
        .ok_or_else(|| SurfaceError::format(format!("{what} count {count} is out of range")))
}

/// Scientific notation with 14 significant digits.
pub(crate) fn format_float(value: f64) -> String {
    format!("{value:.13e}")
}
