use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::{Point2, Point3, segment_barycentric};
use crate::io::{self, columnar};
use crate::metrics::TimingBucket;

use super::locate::{evaluate_marked, nearest_segment};
use super::{FieldKind, TransferContext};

/// Polyline in the `(r, z)` half plane with named point fields.
///
/// Consecutive points form the segments; there is no closing segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface2d {
    points: Vec<Point2>,
    fields: BTreeMap<String, Vec<f64>>,
}

impl Surface2d {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the polyline. Every field must hold one value per point.
    pub fn load(&mut self, points: Vec<Point2>, fields: BTreeMap<String, Vec<f64>>) -> SurfaceResult<()> {
        self.clear();
        if let Some((name, values)) = fields.iter().find(|(_, values)| values.len() != points.len()) {
            return Err(SurfaceError::format(format!(
                "point field '{name}' has {} values, expected {}",
                values.len(),
                points.len()
            )));
        }
        self.points = points;
        self.fields = fields;
        self.log_info();
        Ok(())
    }

    /// Reads columnar text: a header with two coordinate names and the field
    /// names, then one row per point.
    pub fn read_txt(&mut self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        self.clear();
        let input = io::read_to_string(path)?;
        log::info!("Reading '{}'", path.display());
        self.load_txt_str(&input)
    }

    pub fn load_txt_str(&mut self, input: &str) -> SurfaceResult<()> {
        self.clear();
        let columns = columnar::parse(input)?;
        self.load(columns.points, columns.fields)
    }

    pub fn write_txt(&self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        log::info!("Saving to '{}'", path.display());
        let mut out = BufWriter::new(File::create(path)?);
        self.write_txt_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_txt_to<W: Write>(&self, out: &mut W) -> SurfaceResult<()> {
        columnar::write(&self.points, &self.fields, out)
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.fields.clear();
    }

    fn log_info(&self) {
        log::info!("polyline: {} points", self.points.len());
        for (name, values) in &self.fields {
            log::info!("PointData {name} {}", values.len());
        }
    }

    pub fn field(&self, name: &str) -> SurfaceResult<&[f64]> {
        self.fields
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SurfaceError::FieldNotFound {
                kind: FieldKind::Point,
                name: name.to_owned(),
            })
    }

    /// Evaluates field `name` at every marked target.
    ///
    /// The closest point over all segments wins, ties going to the first
    /// segment; its endpoint values are blended linearly. Unmarked targets
    /// get `0.0`.
    pub fn interpolate(&self, name: &str, targets: &[Point2], markers: &[bool]) -> SurfaceResult<Vec<f64>> {
        self.interpolate_with_context(name, targets, markers, &mut TransferContext::new())
    }

    pub fn interpolate_with_context(
        &self,
        name: &str,
        targets: &[Point2],
        markers: &[bool],
        ctx: &mut TransferContext,
    ) -> SurfaceResult<Vec<f64>> {
        if targets.len() != markers.len() {
            return Err(SurfaceError::MarkerCount {
                points: targets.len(),
                markers: markers.len(),
            });
        }
        let values = self.field(name)?;

        log::debug!("interpolating point field '{name}' at {} points", targets.len());
        ctx.metrics.time(TimingBucket::Interpolation, || {
            evaluate_marked(targets, markers, |target| self.value_at(values, target))
        })
    }

    /// Interpolates at 3D targets, reduced to `(hypot(x, y), z)` first.
    pub fn interpolate_cylindrical(&self, name: &str, targets: &[Point3], markers: &[bool]) -> SurfaceResult<Vec<f64>> {
        let targets: Vec<Point2> = targets.iter().copied().map(Point2::from_cylindrical).collect();
        self.interpolate(name, &targets, markers)
    }

    fn value_at(&self, values: &[f64], target: Point2) -> SurfaceResult<f64> {
        let hit = nearest_segment(&self.points, target).ok_or_else(|| SurfaceError::InterpolationFailed {
            coordinates: target.to_array().to_vec(),
        })?;
        let j = hit.index;
        let [w0, w1] = segment_barycentric(hit.point, self.points[j], self.points[j + 1]);
        Ok(w0 * values[j] + w1 * values[j + 1])
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.fields.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
