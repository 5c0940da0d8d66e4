use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::{Point2, Point3, Triangle, Vec3};
use crate::io::{self, SurfaceMesh, vtk_legacy, vtu};
use crate::metrics::TimingBucket;

use super::locate::{evaluate_marked, nearest_triangle};
use super::{FieldKind, FieldTable, InterpolationOptions, TransferContext, cell_to_point, point_to_cell};

/// Triangulated surface carrying named cell and point fields.
///
/// Every successful load rebuilds the triangle cache and the derived cell
/// fields `area`, `longest_side` (scalars) and `center`, `normal`
/// (vectors). A failed load leaves the surface empty.
#[derive(Debug, Clone, Default)]
pub struct Surface3d {
    mesh: SurfaceMesh,
    triangle_cache: Vec<Triangle>,
    options: InterpolationOptions,
}

impl Surface3d {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface whose plain `interpolate` calls use `options`.
    ///
    /// The `*_with_context` methods read `ctx.options` instead; see
    /// [`Surface3d::context`].
    #[must_use]
    pub fn with_options(options: InterpolationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn options(&self) -> &InterpolationOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: InterpolationOptions) {
        self.options = options;
    }

    /// Fresh context carrying this surface's options.
    #[must_use]
    pub fn context(&self) -> TransferContext {
        TransferContext::with_options(self.options)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────

    /// Replaces the surface with in-memory data.
    pub fn load(
        &mut self,
        points: Vec<Point3>,
        triangles: Vec<[usize; 3]>,
        cell_fields: BTreeMap<String, Vec<f64>>,
        point_fields: BTreeMap<String, Vec<f64>>,
    ) -> SurfaceResult<()> {
        self.load_mesh(SurfaceMesh {
            points,
            triangles,
            cell_data: FieldTable::from_scalars(cell_fields),
            point_data: FieldTable::from_scalars(point_fields),
        })
    }

    pub fn load_mesh(&mut self, mesh: SurfaceMesh) -> SurfaceResult<()> {
        let mut ctx = self.context();
        self.load_mesh_with_context(mesh, &mut ctx)
    }

    /// Validates `mesh`, stores it and rebuilds the triangle cache.
    ///
    /// On error the surface is left empty.
    pub fn load_mesh_with_context(&mut self, mesh: SurfaceMesh, ctx: &mut TransferContext) -> SurfaceResult<()> {
        self.clear();
        mesh.validate()?;
        self.mesh = mesh;
        ctx.metrics.time(TimingBucket::Preprocess, || self.preprocess());
        self.log_info();
        Ok(())
    }

    /// Reads a legacy ASCII VTK file.
    pub fn read_vtk(&mut self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        self.clear();
        let input = io::read_to_string(path)?;
        log::info!("Reading '{}'", path.display());
        self.load_vtk_str(&input)
    }

    pub fn load_vtk_str(&mut self, input: &str) -> SurfaceResult<()> {
        self.clear();
        let mesh = vtk_legacy::parse(input)?;
        self.load_mesh(mesh)
    }

    /// Reads an ASCII VTU file.
    pub fn read_vtu(&mut self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        self.clear();
        let input = io::read_to_string(path)?;
        log::info!("Reading '{}'", path.display());
        self.load_vtu_str(&input)
    }

    pub fn load_vtu_str(&mut self, input: &str) -> SurfaceResult<()> {
        self.clear();
        let mesh = vtu::parse(input)?;
        self.load_mesh(mesh)
    }

    /// Writes points, triangles and every field as an ASCII VTU file.
    pub fn write_vtu(&self, path: impl AsRef<Path>) -> SurfaceResult<()> {
        let path = path.as_ref();
        log::info!("Saving to '{}'", path.display());
        let mut out = BufWriter::new(File::create(path)?);
        self.write_vtu_to(&mut out)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_vtu_to<W: Write>(&self, out: &mut W) -> SurfaceResult<()> {
        vtu::write(&self.mesh, out)
    }

    pub fn clear(&mut self) {
        self.mesh = SurfaceMesh::default();
        self.triangle_cache.clear();
    }

    fn preprocess(&mut self) {
        let points = &self.mesh.points;
        self.triangle_cache = self
            .mesh
            .triangles
            .iter()
            .map(|v| Triangle::new(points[v[0]], points[v[1]], points[v[2]]))
            .collect();

        let cells = &mut self.mesh.cell_data;
        cells.insert_scalar("area", self.triangle_cache.iter().map(Triangle::area).collect());
        cells.insert_scalar(
            "longest_side",
            self.triangle_cache.iter().map(Triangle::longest_side).collect(),
        );
        cells.insert_vector(
            "center",
            self.triangle_cache.iter().map(|t| t.center().to_vec3()).collect(),
        );
        cells.insert_vector("normal", self.triangle_cache.iter().map(Triangle::normal).collect());

        let degenerate = self.triangle_cache.iter().filter(|t| t.is_degenerate()).count();
        if degenerate > 0 {
            log::warn!("{degenerate} degenerate triangles will be ignored by interpolation");
        }
        log::debug!("preprocessed {} triangles", self.triangle_cache.len());
    }

    fn log_info(&self) {
        log::info!(
            "surface: {} points, {} triangles",
            self.mesh.points.len(),
            self.mesh.triangles.len()
        );
        for (tag, table) in [("CellData", &self.mesh.cell_data), ("PointData", &self.mesh.point_data)] {
            for (name, values) in table.scalars() {
                log::info!("{tag} {name} {}", values.len());
            }
            for (name, values) in table.vectors() {
                log::info!("{tag} {name} {}x3", values.len());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fields
    // ─────────────────────────────────────────────────────────────────────

    /// Scalar field `name` of the given kind.
    pub fn field(&self, kind: FieldKind, name: &str) -> SurfaceResult<&[f64]> {
        self.mesh
            .table(kind)
            .scalar(name)
            .ok_or_else(|| SurfaceError::FieldNotFound {
                kind,
                name: name.to_owned(),
            })
    }

    pub fn vector_field(&self, kind: FieldKind, name: &str) -> SurfaceResult<&[Vec3]> {
        self.mesh
            .table(kind)
            .vector(name)
            .ok_or_else(|| SurfaceError::FieldNotFound {
                kind,
                name: name.to_owned(),
            })
    }

    /// Adds or replaces a scalar field; its length must match the cell or
    /// point count.
    pub fn insert_field(&mut self, kind: FieldKind, name: impl Into<String>, values: Vec<f64>) -> SurfaceResult<()> {
        let name = name.into();
        let expected = self.mesh.count(kind);
        if values.len() != expected {
            return Err(SurfaceError::format(format!(
                "{kind} field '{name}' has {} values, expected {expected}",
                values.len()
            )));
        }
        self.mesh.table_mut(kind).insert_scalar(name, values);
        Ok(())
    }

    /// Converts a cell field to a point field or back.
    ///
    /// The result is stored as `target_name`, or under `source_name` when
    /// `None`.
    pub fn convert(
        &mut self,
        source_kind: FieldKind,
        source_name: &str,
        target_kind: FieldKind,
        target_name: Option<&str>,
    ) -> SurfaceResult<()> {
        let mut ctx = self.context();
        self.convert_with_context(source_kind, source_name, target_kind, target_name, &mut ctx)
    }

    pub fn convert_with_context(
        &mut self,
        source_kind: FieldKind,
        source_name: &str,
        target_kind: FieldKind,
        target_name: Option<&str>,
        ctx: &mut TransferContext,
    ) -> SurfaceResult<()> {
        if source_kind == target_kind {
            return Err(SurfaceError::UnsupportedConversion {
                from: source_kind,
                to: target_kind,
            });
        }
        let target_name = target_name.unwrap_or(source_name);

        let source = self.field(source_kind, source_name)?;
        let triangles = &self.mesh.triangles;
        let n_points = self.mesh.points.len();
        let converted = ctx.metrics.time(TimingBucket::Conversion, || match source_kind {
            FieldKind::Cell => cell_to_point(triangles, n_points, source),
            FieldKind::Point => point_to_cell(triangles, source),
        });

        log::debug!("converted {source_kind} field '{source_name}' to {target_kind} field '{target_name}'");
        self.mesh.table_mut(target_kind).insert_scalar(target_name, converted);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Interpolation
    // ─────────────────────────────────────────────────────────────────────

    /// Evaluates field `name` at every marked target point.
    ///
    /// Cell fields take the value of the nearest triangle; point fields are
    /// blended with the barycentric weights of the closest surface point.
    /// Unmarked targets get `0.0`.
    pub fn interpolate(
        &self,
        kind: FieldKind,
        name: &str,
        targets: &[Point3],
        markers: &[bool],
    ) -> SurfaceResult<Vec<f64>> {
        let mut ctx = self.context();
        self.interpolate_with_context(kind, name, targets, markers, &mut ctx)
    }

    /// Same as [`Surface3d::interpolate`], searching with `ctx.options`
    /// rather than the surface's own options.
    pub fn interpolate_with_context(
        &self,
        kind: FieldKind,
        name: &str,
        targets: &[Point3],
        markers: &[bool],
        ctx: &mut TransferContext,
    ) -> SurfaceResult<Vec<f64>> {
        if targets.len() != markers.len() {
            return Err(SurfaceError::MarkerCount {
                points: targets.len(),
                markers: markers.len(),
            });
        }
        let values = self.field(kind, name)?;
        let options = ctx.options;

        log::debug!("interpolating {kind} field '{name}' at {} points", targets.len());
        ctx.metrics.time(TimingBucket::Interpolation, || {
            evaluate_marked(targets, markers, |target| self.value_at(kind, values, target, &options))
        })
    }

    /// Interpolates at axisymmetric `(r, z)` targets, placed at `(r, 0, z)`.
    pub fn interpolate_axisymmetric(
        &self,
        kind: FieldKind,
        name: &str,
        targets: &[Point2],
        markers: &[bool],
    ) -> SurfaceResult<Vec<f64>> {
        let targets: Vec<Point3> = targets.iter().copied().map(Point3::from_axisymmetric).collect();
        self.interpolate(kind, name, &targets, markers)
    }

    fn value_at(
        &self,
        kind: FieldKind,
        values: &[f64],
        target: Point3,
        options: &InterpolationOptions,
    ) -> SurfaceResult<f64> {
        let hit = nearest_triangle(&self.triangle_cache, target, options).ok_or_else(|| {
            SurfaceError::InterpolationFailed {
                coordinates: target.to_array().to_vec(),
            }
        })?;

        Ok(match kind {
            FieldKind::Cell => values[hit.index],
            FieldKind::Point => {
                let weights = self.triangle_cache[hit.index].barycentric_coordinates(hit.point);
                let v = self.mesh.triangles[hit.index];
                weights[0] * values[v[0]] + weights[1] * values[v[1]] + weights[2] * values[v[2]]
            }
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.mesh.points
    }

    #[must_use]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.mesh.triangles
    }

    #[must_use]
    pub fn triangle_cache(&self) -> &[Triangle] {
        &self.triangle_cache
    }

    #[must_use]
    pub fn cell_data(&self) -> &FieldTable {
        &self.mesh.cell_data
    }

    #[must_use]
    pub fn point_data(&self) -> &FieldTable {
        &self.mesh.point_data
    }

    #[must_use]
    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.mesh.points.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mesh.points.is_empty() && self.mesh.triangles.is_empty()
    }
}
