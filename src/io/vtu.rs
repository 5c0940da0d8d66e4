//! VTK XML unstructured grid (`.vtu`) reader and writer, ASCII arrays only.

use std::io::Write;

use quick_xml::de::from_str;
use quick_xml::escape::escape;
use serde::Deserialize;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::{Point3, Vec3};
use crate::surface::FieldKind;

use super::{SurfaceMesh, format_float, scaled_count};

/// VTK cell type code of a linear triangle.
pub const VTK_TRIANGLE: u8 = 5;

/// Parses a VTU document holding a single triangulated piece.
pub fn parse(input: &str) -> SurfaceResult<SurfaceMesh> {
    log::debug!("Start parsing VTU document");
    let document: VtkFile = from_str(input)?;

    if let Some(kind) = document.file_type.as_deref() {
        if kind != "UnstructuredGrid" {
            return Err(SurfaceError::format(format!(
                "expected an UnstructuredGrid file, found '{kind}'"
            )));
        }
    }

    let mut pieces = document.grid.pieces.into_iter();
    let piece = pieces
        .next()
        .ok_or_else(|| SurfaceError::format("UnstructuredGrid has no Piece"))?;
    if pieces.next().is_some() {
        return Err(SurfaceError::format("multi-piece grids are not supported"));
    }

    let n_points = piece.number_of_points;
    let n_cells = piece.number_of_cells;
    let mut mesh = SurfaceMesh::default();

    let coordinates = piece
        .points
        .arrays
        .first()
        .ok_or_else(|| SurfaceError::format("Points section has no DataArray"))?;
    let coordinates: Vec<f64> = coordinates.values("Points")?;
    let expected = scaled_count(n_points, 3, "NumberOfPoints")?;
    if coordinates.len() != expected {
        return Err(SurfaceError::format(format!(
            "Points holds {} values, expected {expected}",
            coordinates.len()
        )));
    }
    mesh.points = coordinates
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    let connectivity = piece
        .cells
        .arrays
        .iter()
        .find(|array| array.name.as_deref() == Some("connectivity"))
        .ok_or_else(|| SurfaceError::format("Cells section has no connectivity array"))?;
    let connectivity: Vec<usize> = connectivity.values("connectivity")?;
    let expected = scaled_count(n_cells, 3, "NumberOfCells")?;
    if connectivity.len() != expected {
        return Err(SurfaceError::format(format!(
            "connectivity holds {} indices, expected {expected} for {n_cells} triangles",
            connectivity.len()
        )));
    }
    mesh.triangles = connectivity
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    read_section(&mut mesh, FieldKind::Cell, &piece.cell_data)?;
    read_section(&mut mesh, FieldKind::Point, &piece.point_data)?;

    log::debug!("parsed VTU: {n_points} points, {n_cells} triangles");
    Ok(mesh)
}

fn read_section(mesh: &mut SurfaceMesh, kind: FieldKind, section: &DataSection) -> SurfaceResult<()> {
    let expected = mesh.count(kind);

    for array in &section.arrays {
        let name = array
            .name
            .clone()
            .ok_or_else(|| SurfaceError::format(format!("unnamed DataArray in {kind} data")))?;
        let components = array.components.unwrap_or(1);
        if components != 1 && components != 3 {
            log::debug!("skipping {kind} field '{name}' with {components} components");
            continue;
        }

        let values: Vec<f64> = array.values(&name)?;
        let wanted = scaled_count(expected, components, "DataArray")?;
        if values.len() != wanted {
            return Err(SurfaceError::format(format!(
                "{kind} field '{name}' holds {} values, expected {wanted}",
                values.len()
            )));
        }

        let table = mesh.table_mut(kind);
        if components == 1 {
            table.insert_scalar(name, values);
        } else {
            let vectors = values
                .chunks_exact(3)
                .map(|c| Vec3::new(c[0], c[1], c[2]))
                .collect();
            table.insert_vector(name, vectors);
        }
    }
    Ok(())
}

/// Writes `mesh` as an ASCII VTU document.
pub fn write<W: Write>(mesh: &SurfaceMesh, out: &mut W) -> SurfaceResult<()> {
    let n_points = mesh.points.len();
    let n_cells = mesh.triangles.len();

    writeln!(out, "<?xml version=\"1.0\"?>")?;
    writeln!(
        out,
        "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
    )?;
    writeln!(out, "<UnstructuredGrid>")?;
    writeln!(out, "<Piece NumberOfPoints=\"{n_points}\" NumberOfCells=\"{n_cells}\">")?;

    for (kind, tag) in [(FieldKind::Cell, "CellData"), (FieldKind::Point, "PointData")] {
        let table = mesh.table(kind);
        writeln!(out, "<{tag}>")?;
        for (name, values) in table.scalars() {
            let name = escape(name);
            writeln!(out, "<DataArray type=\"Float64\" Name=\"{name}\" format=\"ascii\">")?;
            write_floats(out, values.iter().copied())?;
            writeln!(out, "</DataArray>")?;
        }
        for (name, values) in table.vectors() {
            let name = escape(name);
            writeln!(
                out,
                "<DataArray type=\"Float64\" Name=\"{name}\" NumberOfComponents=\"3\" format=\"ascii\">"
            )?;
            write_triples(out, values.iter().map(|v| v.to_array()))?;
            writeln!(out, "</DataArray>")?;
        }
        writeln!(out, "</{tag}>")?;
    }

    writeln!(out, "<Points>")?;
    writeln!(out, "<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">")?;
    write_triples(out, mesh.points.iter().map(|p| p.to_array()))?;
    writeln!(out, "</DataArray>")?;
    writeln!(out, "</Points>")?;

    writeln!(out, "<Cells>")?;
    writeln!(out, "<DataArray type=\"Int32\" Name=\"connectivity\" format=\"ascii\">")?;
    for [a, b, c] in &mesh.triangles {
        writeln!(out, "{a} {b} {c}")?;
    }
    writeln!(out, "</DataArray>")?;
    writeln!(out, "<DataArray type=\"Int32\" Name=\"offsets\" format=\"ascii\">")?;
    for i in 0..n_cells {
        write!(out, "{} ", 3 * (i + 1))?;
    }
    writeln!(out)?;
    writeln!(out, "</DataArray>")?;
    writeln!(out, "<DataArray type=\"UInt8\" Name=\"types\" format=\"ascii\">")?;
    for _ in 0..n_cells {
        write!(out, "{VTK_TRIANGLE} ")?;
    }
    writeln!(out)?;
    writeln!(out, "</DataArray>")?;
    writeln!(out, "</Cells>")?;

    writeln!(out, "</Piece>")?;
    writeln!(out, "</UnstructuredGrid>")?;
    writeln!(out, "</VTKFile>")?;
    Ok(())
}

fn write_floats<W: Write>(out: &mut W, values: impl Iterator<Item = f64>) -> SurfaceResult<()> {
    for value in values {
        write!(out, "{} ", format_float(value))?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_triples<W: Write>(out: &mut W, triples: impl Iterator<Item = [f64; 3]>) -> SurfaceResult<()> {
    for [x, y, z] in triples {
        writeln!(out, "{} {} {}", format_float(x), format_float(y), format_float(z))?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// XML document model
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VtkFile {
    #[serde(default, rename = "@type")]
    file_type: Option<String>,
    #[serde(rename = "UnstructuredGrid")]
    grid: UnstructuredGrid,
}

#[derive(Debug, Deserialize)]
struct UnstructuredGrid {
    #[serde(default, rename = "Piece")]
    pieces: Vec<Piece>,
}

#[derive(Debug, Deserialize)]
struct Piece {
    #[serde(rename = "@NumberOfPoints")]
    number_of_points: usize,
    #[serde(rename = "@NumberOfCells")]
    number_of_cells: usize,
    #[serde(default, rename = "PointData")]
    point_data: DataSection,
    #[serde(default, rename = "CellData")]
    cell_data: DataSection,
    #[serde(default, rename = "Points")]
    points: DataSection,
    #[serde(default, rename = "Cells")]
    cells: DataSection,
}

#[derive(Debug, Default, Deserialize)]
struct DataSection {
    #[serde(default, rename = "DataArray")]
    arrays: Vec<DataArray>,
}

#[derive(Debug, Deserialize)]
struct DataArray {
    #[serde(default, rename = "@Name")]
    name: Option<String>,
    #[serde(default, rename = "@NumberOfComponents")]
    components: Option<usize>,
    #[serde(default, rename = "@format")]
    format: Option<String>,
    #[serde(default, rename = "$text")]
    text: Option<String>,
}

impl DataArray {
    /// Parses the whitespace separated ASCII payload.
    fn values<T: std::str::FromStr>(&self, label: &str) -> SurfaceResult<Vec<T>> {
        if let Some(format) = self.format.as_deref() {
            if format != "ascii" {
                return Err(SurfaceError::format(format!(
                    "DataArray '{label}' uses unsupported format '{format}'"
                )));
            }
        }
        self.text
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(|token| {
                token
                    .parse()
                    .map_err(|_| SurfaceError::format(format!("invalid value '{token}' in '{label}'")))
            })
            .collect()
    }
}
