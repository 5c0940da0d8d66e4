//! Whitespace separated columns describing a 2D polyline.
//!
//! The first non-empty line is a header: two coordinate column names
//! followed by one name per field. Every other non-empty line holds the two
//! coordinates of a point and one value per field.
//!
//! ```text
//! r z T
//! 0.0 0.0 1200
//! 0.1 0.0 1210
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::Point2;

use super::format_float;

/// Points and named per-point fields of a polyline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub points: Vec<Point2>,
    pub fields: BTreeMap<String, Vec<f64>>,
}

/// Coordinate column names for a `dim`-dimensional problem.
///
/// Two-dimensional problems are axisymmetric, hence `r` and `z`.
#[must_use]
pub fn coordinate_names(dim: usize) -> Option<&'static [&'static str]> {
    match dim {
        1 => Some(&["x"]),
        2 => Some(&["r", "z"]),
        3 => Some(&["x", "y", "z"]),
        _ => None,
    }
}

/// Parses columnar polyline text.
pub fn parse(input: &str) -> SurfaceResult<Columns> {
    let mut lines = input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Ok(Columns::default());
    };

    let mut header = header.split_whitespace();
    if header.by_ref().take(2).count() != 2 {
        return Err(SurfaceError::format("header needs two coordinate columns"));
    }
    let names: Vec<&str> = header.collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut points = Vec::new();

    for (index, line) in lines {
        let row = parse_row(line, index + 1)?;
        if row.len() != names.len() + 2 {
            return Err(SurfaceError::format(format!(
                "line {}: {} columns, expected {}",
                index + 1,
                row.len(),
                names.len() + 2
            )));
        }
        points.push(Point2::new(row[0], row[1]));
        for (column, value) in columns.iter_mut().zip(&row[2..]) {
            column.push(*value);
        }
    }

    let mut fields = BTreeMap::new();
    for (name, values) in names.into_iter().zip(columns) {
        if fields.insert(name.to_owned(), values).is_some() {
            return Err(SurfaceError::format(format!("duplicate field '{name}' in header")));
        }
    }

    log::debug!("parsed {} polyline points with {} fields", points.len(), fields.len());
    Ok(Columns { points, fields })
}

fn parse_row(line: &str, line_number: usize) -> SurfaceResult<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| {
                SurfaceError::format(format!("line {line_number}: invalid number '{token}'"))
            })
        })
        .collect()
}

/// Writes `points` and `fields` in the layout [`parse`] reads.
pub fn write<W: Write>(
    points: &[Point2],
    fields: &BTreeMap<String, Vec<f64>>,
    out: &mut W,
) -> SurfaceResult<()> {
    let mut header: Vec<&str> = coordinate_names(2).map(<[&str]>::to_vec).unwrap_or_default();
    header.extend(fields.keys().map(String::as_str));
    writeln!(out, "{}", header.join(" "))?;

    for (i, point) in points.iter().enumerate() {
        write!(out, "{} {}", format_float(point.x), format_float(point.y))?;
        for values in fields.values() {
            write!(out, " {}", format_float(values[i]))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
