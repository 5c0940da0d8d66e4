//! Reader for legacy ASCII VTK surfaces.
//!
//! Understands `POINTS`, `CELLS`/`POLYGONS` (triangles only),
//! `CELL_DATA`/`POINT_DATA` sections holding `SCALARS`, `VECTORS` and
//! `FIELD` arrays. Any other keyword is skipped.

use std::iter::Peekable;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::{Point3, Vec3};
use crate::surface::FieldKind;

use super::{SurfaceMesh, scaled_count};

/// Parses a legacy VTK document.
pub fn parse(input: &str) -> SurfaceResult<SurfaceMesh> {
    log::debug!("Start parsing legacy VTK document");

    let mut tokens = Tokens::new(body(input));
    let mut mesh = SurfaceMesh::default();
    let mut section: Option<FieldKind> = None;

    while let Some(keyword) = tokens.next_token() {
        match keyword {
            "POINTS" => {
                let n: usize = tokens.parse("point count")?;
                tokens.expect_any("point data type")?;
                mesh.points = (0..n)
                    .map(|_| tokens.parse_array("point coordinate").map(Point3::from_array))
                    .collect::<SurfaceResult<_>>()?;
            }
            "CELLS" | "POLYGONS" => {
                let n: usize = tokens.parse("cell count")?;
                let size: usize = tokens.parse("cell list size")?;
                if size != scaled_count(n, 4, keyword)? {
                    return Err(SurfaceError::format(format!(
                        "{keyword} list size {size} does not describe {n} triangles"
                    )));
                }
                mesh.triangles = (0..n)
                    .map(|cell| read_triangle(&mut tokens, cell))
                    .collect::<SurfaceResult<_>>()?;
            }
            "CELL_TYPES" => {
                let n: usize = tokens.parse("cell type count")?;
                tokens.skip(n, "cell type")?;
            }
            "CELL_DATA" | "POINT_DATA" => {
                let kind = if keyword == "CELL_DATA" { FieldKind::Cell } else { FieldKind::Point };
                let n: usize = tokens.parse("data count")?;
                let expected = mesh.count(kind);
                if n != expected {
                    return Err(SurfaceError::format(format!(
                        "{keyword} declares {n} values, but the surface has {expected}"
                    )));
                }
                section = Some(kind);
            }
            "SCALARS" => {
                let kind = data_section(section, keyword)?;
                let name = tokens.expect_any("scalar name")?.to_owned();
                tokens.expect_any("scalar data type")?;
                if tokens.peek() != Some("LOOKUP_TABLE") {
                    let components: usize = tokens.parse("component count")?;
                    if components != 1 {
                        return Err(SurfaceError::format(format!(
                            "scalar field '{name}' has {components} components, expected 1"
                        )));
                    }
                }
                tokens.expect("LOOKUP_TABLE")?;
                tokens.expect_any("lookup table name")?;
                let values = read_scalars(&mut tokens, mesh.count(kind))?;
                mesh.table_mut(kind).insert_scalar(name, values);
            }
            "VECTORS" => {
                let kind = data_section(section, keyword)?;
                let name = tokens.expect_any("vector name")?.to_owned();
                tokens.expect_any("vector data type")?;
                let values = read_vectors(&mut tokens, mesh.count(kind))?;
                mesh.table_mut(kind).insert_vector(name, values);
            }
            "FIELD" => {
                tokens.expect_any("field data name")?;
                let arrays: usize = tokens.parse("field array count")?;
                for _ in 0..arrays {
                    read_field_array(&mut tokens, &mut mesh, section)?;
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "parsed legacy VTK: {} points, {} triangles",
        mesh.points.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

/// Drops the version and title lines, whose free text may contain keywords.
fn body(input: &str) -> &str {
    let trimmed = input.trim_start();
    if !trimmed.starts_with('#') {
        return trimmed;
    }
    let mut rest = trimmed;
    for _ in 0..2 {
        rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
    }
    rest
}

fn data_section(section: Option<FieldKind>, keyword: &str) -> SurfaceResult<FieldKind> {
    section.ok_or_else(|| {
        SurfaceError::format(format!("{keyword} appears before CELL_DATA or POINT_DATA"))
    })
}

fn read_triangle(tokens: &mut Tokens<'_>, cell: usize) -> SurfaceResult<[usize; 3]> {
    let arity = tokens.expect_any("cell vertex count")?;
    if arity != "3" {
        return Err(SurfaceError::format(format!(
            "triangle expected, cell {cell} has {arity} vertices"
        )));
    }
    tokens.parse_array("vertex index")
}

fn read_scalars(tokens: &mut Tokens<'_>, n: usize) -> SurfaceResult<Vec<f64>> {
    (0..n).map(|_| tokens.parse("field value")).collect()
}

fn read_vectors(tokens: &mut Tokens<'_>, n: usize) -> SurfaceResult<Vec<Vec3>> {
    (0..n)
        .map(|_| tokens.parse_array("vector component").map(Vec3::from_array))
        .collect()
}

/// One `name components tuples type` array of a `FIELD` block.
fn read_field_array(
    tokens: &mut Tokens<'_>,
    mesh: &mut SurfaceMesh,
    section: Option<FieldKind>,
) -> SurfaceResult<()> {
    let name = tokens.expect_any("field array name")?.to_owned();
    let components: usize = tokens.parse("field array components")?;
    let tuples: usize = tokens.parse("field array tuples")?;
    tokens.expect_any("field array type")?;

    // field data attached to the dataset rather than cells or points
    let Some(kind) = section else {
        return tokens.skip(scaled_count(tuples, components, "field array")?, "field value");
    };

    let expected = mesh.count(kind);
    if tuples != expected {
        return Err(SurfaceError::format(format!(
            "{kind} field '{name}' has {tuples} tuples, expected {expected}"
        )));
    }
    match components {
        1 => {
            let values = read_scalars(tokens, tuples)?;
            mesh.table_mut(kind).insert_scalar(name, values);
        }
        3 => {
            let values = read_vectors(tokens, tuples)?;
            mesh.table_mut(kind).insert_vector(name, values);
        }
        _ => {
            log::debug!("skipping {kind} field '{name}' with {components} components");
            tokens.skip(scaled_count(tuples, components, "field array")?, "field value")?;
        }
    }
    Ok(())
}

/// Whitespace token stream with typed reads.
struct Tokens<'a> {
    inner: Peekable<SplitWhitespace<'a>>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_whitespace().peekable(),
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.inner.peek().copied()
    }

    fn expect_any(&mut self, what: &str) -> SurfaceResult<&'a str> {
        self.next_token()
            .ok_or_else(|| SurfaceError::format(format!("unexpected end of input, expected {what}")))
    }

    fn expect(&mut self, keyword: &str) -> SurfaceResult<()> {
        match self.next_token() {
            Some(token) if token == keyword => Ok(()),
            Some(token) => Err(SurfaceError::format(format!("expected {keyword}, found '{token}'"))),
            None => Err(SurfaceError::format(format!(
                "unexpected end of input, expected {keyword}"
            ))),
        }
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> SurfaceResult<T> {
        let token = self.expect_any(what)?;
        token
            .parse()
            .map_err(|_| SurfaceError::format(format!("invalid {what} '{token}'")))
    }

    fn parse_array<T, const N: usize>(&mut self, what: &str) -> SurfaceResult<[T; N]>
    where
        T: FromStr + Default + Copy,
    {
        let mut values = [T::default(); N];
        for value in &mut values {
            *value = self.parse(what)?;
        }
        Ok(values)
    }

    fn skip(&mut self, n: usize, what: &str) -> SurfaceResult<()> {
        for _ in 0..n {
            self.expect_any(what)?;
        }
        Ok(())
    }
}
