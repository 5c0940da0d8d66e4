use std::fs;
use std::path::PathBuf;

use surface_transfer::{FieldKind, Surface2d, Surface3d, SurfaceError};

const GRID_VTK: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtk"));
const GRID_VTU: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtu"));
const POLYLINE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q-2d.txt"));

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("surface-transfer-{}-{name}", std::process::id()))
}

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() <= 1e-13 * x.abs().max(1.0), "{x} != {y}");
    }
}

#[test]
fn vtu_round_trip_preserves_surface() {
    let mut surface = Surface3d::new();
    surface.load_vtk_str(GRID_VTK).expect("load q.vtk");
    surface
        .convert(FieldKind::Point, "T", FieldKind::Cell, Some("T_mean"))
        .expect("convert");

    let mut buffer = Vec::new();
    surface.write_vtu_to(&mut buffer).expect("write");
    let text = String::from_utf8(buffer).expect("utf-8");

    let mut reread = Surface3d::new();
    reread.load_vtu_str(&text).expect("reload");

    assert_eq!(reread.point_count(), surface.point_count());
    assert_eq!(reread.triangles(), surface.triangles());
    for (kind, table) in [(FieldKind::Cell, surface.cell_data()), (FieldKind::Point, surface.point_data())] {
        for (name, values) in table.scalars() {
            assert_close(reread.field(kind, name).expect(name), values);
        }
        for (name, values) in table.vectors() {
            let original: Vec<f64> = values.iter().flat_map(|v| v.to_array()).collect();
            let written: Vec<f64> = reread
                .vector_field(kind, name)
                .expect(name)
                .iter()
                .flat_map(|v| v.to_array())
                .collect();
            assert_close(&written, &original);
        }
    }
}

#[test]
fn vtu_output_layout() {
    let mut surface = Surface3d::new();
    surface.load_vtu_str(GRID_VTU).expect("load q.vtu");

    let mut buffer = Vec::new();
    surface.write_vtu_to(&mut buffer).expect("write");
    let text = String::from_utf8(buffer).expect("utf-8");

    assert!(text.contains("<Piece NumberOfPoints=\"9\" NumberOfCells=\"8\">"));
    assert!(text.contains("Name=\"normal\" NumberOfComponents=\"3\""));
    assert!(text.contains("<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">"));
    assert!(text.contains("3 6 9 12 15 18 21 24 \n"));
    assert!(text.contains("5 5 5 5 5 5 5 5 \n"));
    assert!(text.contains("5.0000000000000e-1"));
}

#[test]
fn vtu_file_round_trip() {
    let path = scratch_path("grid.vtu");
    let mut surface = Surface3d::new();
    surface.load_vtk_str(GRID_VTK).expect("load q.vtk");
    surface.write_vtu(&path).expect("write file");

    let mut reread = Surface3d::new();
    let result = reread.read_vtu(&path);
    let _ = fs::remove_file(&path);
    result.expect("read file");

    assert_eq!(reread.mesh(), surface.mesh());
}

#[test]
fn non_triangle_cell_leaves_surface_empty() {
    let mut surface = Surface3d::new();
    surface.load_vtu_str(GRID_VTU).expect("load q.vtu");

    let quad = GRID_VTK.replacen("3 0 1 4", "4 0 1 4 3", 1);
    let err = surface.load_vtk_str(&quad).unwrap_err();
    assert!(matches!(err, SurfaceError::Format(_)), "{err}");
    assert!(surface.is_empty());
    assert!(surface.triangle_cache().is_empty());
}

#[test]
fn vtu_field_length_mismatch_is_rejected() {
    let broken = GRID_VTU.replacen("1 2 3 4 5 6 7 8", "1 2 3 4 5 6 7", 1);
    let mut surface = Surface3d::new();
    let err = surface.load_vtu_str(&broken).unwrap_err();
    assert!(err.is_load_error());
    assert!(surface.is_empty());
}

#[test]
fn polyline_text_file_round_trip() {
    let path = scratch_path("line.txt");
    let mut line = Surface2d::new();
    line.load_txt_str(POLYLINE).expect("load q-2d.txt");
    line.write_txt(&path).expect("write file");

    let mut reread = Surface2d::new();
    let result = reread.read_txt(&path);
    let _ = fs::remove_file(&path);
    result.expect("read file");

    assert_eq!(reread, line);
}

#[test]
fn ragged_polyline_text_is_rejected() {
    let mut line = Surface2d::new();
    line.load_txt_str(POLYLINE).expect("load q-2d.txt");

    let err = line.load_txt_str("r z T\n0 0 1\n1 0\n").unwrap_err();
    assert!(matches!(err, SurfaceError::Format(_)));
    assert!(line.is_empty());
}

#[test]
fn vtu_round_trip_keeps_markup_in_field_names() {
    let input = "POINTS 3 double\n0 0 0 1 0 0 0 1 0\nCELLS 1 4\n3 0 1 2\n\
                 POINT_DATA 3\nSCALARS a\"&<b double\nLOOKUP_TABLE default\n1 2 3\n";
    let mut surface = Surface3d::new();
    surface.load_vtk_str(input).expect("load");

    let mut buffer = Vec::new();
    surface.write_vtu_to(&mut buffer).expect("write");
    let text = String::from_utf8(buffer).expect("utf-8");

    let mut reread = Surface3d::new();
    reread.load_vtu_str(&text).expect("reload");
    assert_eq!(reread.field(FieldKind::Point, "a\"&<b").expect("field"), &[1.0, 2.0, 3.0]);
}

#[test]
fn oversized_cell_count_leaves_surface_empty() {
    let mut surface = Surface3d::new();
    surface.load_vtk_str(GRID_VTK).expect("load q.vtk");

    let err = surface.load_vtk_str("CELLS 4611686018427387904 0\n").unwrap_err();
    assert!(matches!(err, SurfaceError::Format(_)), "{err}");
    assert!(surface.is_empty());
}
