use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use surface_transfer::{
    FieldKind, InterpolationOptions, Point2, Point3, Surface2d, Surface3d, SurfaceError, TransferContext,
};

const GRID_VTK: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtk"));
const GRID_VTU: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtu"));
const POLYLINE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q-2d.txt"));

/// 3x3 points in the z = 0 plane, 8 triangles, `T = x + 2y` on the points
/// and `q = 1..=8` on the cells.
fn grid() -> Surface3d {
    let mut surface = Surface3d::new();
    surface.load_vtk_str(GRID_VTK).expect("load q.vtk");
    surface
}

#[test]
fn legacy_and_xml_readers_agree() {
    let vtk = grid();
    let mut vtu = Surface3d::new();
    vtu.load_vtu_str(GRID_VTU).expect("load q.vtu");

    assert_eq!(vtk.point_count(), 9);
    assert_eq!(vtk.triangle_count(), 8);
    assert_eq!(vtk.mesh(), vtu.mesh());
}

#[test]
fn linear_point_field_is_reproduced_on_and_above_the_grid() {
    let surface = grid();
    let mut rng = StdRng::seed_from_u64(42);
    let targets: Vec<Point3> = (0..200)
        .map(|_| {
            Point3::new(
                rng.random_range(0.0..2.0),
                rng.random_range(0.0..2.0),
                rng.random_range(-0.5..0.5),
            )
        })
        .collect();
    let markers = vec![true; targets.len()];

    let values = surface
        .interpolate(FieldKind::Point, "T", &targets, &markers)
        .expect("interpolate T");
    for (p, value) in targets.iter().zip(&values) {
        let expected = p.x + 2.0 * p.y;
        assert!((value - expected).abs() < 1e-9, "T at {p:?}: {value} != {expected}");
    }
}

#[test]
fn targets_outside_snap_to_the_boundary() {
    let surface = grid();
    let targets = [Point3::new(3.0, 1.0, 0.0), Point3::new(-1.0, -1.0, 2.0)];
    let values = surface
        .interpolate(FieldKind::Point, "T", &targets, &[true, true])
        .expect("interpolate T");
    assert!((values[0] - 4.0).abs() < 1e-12);
    assert!(values[1].abs() < 1e-12);
}

#[test]
fn cell_field_at_centroids_returns_cell_values() {
    let surface = grid();
    let centers: Vec<Point3> = surface.triangle_cache().iter().map(|t| t.center()).collect();
    let markers = vec![true; centers.len()];

    let values = surface
        .interpolate(FieldKind::Cell, "q", &centers, &markers)
        .expect("interpolate q");
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn surface_vertices_return_vertex_values() {
    let surface = grid();
    let markers = vec![true; surface.point_count()];
    let values = surface
        .interpolate(FieldKind::Point, "h", surface.points(), &markers)
        .expect("interpolate h");
    for (i, value) in values.iter().enumerate() {
        assert!((value - i as f64).abs() < 1e-12);
    }
}

#[test]
fn conversions_average_by_incidence() {
    let mut surface = grid();

    surface
        .convert(FieldKind::Cell, "q", FieldKind::Point, Some("q_point"))
        .expect("cell to point");
    let q_point = surface.field(FieldKind::Point, "q_point").expect("q_point");
    assert!((q_point[0] - 1.5).abs() < 1e-12);
    assert!((q_point[4] - 4.5).abs() < 1e-12);
    assert!((q_point[8] - 7.5).abs() < 1e-12);

    surface
        .convert(FieldKind::Point, "T", FieldKind::Cell, None)
        .expect("point to cell");
    let t_cell = surface.field(FieldKind::Cell, "T").expect("T cell");
    assert!((t_cell[0] - 4.0 / 3.0).abs() < 1e-12);

    surface.insert_field(FieldKind::Cell, "c", vec![2.5; 8]).expect("insert");
    surface.convert(FieldKind::Cell, "c", FieldKind::Point, None).expect("c to point");
    surface.convert(FieldKind::Point, "c", FieldKind::Cell, None).expect("c back to cell");
    let c = surface.field(FieldKind::Cell, "c").expect("c");
    assert!(c.iter().all(|v| (v - 2.5).abs() < 1e-12));
}

#[test]
fn context_collects_interpolation_time_only() {
    let surface = grid();
    let mut ctx = TransferContext::with_options(InterpolationOptions::default());
    ctx.metrics.begin();

    let targets = [Point3::new(0.5, 0.5, 0.0); 16];
    surface
        .interpolate_with_context(FieldKind::Point, "T", &targets, &[true; 16], &mut ctx)
        .expect("interpolate");

    if let Some(report) = ctx.metrics.end() {
        assert_eq!(report.conversion_ns, 0);
        assert_eq!(report.preprocess_ns, 0);
    }
}

#[test]
fn reads_fixture_files_from_disk() {
    let mut surface = Surface3d::new();
    surface
        .read_vtk(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtk"))
        .expect("read q.vtk");
    assert_eq!(surface.triangle_count(), 8);

    surface
        .read_vtu(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q.vtu"))
        .expect("read q.vtu");
    assert_eq!(surface.point_count(), 9);
}

#[test]
fn missing_file_leaves_surface_empty() {
    let mut surface = grid();
    let err = surface
        .read_vtu(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/missing.vtu"))
        .unwrap_err();
    assert!(matches!(err, SurfaceError::FileNotFound { .. }));
    assert!(surface.is_empty());
    assert!(surface.cell_data().is_empty());
}

#[test]
fn polyline_interpolation_from_columnar_text() {
    let mut line = Surface2d::new();
    line.load_txt_str(POLYLINE).expect("load q-2d.txt");
    assert_eq!(line.segment_count(), 3);

    let targets = [Point2::new(0.25, 0.1), Point2::new(1.2, 0.25)];
    let values = line.interpolate("T", &targets, &[true, true]).expect("interpolate T");
    assert!((values[0] - 150.0).abs() < 1e-9);
    assert!((values[1] - 350.0).abs() < 1e-9);

    let values = line
        .interpolate_cylindrical("q", &[Point3::new(0.6, 0.8, 0.0)], &[true])
        .expect("interpolate q");
    assert!((values[0] + 3.0).abs() < 1e-9);
}

#[test]
fn polyline_reads_from_disk() {
    let mut line = Surface2d::new();
    line.read_txt(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/q-2d.txt"))
        .expect("read q-2d.txt");
    assert_eq!(line.point_count(), 4);
    assert_eq!(line.field("q").expect("q"), &[-1.0, -2.0, -3.0, -4.0]);
}
