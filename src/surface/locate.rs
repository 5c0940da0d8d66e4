//! Nearest-feature search over triangle caches and polylines.

use crate::error::SurfaceResult;
use crate::geom::{Point2, Point3, Triangle, closest_segment_point};

use super::InterpolationOptions;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Closest triangle found for a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub index: usize,
    /// Closest point on the triangle.
    pub point: Point3,
    pub distance_squared: f64,
}

/// Closest polyline segment found for a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Index of the segment's first point.
    pub index: usize,
    pub point: Point2,
    pub distance_squared: f64,
}

/// Finds the triangle closest to `target`.
///
/// The first pass skips triangles whose center lies farther than
/// `options.prune_factor * longest_side` from the target. If that leaves
/// nothing and `options.exhaustive_fallback` is set, every triangle is
/// scanned. Degenerate triangles never match. Ties keep the lowest index.
#[must_use]
pub fn nearest_triangle(
    triangles: &[Triangle],
    target: Point3,
    options: &InterpolationOptions,
) -> Option<TriangleHit> {
    let pruned = scan_triangles(triangles, target, |triangle| {
        target.distance_to(triangle.center()) <= options.prune_factor * triangle.longest_side()
    });
    if pruned.is_some() || !options.exhaustive_fallback {
        return pruned;
    }

    log::debug!(
        "no triangle near ({}, {}, {}) after pruning, scanning all {}",
        target.x,
        target.y,
        target.z,
        triangles.len()
    );
    scan_triangles(triangles, target, |_| true)
}

fn scan_triangles(
    triangles: &[Triangle],
    target: Point3,
    accept: impl Fn(&Triangle) -> bool,
) -> Option<TriangleHit> {
    let mut best: Option<TriangleHit> = None;

    for (index, triangle) in triangles.iter().enumerate() {
        if triangle.is_degenerate() || !accept(triangle) {
            continue;
        }
        let point = triangle.closest_point(target);
        let distance_squared = target.distance_squared_to(point);
        if !distance_squared.is_finite() {
            continue;
        }
        if best.is_none_or(|hit| distance_squared < hit.distance_squared) {
            best = Some(TriangleHit {
                index,
                point,
                distance_squared,
            });
        }
    }
    best
}

/// Finds the polyline segment closest to `target`.
///
/// Returns `None` for fewer than two points. Ties keep the lowest index.
#[must_use]
pub fn nearest_segment(points: &[Point2], target: Point2) -> Option<SegmentHit> {
    let mut best: Option<SegmentHit> = None;

    for (index, pair) in points.windows(2).enumerate() {
        let point = closest_segment_point(target, pair[0], pair[1]);
        let distance_squared = target.distance_squared_to(point);
        if best.is_none_or(|hit| distance_squared < hit.distance_squared) {
            best = Some(SegmentHit {
                index,
                point,
                distance_squared,
            });
        }
    }
    best
}

/// Evaluates every marked target, writing `0.0` for unmarked ones.
///
/// When several targets fail, the error of the lowest-index one is returned.
#[cfg(feature = "parallel")]
pub(crate) fn evaluate_marked<T, F>(targets: &[T], markers: &[bool], eval: F) -> SurfaceResult<Vec<f64>>
where
    T: Copy + Sync,
    F: Fn(T) -> SurfaceResult<f64> + Sync,
{
    let results: Vec<SurfaceResult<f64>> = targets
        .par_iter()
        .zip(markers.par_iter())
        .map(|(&target, &marked)| if marked { eval(target) } else { Ok(0.0) })
        .collect();
    results.into_iter().collect()
}

/// Evaluates every marked target, writing `0.0` for unmarked ones.
///
/// Stops at the first failing evaluation.
#[cfg(not(feature = "parallel"))]
pub(crate) fn evaluate_marked<T, F>(targets: &[T], markers: &[bool], eval: F) -> SurfaceResult<Vec<f64>>
where
    T: Copy + Sync,
    F: Fn(T) -> SurfaceResult<f64> + Sync,
{
    targets
        .iter()
        .zip(markers)
        .map(|(&target, &marked)| if marked { eval(target) } else { Ok(0.0) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Triangle> {
        let p = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        vec![Triangle::new(p[0], p[1], p[2]), Triangle::new(p[0], p[2], p[3])]
    }

    #[test]
    fn picks_containing_triangle() {
        let triangles = unit_square();
        let options = InterpolationOptions::default();

        let hit = nearest_triangle(&triangles, Point3::new(0.75, 0.25, 0.5), &options).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance_squared - 0.25).abs() < 1e-12);

        let hit = nearest_triangle(&triangles, Point3::new(0.25, 0.75, 0.0), &options).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn shared_edge_tie_keeps_lowest_index() {
        let triangles = unit_square();
        let hit = nearest_triangle(
            &triangles,
            Point3::new(0.5, 0.5, 0.0),
            &InterpolationOptions::default(),
        )
        .unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn far_target_falls_back_to_full_scan() {
        let triangles = unit_square();
        let far = Point3::new(100.0, 0.5, 0.0);

        let hit = nearest_triangle(&triangles, far, &InterpolationOptions::default()).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.point.x - 1.0).abs() < 1e-12);

        let strict = InterpolationOptions {
            exhaustive_fallback: false,
            ..InterpolationOptions::default()
        };
        assert!(nearest_triangle(&triangles, far, &strict).is_none());
    }

    #[test]
    fn degenerate_triangles_never_match() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let collapsed = Triangle::new(a, b, Point3::new(2.0, 0.0, 0.0));
        let real = Triangle::new(
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(1.0, 0.0, 5.0),
            Point3::new(0.0, 1.0, 5.0),
        );

        let hit = nearest_triangle(&[collapsed, real], a, &InterpolationOptions::default()).unwrap();
        assert_eq!(hit.index, 1);
        assert!(nearest_triangle(&[collapsed], a, &InterpolationOptions::default()).is_none());
    }

    #[test]
    fn nearest_segment_on_polyline() {
        let points = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)];

        let hit = nearest_segment(&points, Point2::new(0.5, -0.2)).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.point.x - 0.5).abs() < 1e-12);

        let hit = nearest_segment(&points, Point2::new(1.3, 0.6)).unwrap();
        assert_eq!(hit.index, 1);

        // the shared vertex is equally close to both segments
        let hit = nearest_segment(&points, Point2::new(1.5, -0.5)).unwrap();
        assert_eq!(hit.index, 0);

        assert!(nearest_segment(&points[..1], Point2::ORIGIN).is_none());
    }

    #[test]
    fn evaluate_marked_zeroes_unmarked_and_propagates_errors() {
        let values = evaluate_marked(&[1.0, 2.0, 3.0], &[true, false, true], |x: f64| Ok(x * 10.0)).unwrap();
        assert_eq!(values, vec![10.0, 0.0, 30.0]);

        let result = evaluate_marked(&[1.0, 2.0], &[true, true], |x: f64| {
            if x > 1.5 {
                Err(crate::error::SurfaceError::InterpolationFailed { coordinates: vec![x] })
            } else {
                Ok(x)
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn evaluate_marked_reports_lowest_failing_target() {
        let targets: Vec<f64> = (0..4096).map(f64::from).collect();
        let markers = vec![true; targets.len()];
        let result = evaluate_marked(&targets, &markers, |x: f64| {
            if x >= 100.0 && (x as usize) % 7 == 2 {
                Err(crate::error::SurfaceError::InterpolationFailed { coordinates: vec![x] })
            } else {
                Ok(x)
            }
        });
        match result {
            Err(crate::error::SurfaceError::InterpolationFailed { coordinates }) => {
                assert_eq!(coordinates, vec![100.0]);
            }
            other => panic!("expected InterpolationFailed, got {other:?}"),
        }
    }
}
