//! Closest-point and barycentric queries on a single line segment.
//!
//! Both functions work in 2D and 3D through [`EuclideanPoint`]. Triangle edge
//! searches use them in 3D, polyline surfaces in 2D.

use super::core::EuclideanPoint;

/// Returns the point of segment `a`–`b` closest to `p`.
///
/// The parametric projection is clamped to `[0, 1]`; clamped results are the
/// endpoints themselves, never a point rebuilt from the parameter. A
/// zero-length segment yields `a`.
#[must_use]
pub fn closest_segment_point<P: EuclideanPoint>(p: P, a: P, b: P) -> P {
    let t = segment_parameter(p, a, b);
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a.offset(b.delta(a), t)
    }
}

/// Returns the weights `(1 - t, t)` of `p` with respect to `a` and `b`.
///
/// `t` is not clamped; call this with a point already on the segment (for
/// example the result of [`closest_segment_point`]) to get convex weights.
/// A zero-length segment yields `[1, 0]`.
#[must_use]
pub fn segment_barycentric<P: EuclideanPoint>(p: P, a: P, b: P) -> [f64; 2] {
    let t = segment_parameter(p, a, b);
    // t = 0 corresponds to `a`
    [1.0 - t, t]
}

fn segment_parameter<P: EuclideanPoint>(p: P, a: P, b: P) -> f64 {
    let d = b.delta(a);
    let len2 = P::dot(d, d);
    if len2 > 0.0 {
        P::dot(d, p.delta(a)) / len2
    } else {
        0.0
    }
}
