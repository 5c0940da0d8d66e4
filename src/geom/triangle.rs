use super::core::{Point3, Vec3};
use super::segment::closest_segment_point;

/// Cached geometry of a single surface triangle.
///
/// Everything derived from the vertices (normal, area, center, longest side)
/// is computed once in [`reinit`](Self::reinit) and read many times by the
/// nearest-triangle search.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Triangle {
    points: [Point3; 3],
    normal: Vec3,
    center: Point3,
    area: f64,
    longest_side: f64,
}

impl Triangle {
    #[must_use]
    pub fn new(p0: Point3, p1: Point3, p2: Point3) -> Self {
        let mut triangle = Self::default();
        triangle.reinit(p0, p1, p2);
        triangle
    }

    /// Sets the vertices and recomputes all derived quantities.
    pub fn reinit(&mut self, p0: Point3, p1: Point3, p2: Point3) {
        self.points = [p0, p1, p2];

        self.calculate_normal_and_area();

        self.center = Point3::from((p0.to_vec3() + p1.to_vec3() + p2.to_vec3()) / 3.0);

        self.longest_side = p0
            .distance_to(p1)
            .max(p0.distance_to(p2))
            .max(p1.distance_to(p2));
    }

    #[must_use]
    pub const fn points(&self) -> [Point3; 3] {
        self.points
    }

    #[must_use]
    pub const fn center(&self) -> Point3 {
        self.center
    }

    /// Unit normal, oriented by the vertex winding. Zero for degenerate
    /// triangles.
    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        self.normal
    }

    #[must_use]
    pub const fn area(&self) -> f64 {
        self.area
    }

    #[must_use]
    pub const fn longest_side(&self) -> f64 {
        self.longest_side
    }

    /// A triangle without positive area has no plane and no barycentric
    /// coordinates.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.area > 0.0)
    }

    /// Returns the point of the triangle closest to `p`.
    ///
    /// If the orthogonal projection onto the triangle plane lies inside the
    /// triangle it is returned directly; otherwise the nearest of the three
    /// edge points wins (first strict minimum in edge order).
    #[must_use]
    pub fn closest_point(&self, p: Point3) -> Point3 {
        let projected = self.project_to_plane(p);
        let coords = self.barycentric_coordinates(projected);

        if coords.iter().all(|t| (0.0..=1.0).contains(t)) {
            return projected;
        }

        let mut closest = self.points[0];
        let mut d2_min = f64::INFINITY;
        for i in 0..3 {
            let on_edge = closest_segment_point(p, self.points[i], self.points[(i + 1) % 3]);
            let d2 = p.distance_squared_to(on_edge);
            if d2 < d2_min {
                d2_min = d2;
                closest = on_edge;
            }
        }
        closest
    }

    /// Signed-area barycentric coordinates of `p` with respect to the three
    /// vertices.
    ///
    /// Points off the plane are measured along the triangle's own normal.
    /// The result is not finite for degenerate triangles; check
    /// [`is_degenerate`](Self::is_degenerate) first.
    #[must_use]
    pub fn barycentric_coordinates(&self, p: Point3) -> [f64; 3] {
        let [p0, p1, p2] = self.points;
        [
            self.signed_area(p, p1, p2) / self.area,
            self.signed_area(p0, p, p2) / self.area,
            self.signed_area(p0, p1, p) / self.area,
        ]
    }

    fn calculate_normal_and_area(&mut self) {
        let [p0, p1, p2] = self.points;
        let n = (p1 - p0).cross(p2 - p0);
        self.area = 0.5 * n.length();
        self.normal = if self.area > 0.0 { n / (2.0 * self.area) } else { n };
    }

    fn signed_area(&self, p0: Point3, p1: Point3, p2: Point3) -> f64 {
        0.5 * self.normal.dot((p1 - p0).cross(p2 - p0))
    }

    fn project_to_plane(&self, p: Point3) -> Point3 {
        p - self.normal * self.normal.dot(p - self.points[0])
    }
}
