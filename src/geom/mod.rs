//! Geometric primitives for the surface search: points and vectors in two
//! and three dimensions, cached triangle geometry, and segment queries.

mod core;
mod segment;
mod triangle;

pub use self::core::{EuclideanPoint, Point2, Point3, Vec2, Vec3};
pub use segment::{closest_segment_point, segment_barycentric};
pub use triangle::Triangle;
