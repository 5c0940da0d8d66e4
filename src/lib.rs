#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Mesh-free transfer of scalar fields between unrelated surface
//! discretizations.
//!
//! A [`Surface3d`] holds a triangulated surface read from legacy VTK or VTU
//! files (or built in memory), a [`Surface2d`] an axisymmetric polyline
//! read from columnar text. Either one evaluates its fields at arbitrary
//! target points, typically the boundary nodes of a finite-element mesh
//! that shares neither numbering nor topology with the source surface.
//!
//! ```no_run
//! use surface_transfer::{FieldKind, Point3, Surface3d};
//!
//! let mut surface = Surface3d::new();
//! surface.read_vtu("heat-flux.vtu")?;
//! surface.convert(FieldKind::Cell, "q", FieldKind::Point, None)?;
//!
//! let targets = [Point3::new(0.1, 0.0, 0.3)];
//! let q = surface.interpolate(FieldKind::Point, "q", &targets, &[true])?;
//! # Ok::<(), surface_transfer::SurfaceError>(())
//! ```
//!
//! The library logs through the [`log`] facade and never installs a logger.

pub mod error;
pub mod geom;
pub mod io;
pub mod metrics;
pub mod surface;

pub use error::{SurfaceError, SurfaceResult};
pub use geom::{EuclideanPoint, Point2, Point3, Triangle, Vec2, Vec3, closest_segment_point, segment_barycentric};
pub use io::SurfaceMesh;
pub use metrics::{SurfaceMetrics, TimingBucket, TimingReport};
pub use surface::{FieldKind, FieldTable, InterpolationOptions, Surface2d, Surface3d, TransferContext};
