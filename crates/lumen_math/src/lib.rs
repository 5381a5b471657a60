//! Lumen math - vector algebra for the path tracer.
//!
//! Thin layer over `glam`'s double precision types plus the few types the
//! renderer needs on top: unit [`Normal`]s, [`Ray`]s, [`Interval`]s,
//! homogeneous transform helpers and small linear solves.

// Re-export glam for convenience
pub use glam::*;

mod error;
mod interval;
mod linear;
mod normal;
mod ray;
mod transform;

pub use error::{MathError, MathResult};
pub use interval::Interval;
pub use linear::UvMap;
pub use normal::Normal;
pub use ray::Ray;
pub use transform::{transform_normal, Mat4Ext};

/// Scalar type used for all geometry.
pub type Coord = f64;

/// A position in 3D space.
pub type Point3 = DVec3;

/// A displacement in 3D space.
pub type Vector3 = DVec3;

/// A 2D surface parameterization coordinate.
pub type Point2 = DVec2;
