//! Surface trait for ray-geometry queries.

use lumen_math::{Coord, Normal, Point2, Point3, Ray, Vector3};

/// Hits closer than this to the ray origin are ignored.
///
/// Keeps secondary rays from re-hitting the surface they start on.
pub const HIT_EPSILON: Coord = 1e-6;

/// Geometry that can be intersected by rays.
///
/// Surfaces own any transforms they need; every query is in world space.
pub trait Surface: Send + Sync {
    /// Distance along `ray` to the nearest hit beyond [`HIT_EPSILON`].
    fn intersect(&self, ray: &Ray) -> Option<Coord>;

    /// Geometric normal at a point on the surface.
    fn normal(&self, x: Point3) -> Normal;

    /// Surface parameterization at a point on the surface.
    fn uv(&self, x: Point3) -> Point2;

    /// Normal at `x` perturbed by a tangent-space vector `d`.
    ///
    /// `d.x` and `d.y` move along the surface tangents, `d.z` along the
    /// geometric normal.
    fn shading_normal(&self, x: Point3, d: Vector3) -> Normal;
}
