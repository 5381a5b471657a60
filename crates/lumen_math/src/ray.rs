use crate::{Normal, Point3, Vector3};

/// A ray in 3D space with an origin and a unit direction.
///
/// Rays are never mutated: every bounce builds a new one.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Normal,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: Normal::new(direction),
        }
    }

    /// Create a ray from an already normalized direction.
    pub fn from_normal(origin: Point3, direction: Normal) -> Self {
        Self { origin, direction }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Get the direction of the ray.
    #[inline]
    pub fn direction(&self) -> Normal {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction.as_vec() * t
    }
}
