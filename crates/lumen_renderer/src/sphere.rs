//! Sphere primitive for ray tracing.

use std::f64::consts::PI;

use lumen_math::{Coord, DMat4, Mat4Ext, MathResult, Normal, Point2, Point3, Ray, Vector3};

use crate::surface::{Surface, HIT_EPSILON};

/// A sphere.
///
/// A negative radius turns the sphere inside out: its normals point
/// towards the center.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: Coord,
    /// Rotates world offsets into the frame used for UV lookup
    inverse_orientation: DMat4,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Point3, radius: Coord) -> Self {
        Self {
            center,
            radius,
            inverse_orientation: DMat4::IDENTITY,
        }
    }

    /// Orient the UV parameterization with `orientation`.
    pub fn with_orientation(mut self, orientation: DMat4) -> MathResult<Self> {
        self.inverse_orientation = orientation.try_inverse()?;
        Ok(self)
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> Coord {
        self.radius
    }
}

impl Surface for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<Coord> {
        let oc = ray.origin() - self.center;
        let b = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearest root first, then the far one when starting inside
        let near = -b - sqrtd;
        if near > HIT_EPSILON {
            return Some(near);
        }
        let far = -b + sqrtd;
        (far > HIT_EPSILON).then_some(far)
    }

    fn normal(&self, x: Point3) -> Normal {
        let outward = Normal::new(x - self.center);
        if self.radius < 0.0 {
            -outward
        } else {
            outward
        }
    }

    fn uv(&self, x: Point3) -> Point2 {
        let p = self
            .inverse_orientation
            .transform_vector3((x - self.center) / self.radius.abs());

        let u = p.x.atan2(p.z) / (2.0 * PI) + 0.5;
        let v = p.y.atan2((p.x * p.x + p.z * p.z).sqrt()) / PI + 0.5;
        Point2::new(u, 1.0 - v)
    }

    fn shading_normal(&self, x: Point3, d: Vector3) -> Normal {
        let n = self.normal(x);
        let tu = n.cross(Vector3::NEG_Y);
        let tv = n.cross(tu);
        Normal::new(tu * d.x + tv * d.y + n.as_vec() * d.z)
    }
}
