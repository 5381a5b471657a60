//! Triangle primitive for ray tracing.
//!
//! Plane intersection followed by three edge-side tests against the face
//! normal.

use lumen_math::{Coord, MathResult, Normal, Point2, Point3, Ray, UvMap, Vector3};

use crate::surface::{Surface, HIT_EPSILON};

/// Rays this close to parallel with the plane never hit.
const PARALLEL_EPSILON: Coord = 1e-8;

/// A triangle.
///
/// The face normal is `(p3 - p1) × (p2 - p1)`, so the winding decides
/// which side is the front.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertices
    p: [Point3; 3],
    /// Pre-computed face normal (unit length)
    normal: Normal,
    /// Edge vectors p2 - p1, p3 - p2, p1 - p3
    edges: [Vector3; 3],
    uv_map: UvMap,
    /// Tangents used for normal mapping
    su: Vector3,
    sv: Vector3,
}

impl Triangle {
    /// Create a triangle with the default UVs (0,0), (1,0), (0,1).
    ///
    /// Fails for degenerate triangles.
    pub fn new(p1: Point3, p2: Point3, p3: Point3) -> MathResult<Self> {
        Self::with_uvs(
            [p1, p2, p3],
            [Point2::ZERO, Point2::X, Point2::Y],
        )
    }

    /// Create a triangle with per-vertex UVs.
    pub fn with_uvs(p: [Point3; 3], uv: [Point2; 3]) -> MathResult<Self> {
        let uv_map = UvMap::new(p, uv)?;
        let normal = Normal::new((p[2] - p[0]).cross(p[1] - p[0]));
        let edges = [p[1] - p[0], p[2] - p[1], p[0] - p[2]];

        Ok(Self {
            p,
            normal,
            edges,
            uv_map,
            su: Vector3::X,
            sv: Vector3::Y,
        })
    }

    /// Set the tangents used to orient normal-map perturbations.
    pub fn with_tangents(mut self, su: Vector3, sv: Vector3) -> Self {
        self.su = su;
        self.sv = sv;
        self
    }

    pub fn vertices(&self) -> [Point3; 3] {
        self.p
    }
}

impl Surface for Triangle {
    fn intersect(&self, ray: &Ray) -> Option<Coord> {
        let n = self.normal;
        let denom = n.dot(ray.direction().as_vec());

        // Ray is parallel to the plane
        if denom.abs() <= PARALLEL_EPSILON {
            return None;
        }

        let t = (n.dot(self.p[0]) - n.dot(ray.origin())) / denom;
        if t < HIT_EPSILON {
            return None;
        }

        let x = ray.at(t);

        // Inside points lie on the negative side of every edge, by at least
        // HIT_EPSILON in distance
        let outside = self.edges.iter().zip(self.p.iter()).any(|(edge, vertex)| {
            edge.cross(x - *vertex).dot(n.as_vec()) > -HIT_EPSILON * edge.length()
        });

        if outside {
            None
        } else {
            Some(t)
        }
    }

    fn normal(&self, _x: Point3) -> Normal {
        self.normal
    }

    fn uv(&self, x: Point3) -> Point2 {
        self.uv_map.apply(x)
    }

    fn shading_normal(&self, _x: Point3, d: Vector3) -> Normal {
        Normal::new(self.su * d.x + self.sv * d.y + self.normal.as_vec() * d.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Triangle {
        Triangle::new(Point3::ZERO, Point3::X, Point3::Y).unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let tri = unit_triangle();
        let ray = Ray::new(Point3::new(0.2, 0.2, 3.0), Vector3::NEG_Z);
        let t = tri.intersect(&ray).unwrap();
        assert!((t - 3.0).abs() < 1e-9);

        // Hits from behind count too
        let ray = Ray::new(Point3::new(0.2, 0.2, -2.0), Vector3::Z);
        let t = tri.intersect(&ray).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = unit_triangle();

        // Outside the hypotenuse
        let ray = Ray::new(Point3::new(0.8, 0.8, 1.0), Vector3::NEG_Z);
        assert!(tri.intersect(&ray).is_none());

        // Parallel to the plane
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::X);
        assert!(tri.intersect(&ray).is_none());

        // Plane is behind the origin
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_translation_invariance() {
        let p = [
            Point3::new(-1.0, -0.5, 2.0),
            Point3::new(2.0, 0.0, 1.5),
            Point3::new(0.0, 3.0, 2.5),
        ];
        let origin = Point3::new(0.1, 0.4, -6.0);
        let dir = Vector3::new(0.05, 0.1, 1.0);

        let tri = Triangle::new(p[0], p[1], p[2]).unwrap();
        let t = tri.intersect(&Ray::new(origin, dir)).unwrap();

        for offset in [
            Vector3::new(10.0, -3.0, 7.0),
            Vector3::new(-250.0, 40.0, 0.5),
            Vector3::new(0.0, 0.0, -1000.0),
        ] {
            let moved = Triangle::new(p[0] + offset, p[1] + offset, p[2] + offset).unwrap();
            let t_moved = moved.intersect(&Ray::new(origin + offset, dir)).unwrap();
            assert!((t - t_moved).abs() < 1e-6, "t={} moved={}", t, t_moved);
        }
    }

    #[test]
    fn test_triangle_normal_winding() {
        let tri = unit_triangle();
        let n = tri.normal(Point3::ZERO);
        assert!((n.as_vec() - Vector3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn test_triangle_uv() {
        let tri = Triangle::with_uvs(
            [Point3::ZERO, Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)],
            [Point2::ZERO, Point2::new(4.0, 0.0), Point2::new(0.0, 4.0)],
        )
        .unwrap();

        let uv = tri.uv(Point3::new(0.5, 1.0, 0.0));
        assert!((uv - Point2::new(1.0, 2.0)).length() < 1e-9);
    }

    #[test]
    fn test_degenerate_triangle_is_error() {
        let result = Triangle::new(Point3::ZERO, Point3::X, Point3::new(2.0, 0.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_small_triangle() {
        let tri = Triangle::new(
            Point3::ZERO,
            Point3::new(5e-4, 0.0, 0.0),
            Point3::new(0.0, 5e-4, 0.0),
        )
        .unwrap();

        let ray = Ray::new(Point3::new(1e-4, 1e-4, 1.0), Vector3::NEG_Z);
        let t = tri.intersect(&ray).unwrap();
        assert!((t - 1.0).abs() < 1e-9);

        let ray = Ray::new(Point3::new(4e-4, 4e-4, 1.0), Vector3::NEG_Z);
        assert!(tri.intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_shading_normal_uses_tangents() {
        let tri = unit_triangle().with_tangents(Vector3::X, Vector3::Y);
        let n = tri.shading_normal(Point3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        assert!((n.as_vec() - Vector3::X).length() < 1e-9);
    }
}
