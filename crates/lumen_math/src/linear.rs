//! Small linear solves used during primitive setup.

use glam::DMat3;

use crate::{MathError, MathResult, Point2, Point3};

/// Squared sine of the smallest corner angle still treated as a triangle.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Affine map from points on a triangle's plane to UV coordinates.
///
/// Built once per triangle by inverting the 3x3 basis `[e1 e2 n]`, so a
/// lookup is one matrix-vector product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvMap {
    origin: Point3,
    to_local: DMat3,
    uv0: Point2,
    du: Point2,
    dv: Point2,
}

impl UvMap {
    /// Build the map sending `p[i]` to `uv[i]`.
    ///
    /// Fails for degenerate (zero-area) triangles.
    pub fn new(p: [Point3; 3], uv: [Point2; 3]) -> MathResult<Self> {
        let e1 = p[1] - p[0];
        let e2 = p[2] - p[0];
        let n = e1.cross(e2);

        // det [e1 e2 e1xe2] = |e1xe2|^2, compared relative to the edge lengths
        let basis = DMat3::from_cols(e1, e2, n);
        let det = basis.determinant();
        let scale = e1.length_squared() * e2.length_squared();
        if !det.is_finite() || scale == 0.0 || det.abs() < SINGULAR_EPSILON * scale {
            return Err(MathError::SingularMatrix(det));
        }

        Ok(Self {
            origin: p[0],
            to_local: basis.inverse(),
            uv0: uv[0],
            du: uv[1] - uv[0],
            dv: uv[2] - uv[0],
        })
    }

    /// UV coordinate of a point on (or projected onto) the triangle's plane.
    pub fn apply(&self, x: Point3) -> Point2 {
        let local = self.to_local * (x - self.origin);
        self.uv0 + self.du * local.x + self.dv * local.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> [Point3; 3] {
        [
            Point3::new(-10.0, -4.0, 8.0),
            Point3::new(-10.0, -4.0, -12.0),
            Point3::new(10.0, -4.0, -12.0),
        ]
    }

    #[test]
    fn test_uv_map_hits_vertices() {
        let uv = [Point2::new(0.0, 2.0), Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let map = UvMap::new(corners(), uv).unwrap();

        for (p, expected) in corners().iter().zip(uv) {
            assert!((map.apply(*p) - expected).length() < 1e-9);
        }
    }

    #[test]
    fn test_uv_map_is_affine() {
        let uv = [Point2::new(0.0, 1.0), Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        let p = corners();
        let map = UvMap::new(p, uv).unwrap();

        let centroid = (p[0] + p[1] + p[2]) / 3.0;
        let expected = (uv[0] + uv[1] + uv[2]) / 3.0;
        assert!((map.apply(centroid) - expected).length() < 1e-9);
    }

    #[test]
    fn test_uv_map_through_origin() {
        // The plane contains the origin; the affine basis still works
        let p = [Point3::ZERO, Point3::X, Point3::Y];
        let uv = [Point2::ZERO, Point2::X, Point2::Y];
        let map = UvMap::new(p, uv).unwrap();

        let uv_mid = map.apply(Point3::new(0.25, 0.5, 0.0));
        assert!((uv_mid - Point2::new(0.25, 0.5)).length() < 1e-9);
    }

    #[test]
    fn test_degenerate_triangle() {
        let p = [Point3::ZERO, Point3::X, Point3::X * 2.0];
        let uv = [Point2::ZERO, Point2::X, Point2::Y];
        assert!(UvMap::new(p, uv).is_err());

        let collapsed = [Point3::X, Point3::X, Point3::Y];
        assert!(UvMap::new(collapsed, uv).is_err());
    }

    #[test]
    fn test_uv_map_small_triangle() {
        // Half-millimetre legs: |e1 x e2|^2 is tiny but the shape is fine
        let p = [Point3::ZERO, Point3::new(5e-4, 0.0, 0.0), Point3::new(0.0, 5e-4, 0.0)];
        let uv = [Point2::ZERO, Point2::X, Point2::Y];
        let map = UvMap::new(p, uv).unwrap();

        let uv_mid = map.apply(Point3::new(2.5e-4, 1.25e-4, 0.0));
        assert!((uv_mid - Point2::new(0.5, 0.25)).length() < 1e-9);
    }

    #[test]
    fn test_nearly_collinear_triangle() {
        let p = [Point3::ZERO, Point3::X, Point3::new(2.0, 1e-9, 0.0)];
        let uv = [Point2::ZERO, Point2::X, Point2::Y];
        assert!(UvMap::new(p, uv).is_err());
    }
}
