//! Camera for ray generation.

use lumen_math::{Coord, Point3, Ray, Vector3};

/// A pinhole camera looking through a rectangular view plane.
///
/// The view plane is centered on `vrp` and spanned by `u` (half width) and
/// `v` (half height), so normalized device coordinates in [-1, 1] cover it.
#[derive(Debug, Clone)]
pub struct Camera {
    /// View reference point, the center of the view plane
    vrp: Point3,
    /// Half-extent of the view plane to the right
    u: Vector3,
    /// Half-extent of the view plane upwards
    v: Vector3,
    /// Eye (projection center)
    eye: Point3,
}

impl Camera {
    /// Create a camera from its view plane and eye position.
    pub fn new(vrp: Point3, u: Vector3, v: Vector3, eye: Point3) -> Self {
        Self { vrp, u, v, eye }
    }

    /// Create a camera at `eye` looking at `target`.
    ///
    /// `vfov` is the vertical field of view in degrees and `aspect` the
    /// width over height of the image.
    pub fn look_at(eye: Point3, target: Point3, up: Vector3, vfov: Coord, aspect: Coord) -> Self {
        let half_height = (vfov.to_radians() / 2.0).tan();

        // Camera basis
        let w = (eye - target).normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u);

        Self {
            vrp: eye - w,
            u: u * half_height * aspect,
            v: v * half_height,
            eye,
        }
    }

    /// Ray through the view plane at normalized device coordinates.
    ///
    /// `(−1, −1)` is the bottom-left corner, `(1, 1)` the top-right.
    pub fn get_ray(&self, x: Coord, y: Coord) -> Ray {
        let p = self.vrp + self.u * x + self.v * y;
        Ray::new(p, p - self.eye)
    }

    pub fn eye(&self) -> Point3 {
        self.eye
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_center_ray() {
        let camera = Camera::new(
            Point3::new(0.0, 0.0, -1.0),
            Vector3::X,
            Vector3::Y,
            Point3::ZERO,
        );

        let ray = camera.get_ray(0.0, 0.0);
        assert!((ray.origin() - Point3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        assert!((ray.direction().as_vec() - Vector3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn test_camera_corner_ray() {
        let camera = Camera::new(
            Point3::new(0.0, 0.0, -1.0),
            Vector3::X,
            Vector3::Y,
            Point3::ZERO,
        );

        let ray = camera.get_ray(1.0, 1.0);
        assert!(ray.direction().x > 0.0);
        assert!(ray.direction().y > 0.0);
        assert!(ray.direction().z < 0.0);
    }

    #[test]
    fn test_look_at() {
        let camera = Camera::look_at(
            Point3::new(0.0, 0.0, 5.0),
            Point3::ZERO,
            Vector3::Y,
            90.0,
            2.0,
        );

        // Center ray heads at the target
        let ray = camera.get_ray(0.0, 0.0);
        assert!((ray.direction().as_vec() - Vector3::NEG_Z).length() < 1e-9);

        // 90 degree vertical field: the top edge is 45 degrees up
        let top = camera.get_ray(0.0, 1.0);
        assert!((top.direction().y - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);

        // Aspect ratio widens the horizontal extent
        let right = camera.get_ray(1.0, 0.0);
        assert!(right.direction().x > top.direction().y);
    }
}
