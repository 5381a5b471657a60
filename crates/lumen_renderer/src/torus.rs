//! Torus primitive for ray tracing.
//!
//! The torus lies in its local XY plane around the Z axis. Rays are moved
//! into the local frame and the quartic is solved analytically through its
//! resolvent cubic.

use std::f64::consts::PI;

use lumen_math::{
    transform_normal, Coord, DMat3, DMat4, DVec2, Mat4Ext, MathResult, Normal, Point2, Point3,
    Ray, Vector3,
};

use crate::surface::{Surface, HIT_EPSILON};

/// Threshold for the near-zero branches of the quartic solver.
const QUARTIC_EPSILON: Coord = 1e-8;

/// No-hit marker inside the solver.
const NO_ROOT: Coord = 1e20;

/// A torus with major radius `major` and tube radius `minor`.
#[derive(Debug, Clone)]
pub struct Torus {
    major: Coord,
    minor: Coord,
    /// Local to world
    view: DMat4,
    /// World to local
    inverse_view: DMat4,
    normal_matrix: DMat3,
}

impl Torus {
    /// Create a torus placed in the world by `view`.
    ///
    /// Fails when `view` cannot be inverted.
    pub fn new(major: Coord, minor: Coord, view: DMat4) -> MathResult<Self> {
        Ok(Self {
            major,
            minor,
            view,
            inverse_view: view.try_inverse()?,
            normal_matrix: view.normal_matrix()?,
        })
    }

    fn to_local(&self, x: Point3) -> Point3 {
        self.inverse_view.transform_point3(x)
    }

    /// Whether a local point lies on the inner half of the tube.
    fn is_inner(&self, p: Point3) -> bool {
        p.x * p.x + p.y * p.y < self.major * self.major
    }

    fn local_normal(&self, p: Point3) -> Normal {
        let ring = DVec2::new(p.x, p.y).normalize_or_zero() * self.major;
        Normal::new(p - Vector3::new(ring.x, ring.y, 0.0))
    }

    /// Smallest positive local distance along a unit local ray.
    fn solve(&self, ro: Point3, rd: Vector3) -> Option<Coord> {
        let ra2 = self.major * self.major;
        let rb2 = self.minor * self.minor;

        let m = ro.dot(ro);
        let n = ro.dot(rd);

        // Bounding sphere
        let outer = self.major + self.minor;
        if n * n - m + outer * outer < 0.0 {
            return None;
        }

        let k = (m - rb2 - ra2) / 2.0;
        let mut k3 = n;
        let mut k2 = n * n + ra2 * rd.z * rd.z + k;
        let mut k1 = k * n + ra2 * ro.z * rd.z;
        let mut k0 = k * k + ra2 * ro.z * ro.z - ra2 * rb2;

        // Keep |c1| away from zero by solving for 1/t instead
        let inverted = (k3 * (k3 * k3 - k2) + k1).abs() < QUARTIC_EPSILON;
        if inverted {
            std::mem::swap(&mut k1, &mut k3);
            k0 = 1.0 / k0;
            k1 *= k0;
            k2 *= k0;
            k3 *= k0;
        }

        let mut c2 = 2.0 * k2 - 3.0 * k3 * k3;
        let mut c1 = k3 * (k3 * k3 - k2) + k1;
        let mut c0 = k3 * (k3 * (-3.0 * k3 * k3 + 4.0 * k2) - 8.0 * k1) + 4.0 * k0;
        c2 /= 3.0;
        c1 *= 2.0;
        c0 /= 3.0;

        let q = c2 * c2 + c0;
        let r = 3.0 * c0 * c2 - c2 * c2 * c2 - c1 * c1;
        let h = r * r - q * q * q;

        let z = if h < 0.0 {
            // Four real roots
            let sq = q.sqrt();
            2.0 * sq * ((r / (sq * q)).acos() / 3.0).cos()
        } else {
            // Two real roots
            let sq = (h.sqrt() + r.abs()).cbrt();
            r.signum() * (sq + q / sq).abs()
        };
        let z = c2 - z;

        let mut d1 = z - 3.0 * c2;
        let mut d2 = z * z - 3.0 * c0;
        if d1.abs() < QUARTIC_EPSILON {
            if d2 < 0.0 {
                return None;
            }
            d2 = d2.sqrt();
        } else {
            if d1 < 0.0 {
                return None;
            }
            d1 = (d1 / 2.0).sqrt();
            d2 = c1 / d1;
        }

        let unswap = |t: Coord| if inverted { 2.0 / t } else { t };
        let mut result = NO_ROOT;

        let h = d1 * d1 - z + d2;
        if h > 0.0 {
            let h = h.sqrt();
            for t in [-d1 - h - k3, -d1 + h - k3].map(unswap) {
                if t > 0.0 {
                    result = result.min(t);
                }
            }
        }

        let h = d1 * d1 - z - d2;
        if h > 0.0 {
            let h = h.sqrt();
            for t in [d1 - h - k3, d1 + h - k3].map(unswap) {
                if t > 0.0 {
                    result = result.min(t);
                }
            }
        }

        (result < NO_ROOT * 0.1 && result >= HIT_EPSILON).then_some(result)
    }
}

impl Surface for Torus {
    fn intersect(&self, ray: &Ray) -> Option<Coord> {
        let local = self.inverse_view.transform_ray(ray);
        let t = self.solve(local.origin(), local.direction().as_vec())?;

        // The view may scale, so measure the hit in world units
        let world_hit = self.view.transform_point3(local.at(t));
        let distance = (world_hit - ray.origin()).length();
        (distance >= HIT_EPSILON).then_some(distance)
    }

    fn normal(&self, x: Point3) -> Normal {
        let local = self.local_normal(self.to_local(x));
        transform_normal(&self.normal_matrix, local)
    }

    fn uv(&self, x: Point3) -> Point2 {
        let p = self.to_local(x);

        let u = p.y.atan2(p.x) / (2.0 * PI) + 0.5;
        let z = 0.9999 * (-p.z / self.minor).clamp(-1.0, 1.0);
        let mut v = z.asin() / (2.0 * PI) + 0.5;

        if self.is_inner(p) {
            v = if v > 0.5 { 1.5 - v } else { 0.5 - v };
        }

        Point2::new(u, v)
    }

    fn shading_normal(&self, x: Point3, d: Vector3) -> Normal {
        let p = self.to_local(x);
        let n = self.local_normal(p);

        let mut tu = n.cross(Vector3::NEG_Z);
        if self.is_inner(p) {
            tu = -tu;
        }
        let tv = n.cross(tu);

        let local = Normal::new(tu * d.x + tv * d.y + n.as_vec() * d.z);
        transform_normal(&self.normal_matrix, local)
    }
}
