//! Light sources.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

use lumen_math::{Coord, Normal, Point3, Ray};

use crate::Color;

/// Lights grazing the surface closer than this contribute nothing.
const COS_EPSILON: f64 = 1e-2;

/// Light arriving at a shading point from one emitter sample.
#[derive(Debug, Clone, Copy)]
pub struct Emission {
    /// Incident radiance, already scaled by falloff and cosine
    pub radiance: Color,
    /// Sampled position on the light
    pub position: Point3,
    /// Ray from the shading point towards `position`
    pub ray_to_light: Ray,
}

impl Emission {
    /// Distance from the shading point to the light sample.
    pub fn distance(&self) -> Coord {
        (self.position - self.ray_to_light.origin()).length()
    }
}

/// Trait for light sources.
///
/// Emitters are shared by every render thread, so any sampling state must
/// be interior and thread-safe.
pub trait Emitter: Send + Sync {
    /// Sample the light as seen from `x` on a surface with normal `n`.
    fn emission(&self, x: Point3, n: Normal) -> Emission;
}

/// Radiance from a point at `position` reaching `x` with inverse-square falloff.
fn point_emission(position: Point3, color: Color, x: Point3, n: Normal) -> Emission {
    let l = Normal::new(position - x);
    let cos = l.dot(n.as_vec());
    let ray_to_light = Ray::from_normal(x, l);

    let radiance = if cos <= COS_EPSILON {
        Color::BLACK
    } else {
        color * cos / (x - position).length_squared()
    };

    Emission {
        radiance,
        position,
        ray_to_light,
    }
}

/// An infinitely small light.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Point3,
    color: Color,
}

impl PointLight {
    pub fn new(position: Point3, color: Color) -> Self {
        Self { position, color }
    }
}

impl Emitter for PointLight {
    fn emission(&self, x: Point3, n: Normal) -> Emission {
        point_emission(self.position, self.color, x, n)
    }
}

/// A spherical light approximated by 16 fixed points on its surface.
///
/// Successive samples cycle through the points.
#[derive(Debug)]
pub struct SphereLight {
    positions: Vec<Point3>,
    cursor: AtomicUsize,
    color: Color,
}

impl SphereLight {
    pub fn new(center: Point3, radius: Coord, color: Color) -> Self {
        let steps = [0.0, 0.25, 0.5, 0.75];
        let positions = steps
            .iter()
            .flat_map(|&u| steps.iter().map(move |&v| (u, v)))
            .map(|(u, v)| {
                let theta = 2.0 * PI * u;
                let phi = (2.0 * v - 1.0_f64).acos();
                center
                    + Point3::new(
                        radius * theta.cos() * phi.sin(),
                        radius * theta.sin() * phi.sin(),
                        radius * phi.cos(),
                    )
            })
            .collect();

        Self {
            positions,
            cursor: AtomicUsize::new(0),
            color,
        }
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    fn next_position(&self) -> Point3 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.positions.len();
        self.positions[index]
    }
}

impl Emitter for SphereLight {
    fn emission(&self, x: Point3, n: Normal) -> Emission {
        point_emission(self.next_position(), self.color, x, n)
    }
}
