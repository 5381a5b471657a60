//! Material trait and the four reflectance lobes.
//!
//! Materials answer two questions at a hit point: how much light arriving
//! from `L` leaves towards `V` (the BRDF, used for direct lighting), and
//! which direction to continue a path in (importance-sampled reflection).

use std::f64::consts::PI;
use std::sync::Arc;

use lumen_core::Texture;
use lumen_math::{Normal, Point2, Vector3};
use rand::RngCore;

use crate::{gen_f64, Color};

/// Cosines below this are treated as grazing.
const COS_EPSILON: f64 = 1e-2;

/// Specular samples with a density below this are discarded.
const PDF_EPSILON: f64 = 1e-2;

/// A sampled continuation direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    /// Probability (density) the direction was picked with
    pub probability: f64,
    /// Outgoing direction
    pub direction: Normal,
    /// Colour carried along the direction
    pub color: Color,
}

impl Reflection {
    pub fn new(probability: f64, direction: Normal, color: Color) -> Self {
        Self {
            probability,
            direction,
            color,
        }
    }

    /// A reflection that contributes nothing and ends the path.
    pub fn none() -> Self {
        Self::new(0.0, Normal::new(Vector3::ZERO), Color::BLACK)
    }
}

/// Trait for materials that describe how light interacts with surfaces.
///
/// All directions point away from the surface: `n` is the shading normal,
/// `v` points back towards the viewer and `l` towards the light.
pub trait Material: Send + Sync {
    /// Reflectance for light arriving from `l` and leaving towards `v`.
    fn brdf(&self, l: Normal, n: Normal, v: Normal, uv: Point2) -> Color;

    /// Pick a continuation direction.
    fn sample_reflection(
        &self,
        n: Normal,
        v: Normal,
        uv: Point2,
        rng: &mut dyn RngCore,
    ) -> Reflection;

    /// Colour filter applied to shadow rays passing through the surface.
    fn transparency(&self) -> Color {
        Color::BLACK
    }

    /// Whether `brdf`/`sample_reflection` look at the UV coordinate.
    fn requires_uv(&self) -> bool {
        false
    }
}

/// Orthonormal pair perpendicular to `axis`.
fn perpendicular_frame(axis: Normal) -> (Vector3, Vector3) {
    let mut o = axis.cross(Vector3::Z);
    if o.length() < COS_EPSILON {
        o = axis.cross(Vector3::Y);
    }
    let o = o.normalize();
    let p = axis.cross(o);
    (o, p)
}

/// Lambertian (diffuse) lobe.
#[derive(Clone)]
pub struct Diffuse {
    spectrum: Color,
    texture: Option<Arc<Texture>>,
}

impl Diffuse {
    /// Create a diffuse lobe with a constant BRDF value.
    pub fn new(spectrum: Color) -> Self {
        Self {
            spectrum,
            texture: None,
        }
    }

    /// Modulate the BRDF by a texture lookup.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Hemispherical albedo used to weight this lobe.
    pub fn average_albedo(&self) -> f64 {
        self.spectrum.luminance() * PI
    }

    fn value(&self, uv: Point2) -> Color {
        match &self.texture {
            Some(texture) => self.spectrum * texture.get(uv),
            None => self.spectrum,
        }
    }
}

impl Material for Diffuse {
    fn brdf(&self, _l: Normal, _n: Normal, _v: Normal, uv: Point2) -> Color {
        self.value(uv)
    }

    fn sample_reflection(
        &self,
        n: Normal,
        _v: Normal,
        uv: Point2,
        rng: &mut dyn RngCore,
    ) -> Reflection {
        let u1 = gen_f64(rng);
        let u2 = gen_f64(rng);

        // Cosine-weighted hemisphere
        let theta = u1.sqrt().asin();
        let phi = 2.0 * PI * u2;

        let (o, p) = perpendicular_frame(n);
        let l = n.as_vec() * theta.cos()
            + o * (theta.sin() * phi.cos())
            + p * (theta.sin() * phi.sin());

        Reflection::new(theta.cos() / PI, Normal::new(l), self.value(uv))
    }

    fn requires_uv(&self) -> bool {
        self.texture.is_some()
    }
}

/// Phong-style glossy lobe.
#[derive(Debug, Clone)]
pub struct Specular {
    spectrum: Color,
    shine: f64,
}

impl Specular {
    pub fn new(spectrum: Color, shine: f64) -> Self {
        Self { spectrum, shine }
    }

    /// Hemispherical albedo used to weight this lobe.
    pub fn average_albedo(&self) -> f64 {
        self.spectrum.luminance() * 2.0 * PI / (self.shine + 2.0)
    }
}

impl Material for Specular {
    fn brdf(&self, l: Normal, n: Normal, v: Normal, _uv: Point2) -> Color {
        let cos_in = l.dot(n.as_vec());
        if cos_in <= COS_EPSILON || self.spectrum.luminance() == 0.0 {
            return Color::BLACK;
        }

        let r = n.as_vec() * (2.0 * cos_in) - l.as_vec();
        let cos_out = r.dot(v.as_vec());
        if cos_out <= COS_EPSILON {
            return Color::BLACK;
        }

        self.spectrum * ((self.shine + 2.0) / (2.0 * PI)) * cos_out.powf(self.shine)
    }

    fn sample_reflection(
        &self,
        n: Normal,
        v: Normal,
        _uv: Point2,
        rng: &mut dyn RngCore,
    ) -> Reflection {
        let u1 = gen_f64(rng);
        let u2 = gen_f64(rng);

        let cos_a = u1.powf(1.0 / (self.shine + 1.0));
        let probability = (self.shine + 1.0) / (2.0 * PI) * cos_a.powf(self.shine);
        if probability < PDF_EPSILON {
            return Reflection::none();
        }

        let sin_a = (1.0 - cos_a * cos_a).max(0.0).sqrt();
        let (o, p) = perpendicular_frame(v);
        let phi = 2.0 * PI * u2;

        // Lobe around the view direction, mirrored about the normal
        let r = o * (sin_a * phi.cos()) + p * (sin_a * phi.sin()) + v.as_vec() * cos_a;
        let l = Normal::new(n.as_vec() * (2.0 * n.dot(r)) - r);
        if n.dot(l.as_vec()) <= 0.0 {
            return Reflection::none();
        }

        Reflection::new(probability, l, self.brdf(l, n, v, Point2::ZERO))
    }
}

/// Perfect mirror.
#[derive(Debug, Clone)]
pub struct IdealReflector {
    kr: Color,
}

impl IdealReflector {
    pub fn new(kr: Color) -> Self {
        Self { kr }
    }

    pub fn kr(&self) -> Color {
        self.kr
    }
}

impl Material for IdealReflector {
    /// Delta lobes never see light sources directly.
    fn brdf(&self, _l: Normal, _n: Normal, _v: Normal, _uv: Point2) -> Color {
        Color::BLACK
    }

    fn sample_reflection(
        &self,
        n: Normal,
        v: Normal,
        _uv: Point2,
        _rng: &mut dyn RngCore,
    ) -> Reflection {
        let l = Normal::new(n.as_vec() * (2.0 * n.dot(v.as_vec())) - v.as_vec());
        let cos = n.dot(l.as_vec());
        let color = if cos > COS_EPSILON {
            self.kr / cos
        } else {
            Color::BLACK
        };
        Reflection::new(1.0, l, color)
    }
}

/// Perfect refraction through a dielectric boundary.
#[derive(Debug, Clone)]
pub struct IdealRefractor {
    kt: Color,
    /// Relative index of refraction, inside over outside
    ior: f64,
}

impl IdealRefractor {
    pub fn new(kt: Color, ior: f64) -> Self {
        Self { kt, ior }
    }

    pub fn kt(&self) -> Color {
        self.kt
    }
}

impl Material for IdealRefractor {
    fn brdf(&self, _l: Normal, _n: Normal, _v: Normal, _uv: Point2) -> Color {
        Color::BLACK
    }

    fn sample_reflection(
        &self,
        n: Normal,
        v: Normal,
        _uv: Point2,
        _rng: &mut dyn RngCore,
    ) -> Reflection {
        let cos_a = n.dot(v.as_vec());

        // Entering when the viewer is on the normal's side
        let (eta, norm) = if cos_a > 0.0 {
            (self.ior, n.as_vec())
        } else {
            (1.0 / self.ior, -n.as_vec())
        };
        let cos_a = cos_a.abs();

        let disc = 1.0 - (1.0 - cos_a * cos_a) / (eta * eta);
        if disc < 0.0 {
            // Total internal reflection
            return Reflection::none();
        }

        let l = Normal::new(norm * (cos_a / eta - disc.sqrt()) - v.as_vec() / eta);
        let cos = -norm.dot(l.as_vec());
        let color = if cos > COS_EPSILON {
            self.kt / cos
        } else {
            Color::BLACK
        };
        Reflection::new(1.0, l, color)
    }

    fn transparency(&self) -> Color {
        self.kt
    }
}
