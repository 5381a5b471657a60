//! Composite material built from all four lobes.
//!
//! Each sample picks one lobe with probability proportional to its albedo
//! and scales the sampled probability by that weight.

use std::sync::Arc;

use lumen_core::Texture;
use lumen_math::{Normal, Point2};
use rand::RngCore;

use crate::material::{Diffuse, IdealReflector, IdealRefractor, Material, Reflection, Specular};
use crate::{gen_f64, Color};

/// Diffuse + glossy + mirror + refractive material.
#[derive(Clone)]
pub struct GeneralMaterial {
    diffuse: Diffuse,
    specular: Specular,
    reflector: IdealReflector,
    refractor: IdealRefractor,
}

impl GeneralMaterial {
    /// Create a material from the parameters of every lobe.
    ///
    /// - `diffuse`, `specular`: BRDF colours of the diffuse and glossy lobes
    /// - `shine`: glossy exponent
    /// - `kr`, `kt`: mirror and transmission colours
    /// - `ior`: relative index of refraction
    pub fn new(
        diffuse: Color,
        specular: Color,
        shine: f64,
        kr: Color,
        kt: Color,
        ior: f64,
    ) -> Self {
        Self {
            diffuse: Diffuse::new(diffuse),
            specular: Specular::new(specular, shine),
            reflector: IdealReflector::new(kr),
            refractor: IdealRefractor::new(kt, ior),
        }
    }

    /// Modulate the diffuse lobe with a texture.
    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.diffuse = self.diffuse.with_texture(texture);
        self
    }

    /// Normalized lobe weights: diffuse, specular, mirror, refraction.
    ///
    /// `None` when every lobe is black.
    pub fn weights(&self) -> Option<[f64; 4]> {
        let raw = [
            self.diffuse.average_albedo(),
            self.specular.average_albedo(),
            self.reflector.kr().luminance(),
            self.refractor.kt().luminance(),
        ];

        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            return None;
        }

        Some(raw.map(|w| w / sum))
    }

    fn lobe(&self, index: usize) -> &dyn Material {
        match index {
            0 => &self.diffuse,
            1 => &self.specular,
            2 => &self.reflector,
            _ => &self.refractor,
        }
    }
}

impl Material for GeneralMaterial {
    /// Only the non-delta lobes respond to light sources.
    fn brdf(&self, l: Normal, n: Normal, v: Normal, uv: Point2) -> Color {
        self.diffuse.brdf(l, n, v, uv) + self.specular.brdf(l, n, v, uv)
    }

    fn sample_reflection(
        &self,
        n: Normal,
        v: Normal,
        uv: Point2,
        rng: &mut dyn RngCore,
    ) -> Reflection {
        let Some(weights) = self.weights() else {
            return Reflection::none();
        };

        let mut p = gen_f64(rng);
        let mut chosen = weights.len() - 1;
        for (index, weight) in weights.iter().enumerate() {
            p -= weight;
            if p < 0.0 {
                chosen = index;
                break;
            }
        }

        let mut reflection = self.lobe(chosen).sample_reflection(n, v, uv, rng);
        reflection.probability *= weights[chosen];
        reflection
    }

    fn transparency(&self) -> Color {
        match self.weights() {
            Some(weights) => (0..4)
                .map(|index| self.lobe(index).transparency() * weights[index])
                .sum(),
            None => Color::BLACK,
        }
    }

    fn requires_uv(&self) -> bool {
        self.diffuse.requires_uv()
    }
}
