//! Renderable objects: a surface paired with its material.

use std::sync::Arc;

use lumen_core::NormalMap;
use lumen_math::{Coord, Normal, Point2, Point3, Ray};

use crate::material::Material;
use crate::surface::Surface;

/// A surface with its shading attributes.
///
/// Materials and normal maps are shared between primitives.
pub struct Primitive {
    surface: Box<dyn Surface>,
    material: Arc<dyn Material>,
    normal_map: Option<Arc<NormalMap>>,
}

impl Primitive {
    pub fn new(surface: impl Surface + 'static, material: Arc<dyn Material>) -> Self {
        Self {
            surface: Box::new(surface),
            material,
            normal_map: None,
        }
    }

    /// Perturb shading normals with a normal map.
    pub fn with_normal_map(mut self, normal_map: Arc<NormalMap>) -> Self {
        self.normal_map = Some(normal_map);
        self
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Coord> {
        self.surface.intersect(ray)
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    /// Whether shading needs the UV coordinate of the hit.
    pub fn requires_uv(&self) -> bool {
        self.material.requires_uv() || self.normal_map.is_some()
    }

    pub fn uv(&self, x: Point3) -> Point2 {
        self.surface.uv(x)
    }

    /// Shading normal at `x`, normal mapped when a map is attached.
    pub fn normal(&self, x: Point3, uv: Point2) -> Normal {
        match &self.normal_map {
            Some(map) => self.surface.shading_normal(x, map.get(uv)),
            None => self.surface.normal(x),
        }
    }
}
