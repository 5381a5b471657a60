//! Scene container and ray queries.

use lumen_math::{Coord, Interval, Ray};

use crate::emitter::Emitter;
use crate::primitive::Primitive;
use crate::{Camera, Color};

/// Shadow rays ignore hits closer than this to the shading point.
const SHADOW_EPSILON: Coord = 1e-4;

/// Shadow rays stop once this little light gets through.
const OPAQUE_LUMINANCE: f64 = 1e-2;

/// The nearest primitive along a ray.
#[derive(Clone, Copy)]
pub struct Intersection<'a> {
    pub primitive: &'a Primitive,
    pub distance: Coord,
}

/// Everything needed to render an image.
///
/// Scenes are built up front and only read while rendering.
pub struct Scene {
    pub camera: Camera,
    primitives: Vec<Primitive>,
    emitters: Vec<Box<dyn Emitter>>,
}

impl Scene {
    /// Create an empty scene viewed through `camera`.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            primitives: Vec::new(),
            emitters: Vec::new(),
        }
    }

    pub fn add_primitive(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn add_emitter(&mut self, emitter: impl Emitter + 'static) {
        self.emitters.push(Box::new(emitter));
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn emitters(&self) -> &[Box<dyn Emitter>] {
        &self.emitters
    }

    /// Nearest primitive hit by `ray`.
    ///
    /// Ties keep the primitive added first.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut nearest: Option<Intersection<'_>> = None;

        for primitive in &self.primitives {
            if let Some(distance) = primitive.intersect(ray) {
                if nearest.map_or(true, |hit| distance < hit.distance) {
                    nearest = Some(Intersection {
                        primitive,
                        distance,
                    });
                }
            }
        }

        nearest
    }

    /// Fraction of light surviving from the ray origin to `light_distance`.
    ///
    /// Every primitive in between filters the light by its transparency.
    /// Rays are not bent by refractive primitives.
    pub fn shadow_attenuation(&self, ray: &Ray, light_distance: Coord) -> Color {
        let range = Interval::new(SHADOW_EPSILON, light_distance);
        let mut attenuation = Color::WHITE;

        for primitive in &self.primitives {
            let Some(t) = primitive.intersect(ray) else {
                continue;
            };
            if !range.surrounds(t) {
                continue;
            }

            attenuation *= primitive.material().transparency();
            if attenuation.luminance() < OPAQUE_LUMINANCE {
                return attenuation;
            }
        }

        attenuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diffuse, IdealRefractor, Sphere};
    use lumen_math::{Point3, Vector3};
    use std::sync::Arc;

    fn camera() -> Camera {
        Camera::new(Point3::ZERO, Vector3::X, Vector3::Y, Point3::new(0.0, 0.0, 1.0))
    }

    fn sphere_at(z: f64, material: Arc<dyn crate::Material>) -> Primitive {
        Primitive::new(Sphere::new(Point3::new(0.0, 0.0, z), 1.0), material)
    }

    #[test]
    fn test_nearest_hit() {
        let white: Arc<dyn crate::Material> = Arc::new(Diffuse::new(Color::WHITE));
        let mut scene = Scene::new(camera());
        scene.add_primitive(sphere_at(-10.0, white.clone()));
        scene.add_primitive(sphere_at(-5.0, white.clone()));
        scene.add_primitive(sphere_at(-20.0, white));

        let ray = Ray::new(Point3::ZERO, Vector3::NEG_Z);
        let hit = scene.intersect(&ray).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-9);
        assert!(std::ptr::eq(hit.primitive, &scene.primitives()[1]));

        let miss = Ray::new(Point3::ZERO, Vector3::Z);
        assert!(scene.intersect(&miss).is_none());
    }

    #[test]
    fn test_shadow_opaque_blocker() {
        let mut scene = Scene::new(camera());
        scene.add_primitive(sphere_at(-5.0, Arc::new(Diffuse::new(Color::WHITE))));

        let ray = Ray::new(Point3::ZERO, Vector3::NEG_Z);
        assert!(scene.shadow_attenuation(&ray, 10.0).is_black());

        // Light in front of the blocker
        assert_eq!(scene.shadow_attenuation(&ray, 3.0), Color::WHITE);
    }

    #[test]
    fn test_shadow_through_glass() {
        let mut scene = Scene::new(camera());
        let tint = Color::new(1.0, 0.5, 0.25);
        scene.add_primitive(sphere_at(-5.0, Arc::new(IdealRefractor::new(tint, 1.5))));

        let ray = Ray::new(Point3::ZERO, Vector3::NEG_Z);
        let attenuation = scene.shadow_attenuation(&ray, 10.0);
        assert!((attenuation[0] - 1.0).abs() < 1e-12);
        assert!((attenuation[1] - 0.5).abs() < 1e-12);
        assert!((attenuation[2] - 0.25).abs() < 1e-12);
    }
}
