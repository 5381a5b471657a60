//! Path integrator.
//!
//! Paths are traced iteratively: at every vertex the emitters are sampled
//! directly, then a single reflection continues the path. Paths end on a
//! miss, at the depth limit, or once their throughput falls below
//! [`EPSILON`]. The hard cutoff drops low-weight tails instead of playing
//! Russian roulette, so the estimate is biased slightly low.

use lumen_math::{Normal, Point2, Point3, Ray};
use rand::RngCore;

use crate::primitive::Primitive;
use crate::scene::Scene;
use crate::Color;

/// Termination threshold for probabilities, cosines and throughput.
pub const EPSILON: f64 = 1e-2;

/// Light reaching `x` directly from every emitter and leaving towards `v`.
pub fn direct_lighting(
    scene: &Scene,
    primitive: &Primitive,
    x: Point3,
    n: Normal,
    v: Normal,
    uv: Point2,
) -> Color {
    let mut radiance = Color::BLACK;

    for emitter in scene.emitters() {
        let emission = emitter.emission(x, n);
        if emission.radiance.luminance() < EPSILON {
            continue;
        }

        let attenuation = scene.shadow_attenuation(&emission.ray_to_light, emission.distance());
        let l = emission.ray_to_light.direction();
        radiance += attenuation * primitive.material().brdf(l, n, v, uv) * emission.radiance;
    }

    radiance
}

/// Radiance arriving along `ray`.
///
/// `max_depth` counts bounces after the first hit; zero gives direct
/// lighting only.
pub fn trace(scene: &Scene, ray: Ray, max_depth: u32, rng: &mut dyn RngCore) -> Color {
    let mut ray = ray;
    let mut radiance = Color::BLACK;
    let mut throughput = Color::WHITE;

    for depth in 0..=max_depth {
        let Some(hit) = scene.intersect(&ray) else {
            break;
        };

        let primitive = hit.primitive;
        let x = ray.at(hit.distance);
        let uv = if primitive.requires_uv() {
            primitive.uv(x)
        } else {
            Point2::ZERO
        };
        let n = primitive.normal(x, uv);
        let v = -ray.direction();

        radiance += throughput * direct_lighting(scene, primitive, x, n, v, uv);

        if depth == max_depth {
            break;
        }

        let reflection = primitive.material().sample_reflection(n, v, uv, rng);
        if reflection.probability < EPSILON {
            break;
        }

        let cos = reflection.direction.dot(n.as_vec()).abs();
        if cos < EPSILON {
            break;
        }

        throughput *= reflection.color * cos * reflection.probability;
        if throughput.luminance() < EPSILON {
            break;
        }

        ray = Ray::from_normal(x, reflection.direction);
    }

    radiance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Diffuse, IdealReflector, PointLight, Primitive, Sphere, Triangle};
    use lumen_math::Vector3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn camera() -> Camera {
        Camera::new(Point3::ZERO, Vector3::X, Vector3::Y, Point3::new(0.0, 0.0, 1.0))
    }

    /// White diffuse unit sphere at the origin lit from straight above.
    fn lit_sphere() -> Scene {
        let mut scene = Scene::new(camera());
        scene.add_primitive(Primitive::new(
            Sphere::new(Point3::ZERO, 1.0),
            Arc::new(Diffuse::new(Color::splat(1.0 / std::f64::consts::PI))),
        ));
        scene.add_emitter(PointLight::new(Point3::new(0.0, 5.0, 0.0), Color::splat(50.0)));
        scene
    }

    /// Radiance seen by a ray shot from outside at the sphere point with
    /// polar angle `theta` (measured from +Y).
    fn radiance_at(scene: &Scene, theta: f64) -> Color {
        let target = Point3::new(theta.sin(), theta.cos(), 0.0);
        let origin = target * 4.0 + Vector3::new(0.0, 0.0, 0.01);
        let ray = Ray::new(origin, target - origin);
        let mut rng = StdRng::seed_from_u64(42);
        trace(scene, ray, 0, &mut rng)
    }

    #[test]
    fn test_lit_sphere_gradient() {
        let scene = lit_sphere();

        let angles = [0.0, 0.3, 0.6, 0.9, 1.2];
        let values: Vec<f64> = angles
            .iter()
            .map(|&theta| radiance_at(&scene, theta).luminance())
            .collect();

        // Brightest where the normal faces the light, falling off away from it
        for pair in values.windows(2) {
            assert!(pair[0] > pair[1], "values = {:?}", values);
        }

        // Lower hemisphere is unlit
        for theta in [2.0, 2.5, 3.0] {
            assert!(radiance_at(&scene, theta).luminance() < 1e-9);
        }
    }

    #[test]
    fn test_opaque_blocker_removes_direct_light() {
        let floor_x = Point3::new(0.0, 0.0, 0.0);
        let n = Normal::new(Vector3::Y);
        let v = Normal::new(Vector3::Y);

        let build = |blocked: bool| {
            let mut scene = Scene::new(camera());
            let white: Arc<dyn crate::Material> = Arc::new(Diffuse::new(Color::WHITE));
            scene.add_primitive(Primitive::new(
                Triangle::new(
                    Point3::new(-5.0, 0.0, -5.0),
                    Point3::new(5.0, 0.0, -5.0),
                    Point3::new(0.0, 0.0, 5.0),
                )
                .unwrap(),
                white.clone(),
            ));
            if blocked {
                scene.add_primitive(Primitive::new(
                    Sphere::new(Point3::new(0.0, 2.0, 0.0), 0.5),
                    white,
                ));
            }
            scene.add_emitter(PointLight::new(Point3::new(0.0, 4.0, 0.0), Color::splat(16.0)));
            scene
        };

        let open = build(false);
        let floor = &open.primitives()[0];
        let lit = direct_lighting(&open, floor, floor_x, n, v, Point2::ZERO);
        assert!(lit.luminance() > 0.5);

        let blocked = build(true);
        let floor = &blocked.primitives()[0];
        let shadowed = direct_lighting(&blocked, floor, floor_x, n, v, Point2::ZERO);
        assert!(shadowed.is_black());
    }

    #[test]
    fn test_zero_depth_mirrors_only_direct() {
        // Two facing mirrors with a diffuse ball between them
        let mut scene = Scene::new(camera());
        let mirror: Arc<dyn crate::Material> = Arc::new(IdealReflector::new(Color::WHITE));
        scene.add_primitive(Primitive::new(
            Sphere::new(Point3::new(0.0, 0.0, -10.0), 5.0),
            mirror.clone(),
        ));
        scene.add_primitive(Primitive::new(
            Sphere::new(Point3::new(0.0, 0.0, 10.0), 5.0),
            mirror,
        ));
        scene.add_emitter(PointLight::new(Point3::new(0.0, 0.0, 0.0), Color::splat(10.0)));

        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(42);

        // Mirrors have no BRDF, so direct light is all zero
        let direct = trace(&scene, ray, 0, &mut rng);
        assert!(direct.is_black());

        // Bounces still find nothing diffuse to light
        let bounced = trace(&scene, ray, 4, &mut rng);
        assert!(bounced.is_black());
    }

    /// Diffuse ball seen only through a mirror floor with reflectance `kr`.
    fn ball_over_mirror(kr: f64) -> Scene {
        let mut scene = Scene::new(camera());
        scene.add_primitive(Primitive::new(
            Triangle::new(
                Point3::new(-5.0, 0.0, -5.0),
                Point3::new(5.0, 0.0, -5.0),
                Point3::new(0.0, 0.0, 5.0),
            )
            .unwrap(),
            Arc::new(IdealReflector::new(Color::splat(kr))),
        ));
        scene.add_primitive(Primitive::new(
            Sphere::new(Point3::new(0.0, 3.0, -1.0), 1.0),
            Arc::new(Diffuse::new(Color::WHITE)),
        ));
        scene.add_emitter(PointLight::new(Point3::new(0.0, 1.0, 1.0), Color::splat(10.0)));
        scene
    }

    /// Looks down at the mirror; the reflection heads up into the ball.
    fn down_at_mirror() -> Ray {
        Ray::new(Point3::new(0.0, 3.0, 2.0), Vector3::new(0.0, -3.0, -1.0))
    }

    #[test]
    fn test_zero_depth_stops_after_first_hit() {
        let scene = ball_over_mirror(1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let direct = trace(&scene, down_at_mirror(), 0, &mut rng);
        assert!(direct.is_black());

        let bounced = trace(&scene, down_at_mirror(), 1, &mut rng);
        assert!(bounced.luminance() > 0.0);
    }

    #[test]
    fn test_low_throughput_path_is_cut() {
        let mut rng = StdRng::seed_from_u64(42);

        // Just above the cutoff the ball still shows up in the mirror
        let dim = ball_over_mirror(EPSILON * 2.0);
        assert!(trace(&dim, down_at_mirror(), 1, &mut rng).luminance() > 0.0);

        // Just below it the bounce is dropped, so depth 1 equals depth 0
        let dark = ball_over_mirror(EPSILON * 0.9);
        let direct = trace(&dark, down_at_mirror(), 0, &mut rng);
        let bounced = trace(&dark, down_at_mirror(), 1, &mut rng);
        assert_eq!(bounced, direct);
        assert!(bounced.is_black());
    }

    #[test]
    fn test_miss_is_black() {
        let scene = lit_sphere();
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::Z);
        assert!(trace(&scene, ray, 8, &mut rng).is_black());
    }
}
