//! The showcase scene: tori, spheres and a textured room lit by two
//! spherical lights.

use std::f64::consts::PI;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lumen_core::{Color, Filter, NormalMap, Texture, TextureCache};
use lumen_math::{DMat4, Point2, Point3, Vector3};
use lumen_renderer::{
    Camera, GeneralMaterial, Material, Primitive, Scene, Sphere, SphereLight, Torus, Triangle,
};

/// Edge length of the procedural maps.
const PROCEDURAL_SIZE: usize = 256;

/// Where textures and normal maps come from.
pub enum Maps {
    /// Generated patterns, no files needed
    Procedural,
    /// Images loaded from a resource directory
    Directory(TextureCache),
}

impl Maps {
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) => Maps::Directory(TextureCache::with_base_dir(dir)),
            None => Maps::Procedural,
        }
    }

    fn texture(&mut self, name: &str, filter: Filter) -> Result<Arc<Texture>> {
        match self {
            Maps::Procedural => Ok(Arc::new(procedural_texture(name, filter))),
            Maps::Directory(cache) => cache
                .texture(format!("{name}.png"), filter)
                .with_context(|| format!("failed to load texture {name}")),
        }
    }

    fn normal_map(&mut self, name: &str) -> Result<Arc<NormalMap>> {
        match self {
            Maps::Procedural => Ok(Arc::new(procedural_normal_map(name))),
            Maps::Directory(cache) => cache
                .normal_map(format!("{name}Normal.png"), Filter::Bilinear)
                .with_context(|| format!("failed to load normal map {name}")),
        }
    }
}

/// Checkerboard in two colours, `cells` squares along each side.
fn checker(a: Color, b: Color, cells: usize, filter: Filter) -> Texture {
    let cell = PROCEDURAL_SIZE / cells;
    Texture::from_fn(PROCEDURAL_SIZE, PROCEDURAL_SIZE, filter, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            a
        } else {
            b
        }
    })
}

/// Horizontal bands, e.g. wood grain or stripes.
fn bands(a: Color, b: Color, count: f64, filter: Filter) -> Texture {
    Texture::from_fn(PROCEDURAL_SIZE, PROCEDURAL_SIZE, filter, |x, y| {
        let t = y as f64 / PROCEDURAL_SIZE as f64;
        let wobble = 0.02 * (2.0 * PI * 3.0 * x as f64 / PROCEDURAL_SIZE as f64).sin();
        let s = 0.5 + 0.5 * (2.0 * PI * count * (t + wobble)).sin();
        a * (1.0 - s) + b * s
    })
}

fn procedural_texture(name: &str, filter: Filter) -> Texture {
    match name {
        "wood1" | "wood2" => bands(
            Color::new(0.45, 0.28, 0.14),
            Color::new(0.75, 0.55, 0.33),
            12.0,
            filter,
        ),
        "stone" => checker(Color::splat(0.45), Color::splat(0.65), 16, filter),
        "earth" => checker(
            Color::new(0.1, 0.25, 0.7),
            Color::new(0.2, 0.55, 0.2),
            8,
            filter,
        ),
        "billiard" => bands(Color::WHITE, Color::new(0.8, 0.1, 0.1), 1.0, filter),
        "basketball" => bands(
            Color::new(0.85, 0.4, 0.1),
            Color::new(0.1, 0.05, 0.02),
            4.0,
            filter,
        ),
        _ => checker(Color::splat(0.2), Color::splat(0.8), 8, filter),
    }
}

/// Sinusoidal bumps; `frequency` bumps along each side.
fn bumps(frequency: f64, strength: f64) -> NormalMap {
    NormalMap::from_fn(PROCEDURAL_SIZE, PROCEDURAL_SIZE, Filter::Bilinear, |x, y| {
        let u = 2.0 * PI * frequency * x as f64 / PROCEDURAL_SIZE as f64;
        let v = 2.0 * PI * frequency * y as f64 / PROCEDURAL_SIZE as f64;
        Vector3::new(strength * u.cos() * v.sin(), strength * u.sin() * v.cos(), 0.5)
    })
}

fn procedural_normal_map(name: &str) -> NormalMap {
    match name {
        "brick" => bumps(12.0, 0.25),
        "drops" => bumps(6.0, 0.15),
        "basketball" => bumps(40.0, 0.1),
        "wood1" | "wood2" => bumps(3.0, 0.05),
        _ => bumps(8.0, 0.2),
    }
}

/// Camera tilted 45 degrees down towards the room.
fn camera() -> Camera {
    let angle = (-45.0_f64).to_radians();
    Camera::new(
        Point3::new(0.0, 5.0, 0.0),
        Vector3::new(16.0 / 9.0, 0.0, 0.0),
        Vector3::new(0.0, angle.cos(), angle.sin()),
        Point3::new(0.0, 5.0 - 3.5 * angle.sin(), 3.5 * angle.cos()),
    )
}

fn general(
    diffuse: f64,
    specular: f64,
    shine: f64,
    kr: f64,
    kt: f64,
    ior: f64,
) -> GeneralMaterial {
    GeneralMaterial::new(
        Color::splat(diffuse),
        Color::splat(specular),
        shine,
        Color::splat(kr),
        Color::splat(kt),
        ior,
    )
}

/// Build the showcase scene.
pub fn build(maps: &mut Maps) -> Result<Scene> {
    // Materials
    let stone: Arc<dyn Material> = Arc::new(
        general(0.8, 0.1, 8.0, 0.0, 0.0, 1.0)
            .with_texture(maps.texture("stone", Filter::Nearest)?),
    );
    let billiard: Arc<dyn Material> = Arc::new(
        general(1.0, 0.3, 16.0, 0.7, 0.0, 1.0)
            .with_texture(maps.texture("billiard", Filter::Nearest)?),
    );
    let earth: Arc<dyn Material> = Arc::new(
        general(1.0, 0.2, 64.0, 0.0, 0.0, 1.0)
            .with_texture(maps.texture("earth", Filter::Nearest)?),
    );
    let wall: Arc<dyn Material> = Arc::new(GeneralMaterial::new(
        Color::new(0.2, 0.3, 0.9),
        Color::splat(0.1),
        16.0,
        Color::BLACK,
        Color::BLACK,
        1.0,
    ));
    let wood: Arc<dyn Material> = Arc::new(
        general(0.8, 0.3, 64.0, 0.0, 0.0, 1.0)
            .with_texture(maps.texture("wood1", Filter::Nearest)?),
    );
    let ball: Arc<dyn Material> = Arc::new(
        general(1.0, 0.0, 0.0, 0.0, 0.0, 1.0)
            .with_texture(maps.texture("basketball", Filter::Bilinear)?),
    );
    let glass: Arc<dyn Material> = Arc::new(general(0.0, 0.1, 32.0, 0.0, 1.0, 1.1));
    let mirror: Arc<dyn Material> = Arc::new(general(0.0, 0.2, 64.0, 1.0, 0.0, 1.0));

    let mut scene = Scene::new(camera());

    // Tori
    scene.add_primitive(Primitive::new(
        Torus::new(
            1.0,
            0.5,
            DMat4::from_translation(Vector3::new(6.0, -2.8, -8.0))
                * DMat4::from_rotation_y(-1.57)
                * DMat4::from_rotation_x(-0.8),
        )?,
        mirror.clone(),
    ));
    scene.add_primitive(
        Primitive::new(
            Torus::new(
                1.0,
                0.5,
                DMat4::from_translation(Vector3::new(-4.0, -3.5, -6.0))
                    * DMat4::from_rotation_x(-1.57),
            )?,
            stone,
        )
        .with_normal_map(maps.normal_map("stone")?),
    );

    // Spheres
    scene.add_primitive(
        Primitive::new(
            Sphere::new(Point3::new(-2.0, -2.5, -8.0), 1.5)
                .with_orientation(DMat4::from_rotation_y(-0.2))?,
            earth,
        )
        .with_normal_map(maps.normal_map("earth")?),
    );
    scene.add_primitive(
        Primitive::new(Sphere::new(Point3::new(0.2, -2.5, -6.5), 1.5), glass)
            .with_normal_map(maps.normal_map("drops")?),
    );
    scene.add_primitive(Primitive::new(
        Sphere::new(Point3::new(1.0, -2.5, -10.0), 1.5),
        mirror,
    ));
    scene.add_primitive(Primitive::new(
        Sphere::new(Point3::new(3.3, -2.8, -6.0), 1.2)
            .with_orientation(DMat4::from_rotation_x(-0.7) * DMat4::from_rotation_y(1.3))?,
        billiard,
    ));
    scene.add_primitive(
        Primitive::new(
            Sphere::new(Point3::new(3.6, -2.8, -9.0), 1.2)
                .with_orientation(DMat4::from_rotation_y(0.5) * DMat4::from_rotation_z(0.5))?,
            ball,
        )
        .with_normal_map(maps.normal_map("basketball")?),
    );

    // Back wall
    let brick = maps.normal_map("brick")?;
    scene.add_primitive(
        Primitive::new(
            Triangle::with_uvs(
                [
                    Point3::new(-10.0, -4.0, -12.0),
                    Point3::new(-10.0, 16.0, -12.0),
                    Point3::new(10.0, -4.0, -12.0),
                ],
                [Point2::new(0.0, 1.0), Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            )?,
            wall.clone(),
        )
        .with_normal_map(brick.clone()),
    );
    scene.add_primitive(
        Primitive::new(
            Triangle::with_uvs(
                [
                    Point3::new(-10.0, 16.0, -12.0),
                    Point3::new(10.0, 16.0, -12.0),
                    Point3::new(10.0, -4.0, -12.0),
                ],
                [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            )?,
            wall,
        )
        .with_normal_map(brick),
    );

    // Floor
    let wood_normal = maps.normal_map("wood1")?;
    scene.add_primitive(
        Primitive::new(
            Triangle::with_uvs(
                [
                    Point3::new(-10.0, -4.0, 8.0),
                    Point3::new(-10.0, -4.0, -12.0),
                    Point3::new(10.0, -4.0, -12.0),
                ],
                [Point2::new(0.0, 1.0), Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
            )?
            .with_tangents(Vector3::X, Vector3::NEG_Z),
            wood.clone(),
        )
        .with_normal_map(wood_normal.clone()),
    );
    scene.add_primitive(
        Primitive::new(
            Triangle::with_uvs(
                [
                    Point3::new(-10.0, -4.0, 8.0),
                    Point3::new(10.0, -4.0, -12.0),
                    Point3::new(10.0, -4.0, 8.0),
                ],
                [Point2::new(0.0, 1.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
            )?
            .with_tangents(Vector3::X, Vector3::NEG_Z),
            wood,
        )
        .with_normal_map(wood_normal),
    );

    // Lights
    let warm = Color::new(6.3, 2.3, 1.4) * 100.0;
    scene.add_emitter(SphereLight::new(Point3::new(4.0, 3.0, -3.0), 0.4, warm));
    scene.add_emitter(SphereLight::new(Point3::new(-4.0, 3.0, 0.0), 0.4, warm));

    log::debug!(
        "Showcase scene: {} primitives, {} emitters",
        scene.primitives().len(),
        scene.emitters().len()
    );

    Ok(scene)
}
