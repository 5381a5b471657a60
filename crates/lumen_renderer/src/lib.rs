//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer with importance-sampled material lobes,
//! explicit light sampling and stratified pixel sampling.
//!
//! Scenes are built from [`Primitive`]s (a [`Surface`] plus a [`Material`])
//! and [`Emitter`]s, then handed to [`render`] together with a
//! [`RenderConfig`].

mod bucket;
mod camera;
mod composite;
mod emitter;
mod integrator;
mod material;
mod primitive;
mod renderer;
mod scene;
mod sphere;
mod surface;
mod torus;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use composite::GeneralMaterial;
pub use emitter::{Emission, Emitter, PointLight, SphereLight};
pub use integrator::{direct_lighting, trace, EPSILON};
pub use material::{Diffuse, IdealReflector, IdealRefractor, Material, Reflection, Specular};
pub use primitive::Primitive;
pub use renderer::{render, render_pixel, ImageBuffer, RenderConfig, RenderError, RenderResult};
pub use scene::{Intersection, Scene};
pub use sphere::Sphere;
pub use surface::{Surface, HIT_EPSILON};
pub use torus::Torus;
pub use triangle::Triangle;

/// Re-export the colour type used throughout the renderer
pub use lumen_core::Color;

use rand::{Rng, RngCore};

/// Uniform sample in [0, 1) from a type-erased generator.
#[inline]
pub(crate) fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}
