//! Render entry point.
//!
//! Every pixel is sampled on a jittered `grid_size x grid_size` grid and
//! each sub-sample traced independently through the integrator. The image
//! is split into buckets that rayon renders in parallel.

use std::time::Instant;

use lumen_core::{Color, ImageSize, Rgb};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::integrator::trace;
use crate::{gen_f64, Scene};

/// Depths past this rarely change the image, they only cost time.
const DEEP_PATH_WARNING: u32 = 64;

/// Errors for render setups that cannot produce an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("image size must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("grid size must be at least 1")]
    EmptyGrid,

    #[error("bucket size must be at least 1")]
    EmptyBucket,
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Sub-samples per pixel along each axis
    pub grid_size: u32,
    /// Maximum number of bounces after the first hit
    pub max_depth: u32,
    /// Seed for the per-pixel generators; random when unset
    pub seed: Option<u64>,
    /// Edge length of a render bucket in pixels
    pub bucket_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            grid_size: 4,
            max_depth: 16,
            seed: None,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Check the configuration can produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.grid_size == 0 {
            return Err(RenderError::EmptyGrid);
        }
        if self.bucket_size == 0 {
            return Err(RenderError::EmptyBucket);
        }

        if self.max_depth > DEEP_PATH_WARNING {
            log::warn!(
                "max_depth {} is unusually deep; paths rarely survive past {}",
                self.max_depth,
                DEEP_PATH_WARNING
            );
        }
        if self.width == 1 || self.height == 1 {
            log::warn!(
                "{}x{} image maps every pixel onto the view plane edge",
                self.width,
                self.height
            );
        }

        Ok(())
    }

    /// Sub-samples traced per pixel.
    pub fn samples_per_pixel(&self) -> u64 {
        u64::from(self.grid_size).pow(2)
    }

    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }
}

/// Render a single pixel on a jittered sub-sample grid.
///
/// `row` counts down from the top of the image and `col` from the left.
pub fn render_pixel(
    scene: &Scene,
    row: usize,
    col: usize,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let grid = config.grid_size as f64;
    let mut pixel_color = Color::BLACK;

    for_each_subsample(row, col, config, rng, |x, y, rng| {
        let ray = scene.camera.get_ray(x, y);
        pixel_color += trace(scene, ray, config.max_depth, rng);
    });

    pixel_color / (grid * grid)
}

/// Call `sample` with the NDC position of every jittered sub-sample of a
/// pixel, row of the grid first. Sub-sample `(a, b)` stays inside cell
/// `a` vertically and cell `b` horizontally.
fn for_each_subsample(
    row: usize,
    col: usize,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    mut sample: impl FnMut(f64, f64, &mut dyn RngCore),
) {
    let grid = config.grid_size as f64;
    let x_span = (config.width.saturating_sub(1)).max(1) as f64;
    let y_span = (config.height.saturating_sub(1)).max(1) as f64;

    for a in 0..config.grid_size {
        for b in 0..config.grid_size {
            let i = row as f64 + (a as f64 + gen_f64(rng)) / grid - 0.5;
            let j = col as f64 + (b as f64 + gen_f64(rng)) / grid - 0.5;

            let x = 2.0 * j / x_span - 1.0;
            let y = -(2.0 * i / y_span - 1.0);

            sample(x, y, rng);
        }
    }
}

/// Generator for one pixel, independent of which thread renders it.
pub(crate) fn pixel_rng(seed: u64, row: usize, col: usize, width: usize) -> StdRng {
    let index = (row * width + col) as u64;
    StdRng::seed_from_u64(seed.wrapping_add(index))
}

/// Linear render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (local_y, row) in result.pixels.chunks(bucket.width).enumerate() {
            let start = (bucket.y + local_y) * self.width + bucket.x;
            self.pixels[start..start + row.len()].copy_from_slice(row);
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Clamp to display colours (for saving).
    pub fn to_rgb(&self) -> Vec<Rgb> {
        self.pixels.iter().map(|&c| Rgb::from(c)).collect()
    }
}

/// Render the scene into a linear image buffer.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);

    log::info!(
        "Rendering {}x{} with {} samples per pixel, depth {}, {} buckets on {} threads",
        config.width,
        config.height,
        config.samples_per_pixel(),
        config.max_depth,
        buckets.len(),
        rayon::current_num_threads()
    );
    log::debug!("Render seed: {}", seed);

    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .into_par_iter()
        .map(|bucket| {
            let pixels = render_bucket(&bucket, scene, config, seed);
            log::debug!(
                "Bucket {} done ({}x{} at {},{})",
                bucket.index,
                bucket.width,
                bucket.height,
                bucket.x,
                bucket.y
            );
            BucketResult::new(bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Rendered in {:.2?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Camera, Diffuse, PointLight, Primitive, Sphere};
    use lumen_math::{Point3, Vector3};
    use std::sync::Arc;

    fn small_scene() -> Scene {
        let camera = Camera::look_at(
            Point3::new(0.0, 0.0, 4.0),
            Point3::ZERO,
            Vector3::Y,
            40.0,
            1.0,
        );
        let mut scene = Scene::new(camera);
        scene.add_primitive(Primitive::new(
            Sphere::new(Point3::ZERO, 1.0),
            Arc::new(Diffuse::new(Color::splat(0.3))),
        ));
        scene.add_emitter(PointLight::new(Point3::new(0.0, 5.0, 5.0), Color::splat(40.0)));
        scene
    }

    fn config(width: usize, height: usize) -> RenderConfig {
        RenderConfig {
            width,
            height,
            grid_size: 2,
            max_depth: 2,
            seed: Some(7),
            bucket_size: 4,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.seed, None);
        assert_eq!(config.bucket_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde() {
        let config = config(32, 16);
        let json = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        // Missing fields fall back to the defaults
        let partial: RenderConfig = serde_json::from_str(r#"{ "width": 100 }"#).unwrap();
        assert_eq!(partial.width, 100);
        assert_eq!(partial.height, 480);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = config(0, 10);
        assert_eq!(
            config.validate(),
            Err(RenderError::EmptyImage { width: 0, height: 10 })
        );

        config.width = 10;
        config.grid_size = 0;
        assert_eq!(config.validate(), Err(RenderError::EmptyGrid));
        assert!(render(&small_scene(), &config).is_err());
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let scene = small_scene();
        let config = config(9, 9);
        let mut rng = StdRng::seed_from_u64(42);

        let center = render_pixel(&scene, 4, 4, &config, &mut rng);
        assert!(center.luminance() > 0.0);

        let corner = render_pixel(&scene, 0, 0, &config, &mut rng);
        assert!(corner.is_black());
    }

    #[test]
    fn test_subsamples_stay_in_their_cells() {
        let config = RenderConfig {
            grid_size: 4,
            ..config(11, 7)
        };
        let (row, col) = (3, 8);
        let g = config.grid_size as f64;
        let mut rng = StdRng::seed_from_u64(42);

        let mut ndc = Vec::new();
        for_each_subsample(row, col, &config, &mut rng, |x, y, _| ndc.push((x, y)));
        assert_eq!(ndc.len(), 16);

        for (k, &(x, y)) in ndc.iter().enumerate() {
            let (a, b) = ((k / 4) as f64, (k % 4) as f64);

            // Back from NDC to fractional pixel coordinates
            let j = (x + 1.0) * (config.width - 1) as f64 / 2.0;
            let i = (1.0 - y) * (config.height - 1) as f64 / 2.0;
            let cell_x = (j - (col as f64 - 0.5)) * g;
            let cell_y = (i - (row as f64 - 0.5)) * g;

            assert!(cell_x >= b - 1e-9 && cell_x <= b + 1.0 + 1e-9, "sample {}: {}", k, cell_x);
            assert!(cell_y >= a - 1e-9 && cell_y <= a + 1.0 + 1e-9, "sample {}: {}", k, cell_y);
        }
    }

    #[test]
    fn test_samples_per_pixel_does_not_overflow() {
        assert_eq!(config(4, 4).samples_per_pixel(), 4);

        let config = RenderConfig {
            grid_size: 70_000,
            ..config(4, 4)
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_pixel(), 4_900_000_000);
    }

    #[test]
    fn test_render_is_reproducible() {
        let scene = small_scene();
        let config = config(10, 7);

        let a = render(&scene, &config).unwrap();
        let b = render(&scene, &config).unwrap();
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.size(), ImageSize::new(10, 7));

        // Bucketing must not change the result
        let single = RenderConfig {
            bucket_size: 64,
            ..config
        };
        let c = render(&scene, &single).unwrap();
        assert_eq!(a.pixels, c.pixels);
    }

    #[test]
    fn test_single_pixel_image() {
        let scene = small_scene();
        let image = render(&scene, &config(1, 1)).unwrap();
        assert_eq!(image.pixels.len(), 1);
        assert!(image.pixels[0].luminance().is_finite());
    }

    #[test]
    fn test_to_rgb_clamps() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Color::splat(4.0));
        image.set(1, 0, Color::splat(0.25));

        let rgb = image.to_rgb();
        assert_eq!(rgb[0], Rgb::new(1.0, 1.0, 1.0));
        assert!((rgb[1].g - 0.25).abs() < 1e-12);
    }
}
