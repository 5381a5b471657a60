//! Texture and normal-map loading, caching and lookup.
//!
//! Both map a UV coordinate, wrapped into [0, 1), to a value stored on a
//! regular grid with nearest or bilinear interpolation. Loaded maps are
//! immutable and shared between primitives through `Arc`.

use std::collections::HashMap;
use std::ops::{Add, Mul};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Point2, Vector3};

use crate::image::{load_image, ImageResult};
use crate::Color;

/// Interpolation used when looking up a texel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Bilinear,
}

/// Look up a value on a `width x height` grid at a wrapped UV coordinate.
///
/// `v = 0` is the first row of the grid.
fn sample_grid<T>(values: &[T], width: usize, height: usize, uv: Point2, filter: Filter) -> T
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T>,
{
    let u = uv.x.rem_euclid(1.0);
    let v = uv.y.rem_euclid(1.0);

    match filter {
        Filter::Nearest => {
            let x = ((u * width as f64) as usize).min(width - 1);
            let y = ((v * height as f64) as usize).min(height - 1);
            values[x + width * y]
        }
        Filter::Bilinear => {
            let x = u * (width - 1) as f64;
            let y = v * (height - 1) as f64;

            let x0 = x.floor() as usize;
            let y0 = y.floor() as usize;
            let x1 = (x0 + 1).min(width - 1);
            let y1 = (y0 + 1).min(height - 1);

            let fx = x.fract();
            let fy = y.fract();

            let top = values[x0 + width * y0] * (1.0 - fx) + values[x1 + width * y0] * fx;
            let bottom = values[x0 + width * y1] * (1.0 - fx) + values[x1 + width * y1] * fx;

            top * (1.0 - fy) + bottom * fy
        }
    }
}

/// A colour texture.
#[derive(Clone, Debug)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    filter: Filter,
}

impl Texture {
    /// Create a texture from row-major pixels.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height` or the texture is empty.
    pub fn new(width: usize, height: usize, pixels: Vec<Color>, filter: Filter) -> Self {
        assert!(width > 0 && height > 0, "texture must not be empty");
        assert_eq!(pixels.len(), width * height, "pixel count does not match size");
        Self {
            width,
            height,
            pixels,
            filter,
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Color) -> Self {
        Self::new(1, 1, vec![color], Filter::Nearest)
    }

    /// Build a texture by evaluating `f(x, y)` for every texel.
    pub fn from_fn(
        width: usize,
        height: usize,
        filter: Filter,
        f: impl Fn(usize, usize) -> Color,
    ) -> Self {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, pixels, filter)
    }

    /// Load a texture from an image file.
    pub fn load(path: impl AsRef<Path>, filter: Filter) -> ImageResult<Self> {
        let image = load_image(path)?;
        let pixels = image.data.into_iter().map(Color::from).collect();
        Ok(Self::new(image.size.width, image.size.height, pixels, filter))
    }

    /// Colour at the given (wrapped) UV coordinate.
    pub fn get(&self, uv: Point2) -> Color {
        sample_grid(&self.pixels, self.width, self.height, uv, self.filter)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// A tangent-space normal perturbation map.
///
/// Stored texels are `rgb - 0.5`; the caller combines them with a tangent
/// frame and normalizes.
#[derive(Clone, Debug)]
pub struct NormalMap {
    width: usize,
    height: usize,
    values: Vec<Vector3>,
    filter: Filter,
}

impl NormalMap {
    /// Create a normal map from row-major perturbation vectors.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height` or the map is empty.
    pub fn new(width: usize, height: usize, values: Vec<Vector3>, filter: Filter) -> Self {
        assert!(width > 0 && height > 0, "normal map must not be empty");
        assert_eq!(values.len(), width * height, "value count does not match size");
        Self {
            width,
            height,
            values,
            filter,
        }
    }

    /// Build a normal map by evaluating `f(x, y)` for every texel.
    pub fn from_fn(
        width: usize,
        height: usize,
        filter: Filter,
        f: impl Fn(usize, usize) -> Vector3,
    ) -> Self {
        let values = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, values, filter)
    }

    /// Load a normal map from an image file.
    pub fn load(path: impl AsRef<Path>, filter: Filter) -> ImageResult<Self> {
        let image = load_image(path)?;
        let values = image
            .data
            .into_iter()
            .map(|rgb| Vector3::new(rgb.r - 0.5, rgb.g - 0.5, rgb.b - 0.5))
            .collect();
        Ok(Self::new(image.size.width, image.size.height, values, filter))
    }

    /// Perturbation at the given (wrapped) UV coordinate. Not normalized.
    pub fn get(&self, uv: Point2) -> Vector3 {
        sample_grid(&self.values, self.width, self.height, uv, self.filter)
    }
}

/// Cache for loaded textures and normal maps.
///
/// Maps are loaded on-demand and shared between every primitive that uses
/// the same file.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Arc<Texture>>,
    normal_maps: HashMap<PathBuf, Arc<NormalMap>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
            ..Self::default()
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn texture(&mut self, path: impl AsRef<Path>, filter: Filter) -> ImageResult<Arc<Texture>> {
        let full_path = self.resolve_path(path.as_ref());
        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(Texture::load(&full_path, filter)?);
        log::debug!(
            "Loaded texture: {} ({}x{})",
            full_path.display(),
            texture.width,
            texture.height
        );
        self.textures.insert(full_path, texture.clone());
        Ok(texture)
    }

    /// Load a normal map from file, using cache if available.
    pub fn normal_map(
        &mut self,
        path: impl AsRef<Path>,
        filter: Filter,
    ) -> ImageResult<Arc<NormalMap>> {
        let full_path = self.resolve_path(path.as_ref());
        if let Some(map) = self.normal_maps.get(&full_path) {
            return Ok(map.clone());
        }

        let map = Arc::new(NormalMap::load(&full_path, filter)?);
        log::debug!(
            "Loaded normal map: {} ({}x{})",
            full_path.display(),
            map.width,
            map.height
        );
        self.normal_maps.insert(full_path, map.clone());
        Ok(map)
    }

    /// Number of cached textures and normal maps.
    pub fn len(&self) -> usize {
        self.textures.len() + self.normal_maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}
