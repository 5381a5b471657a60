//! 8-bit image encode/decode.
//!
//! Pixels are linear [0, 1] intensities, quantized to 8 bits per channel on
//! save. The file format is picked from the path extension by the `image`
//! crate.

use std::path::Path;

use thiserror::Error;

use crate::Rgb;

/// Errors that can occur while reading or writing images.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to open image {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: ::image::ImageError,
    },

    #[error("Failed to save image {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: ::image::ImageError,
    },

    #[error("Pixel count {actual} does not match image size {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("Image {0} has no pixels")]
    Empty(String),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: usize,
    pub height: usize,
}

impl ImageSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Row-major display pixels.
pub type ImageData = Vec<Rgb>;

/// A decoded image.
#[derive(Debug, Clone)]
pub struct Image {
    pub size: ImageSize,
    pub data: ImageData,
}

impl Image {
    /// Pixel at integer coordinates.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.data[y * self.size.width + x]
    }
}

/// Save pixels as an 8-bit RGB image.
pub fn save_image(path: impl AsRef<Path>, size: ImageSize, data: &[Rgb]) -> ImageResult<()> {
    let path = path.as_ref();
    if data.len() != size.pixel_count() {
        return Err(ImageError::SizeMismatch {
            width: size.width,
            height: size.height,
            actual: data.len(),
        });
    }

    let raw: Vec<u8> = data.iter().flat_map(|rgb| rgb.to_bytes()).collect();
    let buffer = ::image::RgbImage::from_raw(size.width as u32, size.height as u32, raw).ok_or(
        ImageError::SizeMismatch {
            width: size.width,
            height: size.height,
            actual: data.len(),
        },
    )?;

    buffer.save(path).map_err(|source| ImageError::Save {
        path: path.display().to_string(),
        source,
    })?;

    log::debug!("Saved image: {} ({}x{})", path.display(), size.width, size.height);
    Ok(())
}

/// Load an image file as linear [0, 1] RGB.
pub fn load_image(path: impl AsRef<Path>) -> ImageResult<Image> {
    let path = path.as_ref();
    let img = ::image::open(path).map_err(|source| ImageError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::Empty(path.display().to_string()));
    }

    let data = rgb.pixels().map(|p| Rgb::from_bytes(p.0)).collect();

    log::debug!("Loaded image: {} ({}x{})", path.display(), width, height);

    Ok(Image {
        size: ImageSize::new(width as usize, height as usize),
        data,
    })
}
