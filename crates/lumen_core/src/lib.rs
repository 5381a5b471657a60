//! Lumen Core - colour, images and surface maps for the path tracer.
//!
//! This crate provides:
//!
//! - **Colour**: `Spectrum`, the three band `Color` and display `Rgb`
//! - **Images**: 8-bit encode/decode through the `image` crate
//! - **Surface maps**: `Texture` and `NormalMap` with nearest/bilinear lookup
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Filter, TextureCache};
//!
//! let mut cache = TextureCache::with_base_dir("resources");
//! let wood = cache.texture("wood.png", Filter::Bilinear)?;
//! let color = wood.get(uv);
//! ```

pub mod color;
pub mod image;
pub mod texture;

// Re-export commonly used types
pub use color::{Color, Rgb, Spectrum};
pub use image::{load_image, save_image, Image, ImageData, ImageError, ImageResult, ImageSize};
pub use texture::{Filter, NormalMap, Texture, TextureCache};
