//! Image processing, generation and storage
//!
//! Provides:
//! - Sketch to line-art conversion
//! - AI pattern generation with a TTL cache and blank-canvas fallback
//! - Artwork files under the static tree

mod cache;
mod gen;
pub mod lineart;
mod store;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

pub use cache::{CacheKey, PatternCache};
pub use gen::{blank_canvas, PatternGenerator, DEFAULT_SIZE, MAX_SIZE};
pub use lineart::ConversionError;
pub use store::{decode_data_url, png_data_url, static_url, ArtworkStore, StoreError, StoredImage};

/// Encode an image as PNG bytes
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
