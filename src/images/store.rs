//! Artwork storage under the static tree
//!
//! Saved artworks, uploaded sketches and converted line art are plain files
//! below the static directory, so they are served by the static route as-is.
//! Generated names use a random uuid to avoid collisions.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{DynamicImage, GrayImage};
use thiserror::Error;
use tracing::{debug, warn};

use super::encode_png;
use crate::gallery::{secure_filename, AI_CATEGORY, LINE_ART_DIR, UPLOAD_DIR};

/// URL prefix under which the static directory is served
pub const STATIC_URL_PREFIX: &str = "/static";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid image data")]
    InvalidDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid filename")]
    InvalidFilename,

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written to the static tree
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Path on disk
    pub path: PathBuf,
    /// Public URL of the file
    pub url: String,
}

/// Writes images below the static directory
#[derive(Debug, Clone)]
pub struct ArtworkStore {
    static_dir: PathBuf,
}

impl ArtworkStore {
    /// Create a store rooted at `static_dir`
    pub fn new(static_dir: impl AsRef<Path>) -> Self {
        Self {
            static_dir: static_dir.as_ref().to_path_buf(),
        }
    }

    /// Save a colored artwork as `user_artworks/art_<uuid>.png`
    pub async fn save_artwork(&self, data: &[u8]) -> Result<StoredImage, StoreError> {
        let relative = format!("{}/{}", UPLOAD_DIR, unique_name("art"));
        self.write(&relative, data).await
    }

    /// Keep the raw uploaded sketch next to the generated line art
    pub async fn save_upload(&self, filename: &str, data: &[u8]) -> Result<StoredImage, StoreError> {
        let safe = secure_filename(filename);
        if safe.is_empty() {
            return Err(StoreError::InvalidFilename);
        }
        let relative = format!("{}/{}/{}", LINE_ART_DIR, AI_CATEGORY, safe);
        self.write(&relative, data).await
    }

    /// Save converted line art as `line_art/ai_generated/line_art_<uuid>.png`
    pub async fn save_line_art(&self, img: GrayImage) -> Result<StoredImage, StoreError> {
        let data = encode_png(&DynamicImage::ImageLuma8(img))?;
        let relative = format!("{}/{}/{}", LINE_ART_DIR, AI_CATEGORY, unique_name("line_art"));
        self.write(&relative, &data).await
    }

    /// Remove a previously stored file; failures are only logged
    pub async fn discard(&self, stored: &StoredImage) {
        match tokio::fs::remove_file(&stored.path).await {
            Ok(()) => debug!("Removed {}", stored.path.display()),
            Err(e) => warn!("Failed to remove {}: {}", stored.path.display(), e),
        }
    }

    async fn write(&self, relative: &str, data: &[u8]) -> Result<StoredImage, StoreError> {
        let path = self.static_dir.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        debug!("Stored {} ({} bytes)", path.display(), data.len());
        Ok(StoredImage {
            path,
            url: static_url(relative),
        })
    }
}

/// Public URL for a path relative to the static directory
pub fn static_url(relative: &str) -> String {
    format!("{}/{}", STATIC_URL_PREFIX, relative)
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}.png", prefix, uuid::Uuid::new_v4().simple())
}

/// Decode the base64 payload of a `data:` URL
///
/// Everything up to the first comma is treated as the header and ignored.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, StoreError> {
    let (_header, encoded) = data_url
        .split_once(',')
        .ok_or(StoreError::InvalidDataUrl)?;
    Ok(BASE64.decode(encoded.trim())?)
}

/// Encode PNG bytes as a `data:image/png;base64,` URL
pub fn png_data_url(data: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(data))
}
