//! AI pattern generation
//!
//! Cache lookup, then one DeepAI round trip (generate + download). Any
//! failure degrades to a blank white canvas of the requested size; only
//! remote results are cached.

use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};
use tracing::{debug, error, info, warn};

use super::cache::{CacheKey, PatternCache};
use super::encode_png;
use crate::deepai::{DeepAiClient, DeepAiError};

/// Default edge length of generated patterns
pub const DEFAULT_SIZE: u32 = 512;

/// Largest edge length accepted by the HTTP endpoint
pub const MAX_SIZE: u32 = 2048;

/// Generates coloring patterns from text prompts
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    client: Arc<DeepAiClient>,
    cache: Arc<PatternCache>,
}

impl PatternGenerator {
    /// Create a generator backed by `client` and sharing `cache`
    pub fn new(client: Arc<DeepAiClient>, cache: Arc<PatternCache>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Generate PNG bytes for `prompt`
    ///
    /// Never fails: without a usable remote result the blank canvas of
    /// exactly `width`x`height` is returned.
    pub async fn generate(&self, prompt: &str, width: u32, height: u32) -> Vec<u8> {
        let key = CacheKey::new(prompt, width, height);

        if let Some(data) = self.cache.get(&key).await {
            debug!("Pattern cache hit for {}", key);
            return data;
        }

        match self.generate_remote(prompt).await {
            Ok(data) => {
                info!("Generated pattern for {} ({} bytes)", key, data.len());
                self.cache.insert(key, data.clone()).await;
                data
            }
            Err(DeepAiError::NotConfigured) => {
                debug!("DeepAI not configured, returning blank canvas for {}", key);
                blank_canvas(width, height)
            }
            Err(e) => {
                warn!("AI generation failed for {}: {}", key, e);
                blank_canvas(width, height)
            }
        }
    }

    async fn generate_remote(&self, prompt: &str) -> Result<Vec<u8>, DeepAiError> {
        let output_url = self.client.text2img(prompt).await?;
        self.client.fetch_image(&output_url).await
    }
}

/// Solid white RGB canvas encoded as PNG
pub fn blank_canvas(width: u32, height: u32) -> Vec<u8> {
    let canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    match encode_png(&DynamicImage::ImageRgb8(canvas)) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to encode {}x{} blank canvas: {}", width, height, e);
            Vec::new()
        }
    }
}
