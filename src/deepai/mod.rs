//! DeepAI text-to-image integration
//!
//! Provides:
//! - `text2img` generation requests (form-encoded prompt, `api-key` header)
//! - Download of the generated output, which must decode as an image
//!
//! Every call is bounded by the configured timeout and never retried.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Errors from the DeepAI API
#[derive(Debug, Error)]
pub enum DeepAiError {
    #[error("DeepAI API key not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(StatusCode),

    #[error("response did not include an output_url")]
    MissingOutput,

    #[error("generated image was empty")]
    EmptyImage,

    #[error("generated output is not an image: {0}")]
    InvalidImage(image::ImageError),
}

/// text2img response; only the output location is read
#[derive(Debug, Deserialize)]
struct Text2ImgResponse {
    #[serde(default)]
    output_url: Option<String>,
}

/// DeepAI client
#[derive(Debug)]
pub struct DeepAiClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: Option<String>,
    /// text2img endpoint
    api_url: String,
}

impl DeepAiClient {
    /// Create a client for `api_url` with a per-request timeout
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DeepAiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.is_empty()),
            api_url: api_url.into(),
        })
    }

    /// Create a client from server configuration
    pub fn from_config(config: &Config) -> Result<Self, DeepAiError> {
        Self::new(
            config.ai_api_url.clone(),
            config.ai_api_key.clone(),
            Duration::from_secs(config.ai_timeout_secs),
        )
    }

    /// Check if API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request an image for `prompt`, returning the URL of the output
    pub async fn text2img(&self, prompt: &str) -> Result<String, DeepAiError> {
        let api_key = self.api_key.as_ref().ok_or(DeepAiError::NotConfigured)?;

        debug!("Sending text2img request to DeepAI");

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", api_key)
            .form(&[("text", prompt)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("DeepAI API error: {} - {}", status, body);
            return Err(DeepAiError::Status(status));
        }

        let parsed: Text2ImgResponse = response.json().await?;

        parsed
            .output_url
            .filter(|url| !url.is_empty())
            .ok_or(DeepAiError::MissingOutput)
    }

    /// Download generated image bytes; bodies that do not decode are rejected
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, DeepAiError> {
        debug!("Downloading generated image from: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DeepAiError::Status(response.status()));
        }

        let data = response.bytes().await?;
        if data.is_empty() {
            return Err(DeepAiError::EmptyImage);
        }
        image::load_from_memory(&data).map_err(DeepAiError::InvalidImage)?;

        Ok(data.to_vec())
    }
}
