//! Pi Network payments
//!
//! Provides:
//! - Payment lookup and creation via the Pi platform API
//! - Revenue split between developer and artist
//!
//! Payments are verified only; nothing is persisted.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::Config;

/// Timeout for Pi platform API calls
pub const PI_TIMEOUT: Duration = Duration::from_secs(10);

/// Amount assumed when a payment record carries none
pub const DEFAULT_AMOUNT: f64 = 0.1;

/// Developer share of each payment
pub const DEVELOPER_SHARE: f64 = 0.2;

/// Pi API errors
#[derive(Debug, Error)]
pub enum PiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Payment record as returned by the Pi API; unknown fields are kept
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Payment {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    pub fn amount(&self) -> f64 {
        self.amount.unwrap_or(DEFAULT_AMOUNT)
    }
}

/// Split of a payment between developer and artist
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueSplit {
    pub developer: f64,
    pub artist: f64,
}

impl RevenueSplit {
    pub fn from_amount(amount: f64) -> Self {
        Self {
            developer: amount * DEVELOPER_SHARE,
            artist: amount * (1.0 - DEVELOPER_SHARE),
        }
    }
}

/// Pi platform client
#[derive(Debug)]
pub struct PiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl PiClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, PiError> {
        Ok(Self {
            client: Client::builder().timeout(PI_TIMEOUT).build()?,
            api_key,
            base_url: base_url.into(),
        })
    }

    /// Create a client from server configuration
    pub fn from_config(config: &Config) -> Result<Self, PiError> {
        Self::new(config.pi_api_url.clone(), config.pi_api_key.clone())
    }

    fn authorization(&self) -> String {
        format!("Key {}", self.api_key.as_deref().unwrap_or_default())
    }

    /// Look up a payment; `None` unless the API answers 200
    pub async fn get_payment(&self, payment_id: &str) -> Result<Option<Payment>, PiError> {
        debug!("Fetching Pi payment {}", payment_id);

        let response = self
            .client
            .get(format!("{}/payments/{}", self.base_url, payment_id))
            .header("Authorization", self.authorization())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            warn!("Pi API returned {} for payment {}", response.status(), payment_id);
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }

    /// Create a payment; `None` unless the API answers 201
    pub async fn create_payment(
        &self,
        payment: &serde_json::Value,
    ) -> Result<Option<serde_json::Value>, PiError> {
        let response = self
            .client
            .post(format!("{}/payments", self.base_url))
            .header("Authorization", self.authorization())
            .json(payment)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            warn!("Pi API returned {} for payment creation", response.status());
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}
