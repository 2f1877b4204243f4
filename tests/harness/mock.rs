//! Mock third-party APIs
//!
//! One axum server answers both DeepAI (`/text2img`, `/output.png`) and
//! Pi Network (`/v2/payments/{id}`) requests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use tokio::net::TcpListener;

/// API key the mock DeepAI endpoint accepts
pub const DEEPAI_KEY: &str = "test-deepai-key";

/// API key the mock Pi endpoint accepts
pub const PI_KEY: &str = "test-pi-key";

#[derive(Clone)]
struct MockState {
    addr: SocketAddr,
    text2img_hits: Arc<AtomicUsize>,
}

/// Running mock services
pub struct MockServices {
    pub addr: SocketAddr,
    text2img_hits: Arc<AtomicUsize>,
}

impl MockServices {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let text2img_hits = Arc::new(AtomicUsize::new(0));

        let state = MockState {
            addr,
            text2img_hits: text2img_hits.clone(),
        };

        let app = Router::new()
            .route("/text2img", post(text2img))
            .route("/output.png", get(output))
            .route("/v2/payments/{id}", get(payment))
            .with_state(state);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            text2img_hits,
        })
    }

    pub fn text2img_url(&self) -> String {
        format!("http://{}/text2img", self.addr)
    }

    pub fn pi_url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// Number of generation requests received
    pub fn text2img_hits(&self) -> usize {
        self.text2img_hits.load(Ordering::SeqCst)
    }

    /// Image served as every generation result
    pub fn output_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(16, 16, Rgb([20, 40, 200]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .expect("encode mock output");
        buffer.into_inner()
    }
}

async fn text2img(
    State(state): State<MockState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.text2img_hits.fetch_add(1, Ordering::SeqCst);

    if headers.get("api-key").and_then(|v| v.to_str().ok()) != Some(DEEPAI_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"err": "invalid key"})));
    }
    if form.get("text").map_or(true, |t| t.is_empty()) {
        return (StatusCode::BAD_REQUEST, Json(json!({"err": "text required"})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "mock",
            "output_url": format!("http://{}/output.png", state.addr),
        })),
    )
}

async fn output() -> Vec<u8> {
    MockServices::output_png()
}

async fn payment(
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    let expected = format!("Key {}", PI_KEY);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }

    match id.as_str() {
        "completed-tx" => (
            StatusCode::OK,
            Json(json!({"identifier": id, "status": "completed", "amount": 5.0})),
        ),
        "no-amount-tx" => (
            StatusCode::OK,
            Json(json!({"identifier": id, "status": "completed"})),
        ),
        "pending-tx" => (
            StatusCode::OK,
            Json(json!({"identifier": id, "status": "pending", "amount": 1.0})),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "payment_not_found"})),
        ),
    }
}
