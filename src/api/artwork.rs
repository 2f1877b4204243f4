//! Artwork endpoints
//!
//! POST /generate_ai     - AI line art from a prompt, as a data URL
//! POST /upload_artwork  - convert an uploaded sketch to line art
//! POST /save_artwork    - store a colored artwork sent as a data URL

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{error_response, AppState};
use crate::images::{decode_data_url, lineart, png_data_url, StoreError, DEFAULT_SIZE, MAX_SIZE};

/// Prompt used when the request carries none
const DEFAULT_PROMPT: &str = "mandala line art";

/// Build the artwork router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_ai", post(generate_ai))
        .route("/upload_artwork", post(upload_artwork))
        .route("/save_artwork", post(save_artwork))
}

/// Generation request
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub image: String,
}

/// Generate a pattern; falls back to a blank canvas when the AI is unavailable
async fn generate_ai(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let prompt = req.prompt.as_deref().unwrap_or(DEFAULT_PROMPT).trim();
    if prompt.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }

    let width = req.width.unwrap_or(DEFAULT_SIZE);
    let height = req.height.unwrap_or(DEFAULT_SIZE);
    if !(1..=MAX_SIZE).contains(&width) || !(1..=MAX_SIZE).contains(&height) {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Image size must be between 1 and {}", MAX_SIZE),
        );
    }

    let data = state.generator.generate(prompt, width, height).await;

    Json(GenerateResponse {
        image: png_data_url(&data),
    })
    .into_response()
}

#[derive(Debug, Serialize)]
pub struct StoredResponse {
    pub status: &'static str,
    pub url: String,
}

/// Upload a sketch (multipart field `file`) and convert it to line art
async fn upload_artwork(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) => upload = Some((filename, data)),
                    Err(e) => return error_response(e.status(), e.body_text()),
                }
                break;
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => return error_response(e.status(), e.body_text()),
        }
    }

    let Some((filename, data)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file part");
    };
    if filename.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file");
    }

    let raw = match state.artworks.save_upload(&filename, &data).await {
        Ok(stored) => stored,
        Err(StoreError::InvalidFilename) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid filename");
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let converted = tokio::task::spawn_blocking(move || lineart::convert_bytes(&data)).await;
    let line_art = match converted {
        Ok(Ok(img)) => img,
        Ok(Err(e)) => {
            warn!("Line art conversion error for {}: {}", filename, e);
            state.artworks.discard(&raw).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Image processing failed");
        }
        Err(e) => {
            warn!("Line art conversion task failed for {}: {}", filename, e);
            state.artworks.discard(&raw).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Image processing failed");
        }
    };

    match state.artworks.save_line_art(line_art).await {
        Ok(stored) => {
            info!("Converted {} to line art at {}", filename, stored.url);
            Json(StoredResponse {
                status: "success",
                url: stored.url,
            })
            .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Save request carrying a `data:` URL
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub image: String,
}

/// Store a colored artwork
async fn save_artwork(State(state): State<AppState>, Json(req): Json<SaveRequest>) -> Response {
    if !req.image.contains(',') {
        return error_response(StatusCode::BAD_REQUEST, "Invalid image data");
    }

    let result = match decode_data_url(&req.image) {
        Ok(data) => state.artworks.save_artwork(&data).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(stored) => Json(StoredResponse {
            status: "success",
            url: stored.url,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
