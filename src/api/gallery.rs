//! Gallery pages
//!
//! GET /                                  - categories and the daily image
//! GET /coloring/{category}/{image}       - a single image to color
//! GET /.well-known/pi-validation.txt     - Pi app validation key
//! GET /favicon.ico

use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeFile;

use super::AppState;
use crate::gallery::{daily_image, line_art_url, secure_filename, Categories};
use crate::Config;

/// Build the gallery router
pub fn router(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get(gallery))
        .route("/coloring/{category}/{image_name}", get(coloring))
        .route_service(
            "/.well-known/pi-validation.txt",
            ServeFile::new(static_dir.join("validation-key.txt")),
        )
        .route_service(
            "/favicon.ico",
            ServeFile::new(static_dir.join("images").join("logo.png")),
        )
}

/// Settings every page needs for music and Pi payments
#[derive(Debug, Serialize)]
struct PageConfig {
    music_files: Vec<String>,
    pi_app_id: String,
    pi_wallet_address: Option<String>,
    sandbox: bool,
}

impl PageConfig {
    fn from_config(config: &Config) -> Self {
        Self {
            music_files: config.music_files.clone(),
            pi_app_id: config.pi_app_id.clone(),
            pi_wallet_address: config.pi_app_wallet_address.clone(),
            sandbox: config.pi_sandbox,
        }
    }
}

#[derive(Debug, Serialize)]
struct GalleryResponse {
    categories: Categories,
    daily_image: String,
    daily_category: String,
    daily_filename: String,
    #[serde(flatten)]
    page: PageConfig,
}

/// Gallery index
async fn gallery(State(state): State<AppState>) -> impl IntoResponse {
    let categories = state.categories().await;
    let daily = daily_image(&categories, chrono::Utc::now().date_naive());

    Json(GalleryResponse {
        daily_image: daily.url(),
        daily_category: daily.category,
        daily_filename: daily.filename,
        categories,
        page: PageConfig::from_config(&state.config),
    })
}

#[derive(Debug, Serialize)]
struct ColoringResponse {
    image_url: String,
    #[serde(flatten)]
    page: PageConfig,
}

/// Coloring page; unknown images redirect to the gallery
async fn coloring(
    UrlPath((category, image_name)): UrlPath<(String, String)>,
    State(state): State<AppState>,
) -> Response {
    let category = secure_filename(&category);
    let image_name = secure_filename(&image_name);
    if category.is_empty() || image_name.is_empty() {
        return Redirect::to("/").into_response();
    }

    let path = state.config.line_art_dir().join(&category).join(&image_name);
    let exists = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !exists {
        return Redirect::to("/").into_response();
    }

    Json(ColoringResponse {
        image_url: line_art_url(&category, &image_name),
        page: PageConfig::from_config(&state.config),
    })
    .into_response()
}
