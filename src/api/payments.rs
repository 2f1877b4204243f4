//! Payment verification endpoint
//!
//! POST /verify_payment - check a Pi transaction and report the revenue split

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{error_response, AppState};
use crate::pi::RevenueSplit;

/// Build the payments router
pub fn router() -> Router<AppState> {
    Router::new().route("/verify_payment", post(verify_payment))
}

/// Verification request
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub txid: Option<String>,
}

/// Verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub split: RevenueSplit,
}

/// Verify a completed payment
async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    let Some(txid) = req.txid.filter(|t| !t.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Transaction ID is required");
    };

    match state.pi.get_payment(&txid).await {
        Ok(Some(payment)) if payment.is_completed() => {
            let amount = payment.amount();
            info!("Verified payment: {}, Amount: {} PI", txid, amount);
            Json(VerifyResponse {
                status: "verified",
                split: RevenueSplit::from_amount(amount),
            })
            .into_response()
        }
        Ok(_) => error_response(StatusCode::NOT_FOUND, "Payment not found or incomplete"),
        Err(e) => {
            warn!("Payment verification failed for {}: {}", txid, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
