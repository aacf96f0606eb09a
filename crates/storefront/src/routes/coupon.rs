//! Coupon route handler.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::routes::cart::CartView;
use crate::routes::extract::ApiJson;
use crate::state::AppState;

/// Apply coupon request body.
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Apply a coupon to the session.
///
/// Failures answer with the coupon error message; the message is also kept
/// on the session and shown in the next cart view.
#[instrument(skip(state))]
pub async fn apply(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ApplyCouponRequest>,
) -> Result<Json<CartView>> {
    let mut session = state.session().lock().await;
    session.apply_coupon(&req.code)?;
    info!("Coupon applied");
    Ok(Json(CartView::from(&*session)))
}
