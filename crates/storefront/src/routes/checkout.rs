//! Checkout route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::checkout::{ContinueShopping, Receipt};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

/// Check out the current cart and return the receipt.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Json<Receipt>> {
    let mut session = state.session().lock().await;
    let receipt = session.checkout()?.clone();
    let receipt_id = receipt.id.to_string();
    add_breadcrumb(
        "checkout",
        "Checkout completed",
        Some(&[("receipt_id", receipt_id.as_str())]),
    );
    Ok(Json(receipt))
}

/// Show the current receipt.
#[instrument(skip(state))]
pub async fn receipt(State(state): State<AppState>) -> Result<Json<Receipt>> {
    let session = state.session().lock().await;
    session
        .receipt()
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("receipt".to_string()))
}

/// Dismiss the receipt, clear the cart and reset the coupon.
///
/// The response carries the route to go back to and the delay to wait
/// before navigating.
#[instrument(skip(state))]
pub async fn continue_shopping(State(state): State<AppState>) -> Result<Json<ContinueShopping>> {
    let mut session = state.session().lock().await;
    Ok(Json(session.continue_shopping()?))
}
