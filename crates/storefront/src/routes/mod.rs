//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Readiness (catalog loaded)
//!
//! # Catalog
//! GET    /api/products                    - Catalog status and products
//!
//! # Cart
//! GET    /api/cart                        - Cart, totals, coupon state
//! POST   /api/cart/items                  - Add to cart ({"product_id": n})
//! DELETE /api/cart/items/{id}             - Remove line item
//! POST   /api/cart/items/{id}/increase    - Increase quantity
//! POST   /api/cart/items/{id}/decrease    - Decrease quantity (removes at 1)
//! POST   /api/cart/coupon                 - Apply coupon ({"code": "..."})
//!
//! # Checkout
//! POST   /api/checkout                    - Check out, returns receipt
//! GET    /api/checkout/receipt            - Current receipt
//! POST   /api/checkout/continue           - Clear cart and go back to catalog
//! ```

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod extract;
pub mod products;

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    routing::{get, post},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::catalog::CatalogStatus;
use crate::error::panic_response;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/items/{id}", axum::routing::delete(cart::remove))
        .route("/items/{id}/increase", post(cart::increase))
        .route("/items/{id}/decrease", post(cart::decrease))
        .route("/coupon", post(coupon::apply))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::checkout))
        .route("/receipt", get(checkout::receipt))
        .route("/continue", post(checkout::continue_shopping))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index))
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}

/// Build the full application: health checks, API routes, panic recovery,
/// request IDs and request tracing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable until the catalog has loaded.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().read().await.status() {
        CatalogStatus::Ready => StatusCode::OK,
        CatalogStatus::Loading | CatalogStatus::Failed => StatusCode::SERVICE_UNAVAILABLE,
    }
}
