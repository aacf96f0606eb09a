//! Cart route handlers.
//!
//! Every handler answers with the full [`CartView`] so the client can
//! re-render the cart and its totals from one response. Changes answer 409
//! while a receipt is shown.

use axum::{Json, extract::State};
use powerlabs_core::{CartLineItem, Money, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart_store::MutationOutcome;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::extract::{ApiJson, ApiPath};
use crate::session::ShopSession;
use crate::state::AppState;

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: Money,
    pub line_total: Money,
    pub price_display: String,
    pub line_total_display: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        let line_total = item.line_total();
        Self {
            id: item.id(),
            name: item.product.name.clone(),
            image: item.product.display_image().to_string(),
            quantity: item.quantity,
            price: item.product.price,
            line_total,
            price_display: item.product.price.display(),
            line_total_display: line_total.display(),
        }
    }
}

/// Coupon display data.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub applied: bool,
    pub error: Option<String>,
    pub discount_label: Option<&'static str>,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Number of distinct line items, shown on the cart badge.
    pub line_count: usize,
    /// Sum of all quantities.
    pub item_count: u64,
    pub subtotal: Money,
    pub discount: Option<Money>,
    pub total: Money,
    pub subtotal_display: String,
    pub discount_display: Option<String>,
    pub total_display: String,
    pub coupon: CouponView,
    pub can_checkout: bool,
}

impl From<&ShopSession> for CartView {
    fn from(session: &ShopSession) -> Self {
        let cart = session.cart();
        let totals = session.totals();
        let discount = totals.applied_discount();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            line_count: cart.line_count(),
            item_count: cart.total_quantity(),
            subtotal: totals.subtotal,
            discount,
            total: totals.total,
            subtotal_display: totals.subtotal.display(),
            discount_display: discount.map(|d| format!("-{}", d.display())),
            total_display: totals.total.display(),
            coupon: CouponView {
                applied: session.coupon().is_applied(),
                error: session.coupon().last_error().map(String::from),
                discount_label: totals
                    .coupon_applied
                    .then_some(powerlabs_core::DISCOUNT_LABEL),
            },
            can_checkout: session.can_checkout(),
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Show the cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    let session = state.session().lock().await;
    Json(CartView::from(&*session))
}

/// Add one unit of a catalog product.
///
/// Answers 503 until the catalog is ready and 404 for unknown products.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = {
        let catalog = state.catalog().read().await;
        let Some(catalog) = catalog.catalog() else {
            return Err(AppError::CatalogUnavailable(format!(
                "catalog is {:?}",
                catalog.status()
            )));
        };
        catalog
            .find(req.product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?
    };

    let mut session = state.session().lock().await;
    let outcome = session.add_to_cart(&product)?;
    if outcome == MutationOutcome::Applied {
        let product_id = product.id.to_string();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product_id.as_str())]),
        );
    }
    Ok(Json(CartView::from(&*session)))
}

/// Remove a line item. Unknown ids leave the cart unchanged.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<CartView>> {
    let mut session = state.session().lock().await;
    session.remove_from_cart(id)?;
    Ok(Json(CartView::from(&*session)))
}

/// Increase a line item's quantity by one.
#[instrument(skip(state))]
pub async fn increase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<CartView>> {
    let mut session = state.session().lock().await;
    session.increase_quantity(id)?;
    Ok(Json(CartView::from(&*session)))
}

/// Decrease a line item's quantity by one, removing it at quantity 1.
#[instrument(skip(state))]
pub async fn decrease(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<CartView>> {
    let mut session = state.session().lock().await;
    session.decrease_quantity(id)?;
    Ok(Json(CartView::from(&*session)))
}
