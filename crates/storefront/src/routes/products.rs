//! Product listing route handlers.

use axum::{Json, extract::State};
use powerlabs_core::{Money, Product, ProductId};
use serde::Serialize;
use tracing::instrument;

use crate::catalog::{CatalogState, CatalogStatus};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub price_display: String,
    pub image: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            price_display: product.price.display(),
            image: product.display_image().to_string(),
        }
    }
}

/// Catalog listing with its load status.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListView {
    pub status: CatalogStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub products: Vec<ProductView>,
}

impl From<&CatalogState> for ProductListView {
    fn from(state: &CatalogState) -> Self {
        Self {
            status: state.status(),
            error: state.error().map(String::from),
            products: state.products().iter().map(ProductView::from).collect(),
        }
    }
}

/// List the catalog.
///
/// While the catalog is loading the list is empty and `status` is
/// `"loading"`; after a failed load it is empty with an `error`.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<ProductListView> {
    let catalog = state.catalog().read().await;
    Json(ProductListView::from(&*catalog))
}
