//! Integration test support for the PowerLabs shop.
//!
//! Tests drive the real axum router in-process with
//! `tower::ServiceExt::oneshot`; each [`TestShop`] gets its own temporary
//! catalog file and snapshot directory.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p powerlabs-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use powerlabs_core::Cart;
use powerlabs_storefront::config::ShopConfig;
use powerlabs_storefront::persistence::{
    CART_STORAGE_KEY, FileSnapshotStore, SnapshotStore, decode_snapshot,
};
use powerlabs_storefront::routes;
use powerlabs_storefront::state::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Catalog used by every test shop.
pub const TEST_CATALOG: &str = r#"[
    {"id": 1, "name": "Wireless Charger", "price": 10, "imgUrl": "/images/charger.jpg"},
    {"id": 2, "name": "Power Bank", "price": 25.5, "imgUrl": ""},
    {"id": 3, "name": "Cable", "price": 100}
]"#;

/// An isolated shop: app state plus the directories backing it.
pub struct TestShop {
    pub state: AppState,
    dir: TempDir,
}

impl TestShop {
    /// A shop whose catalog has finished loading.
    pub async fn ready() -> Self {
        let shop = Self::loading();
        shop.state.load_catalog().await;
        shop
    }

    /// A shop whose catalog has not been loaded yet.
    #[must_use]
    pub fn loading() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products.json"), TEST_CATALOG).unwrap();
        let state = AppState::new(Self::config_for(dir.path()));
        Self { state, dir }
    }

    /// Start a fresh process over the same snapshot directory.
    pub async fn restart(self) -> Self {
        let state = AppState::new(Self::config_for(self.dir.path()));
        state.load_catalog().await;
        Self {
            state,
            dir: self.dir,
        }
    }

    fn config_for(root: &Path) -> ShopConfig {
        let mut config = ShopConfig::local(root.join("products.json"), root.join("data"));
        config.continue_delay = std::time::Duration::ZERO;
        config
    }

    /// Directory holding the cart snapshot.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// The cart as currently written to disk.
    #[must_use]
    pub fn persisted_cart(&self) -> Option<Cart> {
        let store = FileSnapshotStore::new(self.data_dir());
        store
            .load(CART_STORAGE_KEY)
            .unwrap()
            .map(|data| decode_snapshot(&data).unwrap())
    }

    /// A router over this shop's state.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }

    /// Send one request and decode the JSON response body.
    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    /// `POST uri` with an optional JSON body.
    pub async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(Method::POST, uri, body).await
    }

    /// `DELETE uri`.
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, None).await
    }

    /// Add `product_id` to the cart, asserting success.
    pub async fn add(&self, product_id: i64) -> Value {
        let (status, cart) = self
            .post(
                "/api/cart/items",
                Some(serde_json::json!({ "product_id": product_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "add {product_id}: {cart}");
        cart
    }
}
