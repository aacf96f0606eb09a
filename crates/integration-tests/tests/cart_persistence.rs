//! Cart persistence across requests and restarts.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use powerlabs_core::{Money, ProductId};
use powerlabs_integration_tests::TestShop;
use serde_json::json;

#[tokio::test]
async fn test_every_mutation_is_on_disk_before_the_response() {
    let shop = TestShop::ready().await;

    shop.add(1).await;
    let cart = shop.persisted_cart().unwrap();
    assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 1);

    shop.post("/api/cart/items/1/increase", None).await;
    let cart = shop.persisted_cart().unwrap();
    assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 2);

    shop.delete("/api/cart/items/1").await;
    assert!(shop.persisted_cart().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let shop = TestShop::ready().await;
    shop.add(2).await;
    shop.add(1).await;
    shop.add(2).await;

    let shop = shop.restart().await;
    let (status, cart) = shop.get("/api/cart").await;

    assert_eq!(status, StatusCode::OK);
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], 2);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[1]["id"], 1);
    assert_eq!(cart["subtotal_display"], "$61.00");
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty() {
    let shop = TestShop::ready().await;
    shop.add(1).await;
    std::fs::write(shop.data_dir().join("cart-storage.json"), "{\"state\":[").unwrap();

    let shop = shop.restart().await;
    let (_, cart) = shop.get("/api/cart").await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);

    shop.add(3).await;
    let persisted = shop.persisted_cart().unwrap();
    assert_eq!(persisted.total(), Money::from_cents(10_000));
}

#[tokio::test]
async fn test_unknown_line_items_are_ignored() {
    let shop = TestShop::ready().await;
    shop.add(1).await;

    let (status, cart) = shop.post("/api/cart/items/99/decrease", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 1);

    let (status, _) = shop.delete("/api/cart/items/99").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let shop = TestShop::ready().await;
    let (status, body) = shop.post("/api/cart/items/lamp/increase", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));

    let (status, body) = shop.delete("/api/cart/items/lamp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_bodies_are_rejected() {
    let shop = TestShop::ready().await;

    let (status, body) = shop
        .post("/api/cart/items", Some(json!({ "product_id": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));

    let (status, body) = shop.post("/api/cart/coupon", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(shop.persisted_cart().is_none_or(|cart| cart.is_empty()));
}

#[tokio::test]
async fn test_badge_counts_lines_not_units() {
    let shop = TestShop::ready().await;
    shop.add(1).await;
    shop.add(1).await;
    let cart = shop.add(3).await;

    assert_eq!(cart["line_count"], 2);
    assert_eq!(cart["item_count"], 3);
}

#[tokio::test]
async fn test_out_of_range_snapshot_starts_empty() {
    let shop = TestShop::ready().await;
    shop.add(1).await;
    std::fs::write(
        shop.data_dir().join("cart-storage.json"),
        r#"{"state":{"cart":[{"id":1,"name":"Bar","price":50000000000000000000000000000,"imgUrl":"","quantity":2}]},"version":0}"#,
    )
    .unwrap();

    let shop = shop.restart().await;
    let (status, cart) = shop.get("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["line_count"], 0);
    assert_eq!(cart["total_display"], "$0.00");
}
