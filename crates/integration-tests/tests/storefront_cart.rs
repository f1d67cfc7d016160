//! Cart endpoints driven through the full storefront router.
//!
//! Each test carries the `cart` cookie from one response into the next
//! request the way a browser would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{StatusCode, header};

use marketsquare_core::Cart;
use marketsquare_integration_tests::{TestResponse, sample_catalog, send, test_app};
use marketsquare_storefront::catalog::Catalog;

async fn add(app: &axum::Router, cookie: Option<&str>, form: &str) -> TestResponse {
    send(app, "POST", "/cart/add", cookie, Some(form)).await.unwrap()
}

#[tokio::test]
async fn test_empty_cart_without_cookie() {
    let app = test_app(sample_catalog()).unwrap();

    let response = send(&app, "GET", "/cart", None, None).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.cart_cookie().is_none(), "reads must not set the cookie");

    let body = response.json().unwrap();
    assert_eq!(body["items"], serde_json::json!([]));
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn test_add_then_read_back_through_cookie() {
    let app = test_app(sample_catalog()).unwrap();

    let added = add(&app, None, "product_id=p-kettle&quantity=2").await;
    assert_eq!(added.status, StatusCode::OK);
    let cookie = added.cart_cookie().unwrap();

    let body = added.json().unwrap();
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["items"][0]["title"], "Çelik Kettle");
    assert_eq!(body["items"][0]["price"], "₺899.00");

    let shown = send(&app, "GET", "/cart", Some(&cookie), None).await.unwrap();
    let body = shown.json().unwrap();
    assert_eq!(body["items"][0]["product_id"], "p-kettle");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["from_cache"], false);

    let count = send(&app, "GET", "/cart/count", Some(&cookie), None).await.unwrap();
    assert_eq!(count.json().unwrap()["count"], 2);
}

#[tokio::test]
async fn test_adding_same_product_merges_lines() {
    let app = test_app(sample_catalog()).unwrap();

    let first = add(&app, None, "product_id=p-kettle").await;
    let cookie = first.cart_cookie().unwrap();
    let second = add(&app, Some(&cookie), "product_id=p-kettle&quantity=3").await;

    let body = second.json().unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_non_positive_add_quantity_counts_as_one() {
    let app = test_app(sample_catalog()).unwrap();

    let response = add(&app, None, "product_id=p-grinder&quantity=-5").await;
    let body = response.json().unwrap();
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["items"][0]["price"], "€45.00");
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let app = test_app(sample_catalog()).unwrap();

    let cookie = add(&app, None, "product_id=p-kettle").await.cart_cookie().unwrap();
    let cookie = add(&app, Some(&cookie), "product_id=p-grinder")
        .await
        .cart_cookie()
        .unwrap();

    let updated = send(
        &app,
        "POST",
        "/cart/update",
        Some(&cookie),
        Some("product_id=p-kettle&quantity=0"),
    )
    .await
    .unwrap();

    let body = updated.json().unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["product_id"], "p-grinder");
}

#[tokio::test]
async fn test_remove_unknown_product_keeps_cart() {
    let app = test_app(sample_catalog()).unwrap();

    let cookie = add(&app, None, "product_id=p-kettle&quantity=2")
        .await
        .cart_cookie()
        .unwrap();
    let removed = send(
        &app,
        "POST",
        "/cart/remove",
        Some(&cookie),
        Some("product_id=p-missing"),
    )
    .await
    .unwrap();

    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.json().unwrap()["item_count"], 2);
}

#[tokio::test]
async fn test_missing_product_id_is_bad_request() {
    let app = test_app(sample_catalog()).unwrap();

    let response = add(&app, None, "product_id=").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.cart_cookie().is_none());
}

#[tokio::test]
async fn test_malformed_cookie_reads_as_empty_cart() {
    let app = test_app(sample_catalog()).unwrap();

    let response = send(&app, "GET", "/cart", Some("cart=%7Bnot-json"), None)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().unwrap()["item_count"], 0);

    // Writing over a malformed cookie starts a fresh cart
    let added = add(&app, Some("cart=%7Bnot-json"), "product_id=p-kettle").await;
    assert_eq!(added.json().unwrap()["item_count"], 1);
}

#[tokio::test]
async fn test_cookie_written_by_client_is_normalized() {
    let app = test_app(sample_catalog()).unwrap();

    let raw = r#"{"items":[{"productId":"p-kettle","qty":1},{"productId":"p-kettle","qty":2},{"productId":"p-grinder","qty":0}]}"#;
    let cookie = format!("cart={}", urlencoding::encode(raw));

    let response = send(&app, "GET", "/cart", Some(&cookie), None).await.unwrap();
    let body = response.json().unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_cached_snapshot_used_when_catalog_is_gone() {
    let with_catalog = test_app(sample_catalog()).unwrap();
    let cookie = add(&with_catalog, None, "product_id=p-kettle")
        .await
        .cart_cookie()
        .unwrap();

    let without_catalog = test_app(Catalog::default()).unwrap();
    let response = send(&without_catalog, "GET", "/cart", Some(&cookie), None)
        .await
        .unwrap();

    let body = response.json().unwrap();
    assert_eq!(body["items"][0]["title"], "Çelik Kettle");
    assert_eq!(body["items"][0]["from_cache"], true);
}

#[tokio::test]
async fn test_cookie_value_is_cart_document() {
    let app = test_app(sample_catalog()).unwrap();

    let response = add(&app, None, "product_id=p-grinder&quantity=2").await;
    let cookie = response.cart_cookie().unwrap();
    let encoded = cookie.strip_prefix("cart=").unwrap();

    let decoded = urlencoding::decode(encoded).unwrap();
    let cart = Cart::decode(&decoded);
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.get("p-grinder").unwrap().qty, 2);

    let set_cookie = response.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(!set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));
}

#[tokio::test]
async fn test_cart_that_cannot_fit_a_cookie_is_rejected() {
    let app = test_app(sample_catalog()).unwrap();

    let big = (0..120).fold(Cart::new(), |cart, i| {
        cart.add_item(format!("urun-{i:0>19}"), 1, None)
    });
    let cookie = format!("cart={}", urlencoding::encode(&big.encode().unwrap()));

    let response = add(&app, Some(&cookie), "product_id=p-kettle").await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.cart_cookie().is_none());
}

#[tokio::test]
async fn test_remove_requires_product_id() {
    let app = test_app(sample_catalog()).unwrap();

    let response = send(&app, "POST", "/cart/remove", None, Some("product_id=%20"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.cart_cookie().is_none());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app(sample_catalog()).unwrap();

    let response = send(&app, "GET", "/cart/count", None, None).await.unwrap();
    assert!(response.headers.contains_key("x-request-id"));
}
