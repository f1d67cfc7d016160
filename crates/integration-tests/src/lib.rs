//! Integration tests for Market Square.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketsquare-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart endpoints and the cookie round trip
//! - `storefront_categories` - Category tree and breadcrumb endpoints
//!
//! The helpers below drive the storefront router in-process with
//! `tower::ServiceExt::oneshot`; no server or network is involved.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;

use marketsquare_core::{CategoryId, CategoryRecord, CurrencyCode, ProductSnapshot};
use marketsquare_storefront::catalog::{Catalog, CatalogSnapshot};
use marketsquare_storefront::config::{ConfigError, StorefrontConfig};
use marketsquare_storefront::state::AppState;

/// A response reduced to what the tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// The `cart=...` pair from `Set-Cookie`, ready to send back.
    #[must_use]
    pub fn cart_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with("cart="))
            .map(String::from)
    }
}

/// Storefront configuration for tests (plain http, no Sentry).
///
/// # Errors
///
/// Returns an error if the fixed test configuration fails to load.
pub fn test_config() -> Result<StorefrontConfig, ConfigError> {
    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_BASE_URL" => Some("http://localhost:3000".to_string()),
        _ => None,
    })
}

/// A small catalog with two products and a three-level category tree.
#[must_use]
pub fn sample_catalog() -> Catalog {
    let kettle = ProductSnapshot {
        slug: Some("celik-kettle".to_string()),
        brand: Some("Arzum".to_string()),
        price_minor_units: Some(89_900),
        currency: Some(CurrencyCode::TRY),
        image: Some("https://cdn.example.com/kettle.jpg".to_string()),
        ..ProductSnapshot::new("p-kettle", "Çelik Kettle")
    };
    let grinder = ProductSnapshot {
        price_minor_units: Some(4_500),
        currency: Some(CurrencyCode::EUR),
        ..ProductSnapshot::new("p-grinder", "Coffee Grinder")
    };

    let parent = |id: &str| Some(CategoryId::new(id));
    Catalog::from_snapshot(CatalogSnapshot {
        products: vec![kettle, grinder],
        categories: vec![
            CategoryRecord::new("c-home", "ev", "Ev", None),
            CategoryRecord::new("c-kitchen", "mutfak", "Mutfak", parent("c-home")),
            CategoryRecord::new("c-small", "kucuk-ev-aletleri", "Küçük Ev Aletleri", parent("c-kitchen")),
            CategoryRecord::new("c-sale", "indirim", "İndirim", parent("c-missing")),
            CategoryRecord::new("c-loop", "dongu", "Döngü", parent("c-loop")),
        ],
    })
}

/// Router over `catalog`.
///
/// # Errors
///
/// Returns an error if the test configuration fails to load.
pub fn test_app(catalog: Catalog) -> Result<Router, ConfigError> {
    Ok(marketsquare_storefront::app(AppState::new(test_config()?, catalog)))
}

/// Send one request through `app`.
///
/// # Errors
///
/// Returns an error if the request cannot be built or the body read.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Result<TestResponse, Box<dyn std::error::Error>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match form {
        Some(form) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

    Ok(TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec())?,
    })
}
