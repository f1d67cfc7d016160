//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (JSON, state carried in the `cart` cookie)
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Set quantity (0 removes)
//! POST /cart/remove            - Remove item
//! GET  /cart/count             - Cart count badge
//!
//! # Categories
//! GET  /api/categories                     - Category tree
//! GET  /api/categories/{slug}/breadcrumbs  - Root-to-category path
//! ```

pub mod cart;
pub mod categories;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::tree))
        .route("/{slug}/breadcrumbs", get(categories::breadcrumbs))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Cart routes
        .nest("/cart", cart_routes())
        // Category navigation
        .nest("/api/categories", category_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
