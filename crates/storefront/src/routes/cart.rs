//! Cart route handlers.
//!
//! The cart is read from and written back to the `cart` cookie on every
//! request; there is no server-side cart. Product data shown for each line
//! comes from the catalog snapshot when the product is known there, and from
//! the copy cached in the cart otherwise.

use axum::{Form, Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use marketsquare_core::{Cart, CartItem, CurrencyCode, ProductSnapshot, read_cart};

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::middleware::CookieCartSlot;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    pub product_id: String,
    pub quantity: u32,
    pub title: String,
    pub slug: Option<String>,
    pub brand: Option<String>,
    pub image: Option<String>,
    pub price_minor_units: Option<i64>,
    pub currency: Option<CurrencyCode>,
    /// Formatted unit price, e.g. `₺1299.00`.
    pub price: Option<String>,
    /// True when the catalog did not know the product and the cart's cached
    /// copy (or nothing) was used.
    pub from_cache: bool,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
}

/// Cart count badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl CartView {
    /// Render `cart` against the current catalog.
    #[must_use]
    pub fn build(cart: &Cart, catalog: &Catalog) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::build(item, catalog))
                .collect(),
            item_count: cart.item_count(),
        }
    }
}

impl CartItemView {
    fn build(item: &CartItem, catalog: &Catalog) -> Self {
        let fresh = catalog.product(item.product_id.as_str());
        let snapshot: Option<&ProductSnapshot> = fresh.or(item.product.as_ref());

        Self {
            product_id: item.product_id.to_string(),
            quantity: item.qty,
            title: snapshot.map_or_else(|| item.product_id.to_string(), |p| p.title.clone()),
            slug: snapshot.and_then(|p| p.slug.clone()),
            brand: snapshot.and_then(|p| p.brand.clone()),
            image: snapshot.and_then(|p| p.image.clone()),
            price_minor_units: snapshot.and_then(|p| p.price_minor_units),
            currency: snapshot.and_then(|p| p.currency),
            price: snapshot.and_then(ProductSnapshot::price).map(|m| m.to_string()),
            from_cache: fresh.is_none(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<i64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

fn require_product_id(product_id: &str) -> Result<()> {
    if product_id.trim().is_empty() {
        return Err(AppError::BadRequest("product_id is required".to_string()));
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, slot))]
pub async fn show(State(state): State<AppState>, slot: CookieCartSlot) -> Json<CartView> {
    let cart = read_cart(&slot);
    Json(CartView::build(&cart, state.catalog()))
}

/// Add an item to the cart.
///
/// The catalog's current snapshot is cached on the line so the cart still
/// renders if the catalog later becomes unavailable.
#[instrument(skip(state, slot))]
pub async fn add(
    State(state): State<AppState>,
    mut slot: CookieCartSlot,
    Form(form): Form<AddToCartForm>,
) -> Result<(CookieCartSlot, Json<CartView>)> {
    require_product_id(&form.product_id)?;

    let snapshot = state.catalog().product(&form.product_id).cloned();
    if snapshot.is_none() {
        debug!(product_id = %form.product_id, "Product not in catalog; adding without snapshot");
    }

    let cart = read_cart(&slot).add_item(form.product_id, form.quantity.unwrap_or(1), snapshot);
    slot.store(&cart)?;

    let view = CartView::build(&cart, state.catalog());
    Ok((slot, Json(view)))
}

/// Set an item's quantity. Zero or less removes it.
#[instrument(skip(state, slot))]
pub async fn update(
    State(state): State<AppState>,
    mut slot: CookieCartSlot,
    Form(form): Form<UpdateCartForm>,
) -> Result<(CookieCartSlot, Json<CartView>)> {
    require_product_id(&form.product_id)?;

    let cart = read_cart(&slot).set_qty(&form.product_id, form.quantity);
    slot.store(&cart)?;

    let view = CartView::build(&cart, state.catalog());
    Ok((slot, Json(view)))
}

/// Remove an item from the cart.
#[instrument(skip(state, slot))]
pub async fn remove(
    State(state): State<AppState>,
    mut slot: CookieCartSlot,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<(CookieCartSlot, Json<CartView>)> {
    require_product_id(&form.product_id)?;

    let cart = read_cart(&slot).remove_item(&form.product_id);
    slot.store(&cart)?;

    let view = CartView::build(&cart, state.catalog());
    Ok((slot, Json(view)))
}

/// Cart count badge.
#[instrument(skip(slot))]
pub async fn count(slot: CookieCartSlot) -> Json<CartCount> {
    Json(CartCount {
        count: read_cart(&slot).item_count(),
    })
}
