//! The client-carried shopping cart.
//!
//! A [`Cart`] is a small value that lives in the visitor's session slot. All
//! mutations are pure: they consume a cart and return the next one, and the
//! caller persists the result with [`write_cart`]. Reading goes through
//! [`read_cart`], which never fails.
//!
//! # Invariants
//!
//! - No two items share a product id
//! - Every `qty` is at least 1
//! - Item order is insertion order
//!
//! Prices on the embedded [`ProductSnapshot`] are carried opaquely in minor
//! units. Nothing here sums, taxes or validates them.

mod session;

pub use session::{CART_SLOT_KEY, CartSlot, MemoryCartSlot, read_cart, write_cart};

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Money, ProductId};

/// Errors that can occur when persisting a [`Cart`].
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The session slot cannot hold the cart even in its compact form.
    #[error("cart is too large to store ({bytes} bytes, limit {limit})")]
    TooLarge { bytes: usize, limit: usize },
}

/// Denormalized copy of the product fields the cart displays.
///
/// Cached on the item so the cart still renders when the catalog is
/// unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_minor_units: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ProductSnapshot {
    /// Snapshot with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: None,
            title: title.into(),
            brand: None,
            price_minor_units: None,
            currency: None,
            image: None,
        }
    }

    /// Unit price, when both amount and currency are known.
    #[must_use]
    pub fn price(&self) -> Option<Money> {
        Some(Money::new(self.price_minor_units?, self.currency?))
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub qty: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
}

/// The cart aggregate.
///
/// Deserialization is lenient about content: lines with a non-positive
/// quantity are dropped and repeated product ids are merged, so a cart read
/// back from the client always satisfies the invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireCart")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The item for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.product_id.as_str() == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty)).sum()
    }

    /// Add `qty` of a product.
    ///
    /// An existing line is incremented and its snapshot refreshed when one is
    /// given; otherwise a new line is appended. `qty` below 1 is clamped to 1.
    #[must_use]
    pub fn add_item(
        mut self,
        product_id: impl Into<ProductId>,
        qty: i64,
        snapshot: Option<ProductSnapshot>,
    ) -> Self {
        let product_id = product_id.into();
        let qty = clamp_qty(qty);

        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => {
                item.qty = item.qty.saturating_add(qty);
                if snapshot.is_some() {
                    item.product = snapshot;
                }
            }
            None => self.items.push(CartItem {
                product_id,
                qty,
                product: snapshot,
            }),
        }

        self
    }

    /// Remove a product's line. Absent products are ignored.
    #[must_use]
    pub fn remove_item(mut self, product_id: &str) -> Self {
        self.items
            .retain(|item| item.product_id.as_str() != product_id);
        self
    }

    /// Set a line's quantity exactly; `qty <= 0` removes the line.
    ///
    /// Absent products are ignored rather than added, since there is no
    /// snapshot to attach.
    #[must_use]
    pub fn set_qty(mut self, product_id: &str, qty: i64) -> Self {
        if qty <= 0 {
            return self.remove_item(product_id);
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id.as_str() == product_id)
        {
            item.qty = clamp_qty(qty);
        }

        self
    }

    /// The same cart with every cached snapshot dropped.
    ///
    /// Used when the full form does not fit the session slot.
    #[must_use]
    pub fn without_snapshots(mut self) -> Self {
        for item in &mut self.items {
            item.product = None;
        }
        self
    }

    /// Parse the session representation, falling back to an empty cart.
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Discarding malformed cart data");
            Self::new()
        })
    }

    /// Serialize to the session representation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String, CartError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn clamp_qty(qty: i64) -> u32 {
    u32::try_from(qty.max(1)).unwrap_or(u32::MAX)
}

/// Wire form accepted from the session slot before invariants are applied.
#[derive(Deserialize)]
struct WireCart {
    #[serde(default)]
    items: Vec<WireItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    product_id: ProductId,
    qty: i64,
    #[serde(default)]
    product: Option<ProductSnapshot>,
}

impl From<WireCart> for Cart {
    fn from(wire: WireCart) -> Self {
        wire.items
            .into_iter()
            .filter(|item| item.qty > 0)
            .fold(Self::new(), |cart, item| {
                cart.add_item(item.product_id, item.qty, item.product)
            })
    }
}
