//! The cart's session boundary.
//!
//! The cart is stored as one serialized document in one session slot. The
//! slot itself (a cookie, a test double) is handed in by the caller, so these
//! two functions are the only places cart state crosses into storage.
//!
//! Writes replace the stored document in full. Two concurrent mutations
//! against the same slot race and the last write wins.

use super::{Cart, CartError};

/// Name of the session slot holding the cart.
pub const CART_SLOT_KEY: &str = "cart";

/// A single session-scoped key-value slot.
pub trait CartSlot {
    /// The raw stored value, if any.
    fn get_raw(&self) -> Option<&str>;

    /// Replace the stored value.
    fn set_raw(&mut self, raw: String);
}

/// Read the cart from `slot`.
///
/// Missing or malformed data yields an empty cart.
#[must_use]
pub fn read_cart(slot: &impl CartSlot) -> Cart {
    slot.get_raw().map_or_else(Cart::new, Cart::decode)
}

/// Serialize `cart` into `slot`, replacing whatever was there.
///
/// # Errors
///
/// Returns an error if the cart cannot be serialized.
pub fn write_cart(slot: &mut impl CartSlot, cart: &Cart) -> Result<(), CartError> {
    slot.set_raw(cart.encode()?);
    Ok(())
}

/// In-process slot, for tests and tooling.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartSlot {
    raw: Option<String>,
}

impl MemoryCartSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: None }
    }

    /// A slot pre-filled with `raw`.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }
}

impl CartSlot for MemoryCartSlot {
    fn get_raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    fn set_raw(&mut self, raw: String) {
        self.raw = Some(raw);
    }
}
