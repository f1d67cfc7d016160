//! Market Square Core - catalog and cart domain logic.
//!
//! This crate holds the parts of the storefront that carry real invariants:
//! - `storefront` - Public-facing shop serving the cart and category navigation
//! - `cli` - Catalog-management commands (stock codes, tree exports)
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no HTTP, no file
//! access, no database. The one side effect it models, the cart's session
//! slot, is reached through the [`cart::CartSlot`] trait so callers decide
//! where the bytes live.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and money in minor units
//! - [`catalog`] - Stock code generation and the category tree builder
//! - [`cart`] - The client-carried cart aggregate and its session boundary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{
    CART_SLOT_KEY, Cart, CartError, CartItem, CartSlot, MemoryCartSlot, ProductSnapshot, read_cart,
    write_cart,
};
pub use catalog::{
    BuildReport, CategoryForest, CategoryNode, CategoryRecord, MAX_SERIALIZED_DEPTH, StockCode,
    StockCodeError, build_category_tree, build_category_tree_with_report, generate_stock_code,
};
pub use types::*;
