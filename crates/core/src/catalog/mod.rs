//! Catalog-side domain logic.
//!
//! - [`stock_code`] - Deterministic stock codes generated at product creation
//! - [`category`] - Flat category records to a nested forest
//! - [`forest`] - Read-only navigation over a built forest

pub mod category;
pub mod forest;
pub mod stock_code;

pub use category::{
    BuildReport, CategoryNode, CategoryRecord, build_category_tree,
    build_category_tree_with_report,
};
pub use forest::{CategoryForest, DepthFirst, MAX_SERIALIZED_DEPTH};
pub use stock_code::{STOCK_CODE_LEN, StockCode, StockCodeError, generate_stock_code};
