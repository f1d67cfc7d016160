//! Command implementations for `ms-cli`.

pub mod categories;
pub mod stock_code;
