//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! The cart's session slot is a cookie read and written per handler through
//! the [`CookieCartSlot`] extractor rather than a layer.

pub mod request_id;
pub mod session;

pub use request_id::request_id_middleware;
pub use session::{CART_COOKIE_NAME, CookieCartSlot, MAX_COOKIE_BYTES};
