//! Cookie-backed session slot for the cart.
//!
//! The cart lives in a client-readable cookie so the storefront keeps no
//! server-side cart state. The cookie value is the cart's JSON document,
//! URL-encoded, scoped to `/` with `SameSite=Lax`.
//!
//! [`CookieCartSlot`] is both an extractor (reads the incoming `Cookie`
//! header) and a response part (emits `Set-Cookie` when the cart changed).

use std::borrow::Cow;
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use tower_sessions::cookie::{Cookie, SameSite, time::Duration};
use tracing::warn;

use marketsquare_core::{CART_SLOT_KEY, Cart, CartError, CartSlot, write_cart};

use crate::state::AppState;

/// Cart cookie name.
pub const CART_COOKIE_NAME: &str = CART_SLOT_KEY;

/// Browsers drop cookies larger than this.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Cart cookie lifetime in days.
const CART_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// The cart cookie for one request/response pair.
#[derive(Debug, Clone, Default)]
pub struct CookieCartSlot {
    /// Decoded value received with the request.
    received: Option<String>,
    /// Decoded value to send back, set by [`CartSlot::set_raw`].
    pending: Option<String>,
    secure: bool,
}

impl CookieCartSlot {
    /// Read the cart cookie from request headers.
    ///
    /// A value that fails to URL-decode is treated as absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let received = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == CART_COOKIE_NAME)
            .and_then(|cookie| urlencoding::decode(cookie.value()).ok().map(Cow::into_owned));

        Self {
            received,
            pending: None,
            secure,
        }
    }

    /// Persist `cart`, dropping cached product snapshots if the full form
    /// would not fit in a cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be serialized, or if it does not
    /// fit in a cookie even without snapshots. Nothing is sent in that case,
    /// so the client keeps its previous cart.
    pub fn store(&mut self, cart: &Cart) -> Result<(), CartError> {
        write_cart(self, cart)?;

        if self.cookie_len() > MAX_COOKIE_BYTES {
            warn!(
                items = cart.items().len(),
                bytes = self.cookie_len(),
                "Cart cookie too large; dropping cached product snapshots"
            );
            write_cart(self, &cart.clone().without_snapshots())?;
        }

        let bytes = self.cookie_len();
        if bytes > MAX_COOKIE_BYTES {
            self.pending = None;
            return Err(CartError::TooLarge {
                bytes,
                limit: MAX_COOKIE_BYTES,
            });
        }

        Ok(())
    }

    /// The `Set-Cookie` value for a pending write.
    #[must_use]
    pub fn set_cookie_header(&self) -> Option<HeaderValue> {
        let cookie = self.pending_cookie()?;
        HeaderValue::from_str(&cookie.to_string()).ok()
    }

    fn pending_cookie(&self) -> Option<Cookie<'static>> {
        let raw = self.pending.as_deref()?;
        Some(
            Cookie::build((CART_COOKIE_NAME, urlencoding::encode(raw).into_owned()))
                .path("/")
                .same_site(SameSite::Lax)
                .http_only(false)
                .secure(self.secure)
                .max_age(Duration::days(CART_COOKIE_MAX_AGE_DAYS))
                .build(),
        )
    }

    fn cookie_len(&self) -> usize {
        self.pending_cookie()
            .map_or(0, |cookie| cookie.to_string().len())
    }
}

impl CartSlot for CookieCartSlot {
    fn get_raw(&self) -> Option<&str> {
        self.pending.as_deref().or(self.received.as_deref())
    }

    fn set_raw(&mut self, raw: String) {
        self.pending = Some(raw);
    }
}

impl FromRequestParts<AppState> for CookieCartSlot {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, state.config().is_secure()))
    }
}

impl IntoResponseParts for CookieCartSlot {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.set_cookie_header() {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}
