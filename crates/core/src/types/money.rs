//! Money carried in minor units.
//!
//! Prices travel through the cart as the smallest denomination of their
//! currency (kuruş, cents). They are never added up or validated here; the
//! only arithmetic is the conversion to a [`Decimal`] for display.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currencies the catalog sells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    TRY,
    EUR,
}

impl CurrencyCode {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::TRY => "TRY",
            Self::EUR => "EUR",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::TRY => "₺",
            Self::EUR => "€",
        }
    }

    /// Number of minor units digits (both supported currencies use 2).
    #[must_use]
    pub const fn minor_digits(self) -> u32 {
        2
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount in minor units together with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's smallest unit.
    pub amount_minor: i64,
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount_minor: i64, currency: CurrencyCode) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// The amount in standard units (e.g. `1250` kuruş -> `12.50`).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_minor, self.currency.minor_digits())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal() {
        let price = Money::new(1250, CurrencyCode::TRY);
        assert_eq!(price.to_decimal(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(1250, CurrencyCode::TRY).to_string(), "₺12.50");
        assert_eq!(Money::new(99, CurrencyCode::EUR).to_string(), "€0.99");
    }

    #[test]
    fn test_currency_wire_format() {
        assert_eq!(
            serde_json::to_string(&CurrencyCode::EUR).ok().as_deref(),
            Some("\"EUR\"")
        );
    }
}
