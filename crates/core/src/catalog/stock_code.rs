//! Human-readable stock codes.
//!
//! A stock code is derived from a product's catalog id and brand at creation
//! time and printed on labels and pick lists. The shape is fixed:
//!
//! ```text
//! MS-<BRAND3>-<HASH4>-<SUFFIX4>
//! ```
//!
//! The hash segment must stay bit-for-bit compatible with codes that are
//! already printed, so the fold below is a 32-bit signed multiplicative hash
//! over UTF-16 code units that wraps at every step.
//!
//! Codes are deterministic but not unique across the catalog; the catalog
//! store is expected to check for collisions before persisting one.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Leading segment shared by every code.
pub const STOCK_CODE_PREFIX: &str = "MS";

/// Brand used when a product has none.
const DEFAULT_BRAND: &str = "GEN";

const BRAND_LEN: usize = 3;
const HASH_LEN: usize = 4;
const SUFFIX_LEN: usize = 4;

/// Total length of a code, in characters.
pub const STOCK_CODE_LEN: usize =
    STOCK_CODE_PREFIX.len() + 1 + BRAND_LEN + 1 + HASH_LEN + 1 + SUFFIX_LEN;

/// Errors that can occur when parsing a [`StockCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StockCodeError {
    /// The input is not 16 characters long.
    #[error("stock code must be 16 characters, got {len}")]
    Length {
        /// Observed length in characters.
        len: usize,
    },
    /// The input does not start with `MS-`.
    #[error("stock code must start with MS-")]
    Prefix,
    /// A segment separator is missing or a segment has invalid characters.
    #[error("stock code has a malformed {segment} segment")]
    Segment {
        /// Name of the offending segment.
        segment: &'static str,
    },
}

/// A generated stock code, e.g. `MS-SAM-WCOY-1234`.
///
/// Downstream systems treat the value as an opaque display string; the
/// segment accessors exist for labeling layouts that print them separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockCode(String);

impl StockCode {
    /// Parse a previously generated code (e.g. one read back from the
    /// catalog store).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not of the shape
    /// `MS-<BRAND3>-<HASH4>-<SUFFIX4>`.
    pub fn parse(s: &str) -> Result<Self, StockCodeError> {
        let len = s.chars().count();
        if len != STOCK_CODE_LEN {
            return Err(StockCodeError::Length { len });
        }

        if s.get(..3) != Some("MS-") {
            return Err(StockCodeError::Prefix);
        }

        let brand = s.get(3..6).ok_or(StockCodeError::Segment { segment: "brand" })?;
        if !brand.bytes().all(|b| b.is_ascii_uppercase()) || s.get(6..7) != Some("-") {
            return Err(StockCodeError::Segment { segment: "brand" });
        }

        let hash = s.get(7..11).ok_or(StockCodeError::Segment { segment: "hash" })?;
        let is_base36 = |b: u8| b.is_ascii_digit() || b.is_ascii_uppercase();
        if !hash.bytes().all(is_base36) || s.get(11..12) != Some("-") {
            return Err(StockCodeError::Segment { segment: "hash" });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The three-letter brand segment.
    #[must_use]
    pub fn brand_segment(&self) -> &str {
        self.0.get(3..6).unwrap_or_default()
    }

    /// The four-character base-36 hash segment.
    #[must_use]
    pub fn hash_segment(&self) -> &str {
        self.0.get(7..11).unwrap_or_default()
    }

    /// The trailing segment copied from the product id.
    #[must_use]
    pub fn suffix_segment(&self) -> &str {
        self.0.get(12..).unwrap_or_default()
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StockCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for StockCode {
    type Err = StockCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Generate the stock code for a product.
///
/// Total over any input: an empty or letter-free brand still yields a
/// three-letter segment, and an empty product id yields `0000` segments.
///
/// ```
/// use marketsquare_core::generate_stock_code;
///
/// let code = generate_stock_code("1234", Some("Samsung"));
/// assert_eq!(code.as_str(), "MS-SAM-WCOY-1234");
/// ```
#[must_use]
pub fn generate_stock_code(product_id: &str, brand: Option<&str>) -> StockCode {
    StockCode(format!(
        "{STOCK_CODE_PREFIX}-{}-{}-{}",
        brand_segment(brand),
        hash_segment(product_id),
        suffix_segment(product_id),
    ))
}

fn brand_segment(brand: Option<&str>) -> String {
    let brand = brand.filter(|b| !b.is_empty()).unwrap_or(DEFAULT_BRAND);
    let letters: String = brand
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(BRAND_LEN)
        .collect();
    format!("{letters:X<BRAND_LEN$}")
}

fn hash_segment(product_id: &str) -> String {
    let digits: String = to_base36(fold_hash(product_id).unsigned_abs())
        .chars()
        .take(HASH_LEN)
        .collect();
    format!("{digits:0<HASH_LEN$}")
}

fn suffix_segment(product_id: &str) -> String {
    let len = product_id.chars().count();
    if len >= SUFFIX_LEN {
        product_id.chars().skip(len - SUFFIX_LEN).collect()
    } else {
        format!("{product_id:0>SUFFIX_LEN$}")
    }
}

/// `hash = (hash << 5) - hash + unit`, wrapping to `i32` on every step.
fn fold_hash(input: &str) -> i32 {
    input.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::new();
    while n > 0 {
        let digit = char::from_digit(n % 36, 36).unwrap_or('0');
        digits.push(digit.to_ascii_uppercase());
        n /= 36;
    }
    digits.iter().rev().collect()
}
