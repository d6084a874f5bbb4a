//! Coupons
//!
//! Coupon codes are static configuration. Each coupon shape carries only the
//! fields its discount formula reads.

use std::fmt;

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::products::ProductId;

/// Errors raised while resolving coupon codes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The code does not match any known coupon.
    #[error("invalid coupon code: {0}")]
    InvalidCoupon(String),
}

/// Normalized coupon code: trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalize a code as typed by a shopper.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// The normalized code
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CouponCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A coupon.
#[derive(Debug, Clone, PartialEq)]
pub enum Coupon<'a> {
    /// A percentage off the whole order, after product discounts.
    OrderPercent {
        /// Coupon code
        code: CouponCode,
        /// Percentage taken off
        percent: Percentage,
    },

    /// A percentage off the raw line totals of a single category.
    CategoryPercent {
        /// Coupon code
        code: CouponCode,
        /// Category the coupon applies to
        category: String,
        /// Percentage taken off
        percent: Percentage,
    },

    /// A fixed amount off every unit of a single product.
    ProductFixed {
        /// Coupon code
        code: CouponCode,
        /// Product the coupon applies to
        product: ProductId,
        /// Amount taken off each unit
        amount: Money<'a, Currency>,
    },
}

impl Coupon<'_> {
    /// The coupon's code
    pub fn code(&self) -> &CouponCode {
        match self {
            Coupon::OrderPercent { code, .. }
            | Coupon::CategoryPercent { code, .. }
            | Coupon::ProductFixed { code, .. } => code,
        }
    }
}

/// Lookup table from normalized code to coupon.
#[derive(Debug, Clone, Default)]
pub struct CouponTable<'a> {
    coupons: FxHashMap<CouponCode, Coupon<'a>>,
}

impl<'a> CouponTable<'a> {
    /// Build a table. A later coupon with a repeated code replaces the earlier one.
    pub fn new(coupons: impl IntoIterator<Item = Coupon<'a>>) -> Self {
        Self {
            coupons: coupons
                .into_iter()
                .map(|coupon| (coupon.code().clone(), coupon))
                .collect(),
        }
    }

    /// Resolve a code as typed by a shopper.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidCoupon`] if the normalized code is unknown.
    pub fn resolve(&self, code: &str) -> Result<&Coupon<'a>, CouponError> {
        self.coupons
            .get(&CouponCode::new(code))
            .ok_or_else(|| CouponError::InvalidCoupon(code.trim().to_string()))
    }

    /// Number of coupons in the table
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn table<'a>() -> CouponTable<'a> {
        CouponTable::new([Coupon::OrderPercent {
            code: CouponCode::new("SAVE10"),
            percent: Percentage::from(Decimal::new(10, 2)),
        }])
    }

    #[test]
    fn code_is_trimmed_and_uppercased() {
        assert_eq!(CouponCode::new("  save10 ").as_str(), "SAVE10");
    }

    #[test]
    fn resolve_matches_case_insensitively() -> TestResult {
        let table = table();

        let coupon = table.resolve(" Save10")?;

        assert_eq!(coupon.code().as_str(), "SAVE10");

        Ok(())
    }

    #[test]
    fn resolve_unknown_code_is_invalid() {
        let table = table();

        assert_eq!(
            table.resolve(" bogus "),
            Err(CouponError::InvalidCoupon("bogus".to_string()))
        );
    }
}
