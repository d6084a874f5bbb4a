//! Discounts
//!
//! Per-product promotional discounts and the discount granted by the single
//! applied coupon. Percentages are applied to exact minor-unit amounts and
//! rounded once, half away from zero, so every discount is a whole number of
//! minor units.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{CartError, CartLedger, CartLine},
    coupons::Coupon,
    products::Catalog,
};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Fixed amount calculation overflowed.
    #[error("fixed discount amount overflowed")]
    AmountOverflow,

    /// Errors bubbled up from cart line totals.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    round_minor(exact_percent_of_minor(percent, minor)?)
}

/// The unrounded share of `minor` taken by `percent`.
fn exact_percent_of_minor(percent: &Percentage, minor: i64) -> Result<Decimal, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)
}

fn round_minor(amount: Decimal) -> Result<i64, DiscountError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Total promotional discount across the cart.
///
/// Each line is discounted by the live catalog discount of its product, not a
/// snapshot taken when it was added. Lines whose product has left the catalog,
/// or has no discount, contribute nothing.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a line total or the percentage calculation overflows.
pub fn product_discount<'a>(
    cart: &CartLedger<'a>,
    catalog: &impl Catalog<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let exact = cart
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| -> Result<_, DiscountError> {
            let Some(percent) = catalog.product(line.product()).and_then(|p| p.discount) else {
                return Ok(acc);
            };

            let share = exact_percent_of_minor(&percent, line.total()?.to_minor_units())?;

            acc.checked_add(share).ok_or(DiscountError::PercentConversion)
        })?;

    Ok(Money::from_minor(round_minor(exact)?, cart.currency()))
}

/// Discount granted by the applied coupon, if any.
///
/// `subtotal_after_product` is the cart subtotal less [`product_discount`]; it
/// is the base for order-wide coupons. Fixed and category coupons are not
/// limited by it.
///
/// Category coupons deliberately use raw line totals: product discounts are
/// not taken off their base.
///
/// # Errors
///
/// Returns a [`DiscountError`] if an amount overflows or currencies do not match.
pub fn coupon_discount<'a>(
    cart: &CartLedger<'a>,
    coupon: Option<&Coupon<'a>>,
    catalog: &impl Catalog<'a>,
    subtotal_after_product: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let currency = cart.currency();

    let minor = match coupon {
        None => 0,
        Some(Coupon::OrderPercent { percent, .. }) => {
            percent_of_minor(percent, subtotal_after_product.to_minor_units())?
        }
        Some(Coupon::CategoryPercent {
            category, percent, ..
        }) => {
            let base = cart
                .iter()
                .filter(|line| line_category(line, catalog) == category)
                .try_fold(
                    Money::from_minor(0, currency),
                    |acc, line| -> Result<_, DiscountError> { Ok(acc.add(line.total()?)?) },
                )?;

            percent_of_minor(percent, base.to_minor_units())?
        }
        Some(Coupon::ProductFixed {
            product, amount, ..
        }) => match cart.get(product) {
            Some(line) if amount.currency() == currency => amount
                .to_minor_units()
                .checked_mul(i64::from(line.quantity()))
                .ok_or(DiscountError::AmountOverflow)?,
            Some(_) => {
                return Err(DiscountError::Money(MoneyError::CurrencyMismatch {
                    expected: currency.iso_alpha_code,
                    actual: amount.currency().iso_alpha_code,
                }));
            }
            None => 0,
        },
    };

    Ok(Money::from_minor(minor, currency))
}

/// Category of a line, preferring the live catalog over the snapshot.
fn line_category<'c, 'a>(line: &'c CartLine<'a>, catalog: &'c impl Catalog<'a>) -> &'c str {
    catalog
        .product(line.product())
        .map_or(line.category(), |product| product.category.as_str())
}
