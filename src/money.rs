//! Money
//!
//! Conversions between [`Money`] and the plain decimal amounts used at the
//! edges of the crate (persisted carts, order records, payment requests).

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Findable, Money, MoneyError, iso::Currency};

/// Major-unit decimal amount of a money value, e.g. `₦1,234.50` becomes `1234.50`.
pub fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Build money from a major-unit decimal amount, rounding to the currency's minor unit.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidAmount`] if the amount does not fit in minor units.
pub fn from_decimal<'a>(
    amount: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, MoneyError> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.exponent);

    let minor = rounded.mantissa().to_i64().ok_or(MoneyError::InvalidAmount)?;

    Ok(Money::from_minor(minor, currency))
}

/// Look up an ISO currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidCurrency`] if the code is unknown.
pub fn find_currency(code: &str) -> Result<&'static Currency, MoneyError> {
    Currency::find(code).ok_or(MoneyError::InvalidCurrency)
}
