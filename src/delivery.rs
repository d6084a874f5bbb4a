//! Delivery
//!
//! Flat-rate delivery: every unit in the cart costs the same to deliver.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::cart::CartLedger;

/// Errors raised while pricing delivery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The rate is in a different currency to the cart (rate currency, cart currency).
    #[error("delivery rate is in {0}, but cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The fee does not fit in minor units.
    #[error("delivery fee overflowed")]
    Overflow,
}

/// Per-item delivery rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryRate<'a> {
    per_item: Money<'a, Currency>,
}

impl<'a> DeliveryRate<'a> {
    /// Charge `per_item` for every unit in the cart.
    pub const fn per_item(per_item: Money<'a, Currency>) -> Self {
        Self { per_item }
    }

    /// The amount charged per unit
    pub fn rate(&self) -> &Money<'a, Currency> {
        &self.per_item
    }

    /// Delivery fee for the cart: total quantity times the per-item rate.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the rate currency differs from the cart's
    /// or the fee overflows.
    pub fn fee(&self, cart: &CartLedger<'a>) -> Result<Money<'a, Currency>, DeliveryError> {
        let currency = cart.currency();

        if self.per_item.currency() != currency {
            return Err(DeliveryError::CurrencyMismatch(
                self.per_item.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let count = i64::try_from(cart.count()).map_err(|_err| DeliveryError::Overflow)?;

        let minor = self
            .per_item
            .to_minor_units()
            .checked_mul(count)
            .ok_or(DeliveryError::Overflow)?;

        Ok(Money::from_minor(minor, currency))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{NGN, USD};
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    fn rate<'a>() -> DeliveryRate<'a> {
        DeliveryRate::per_item(Money::from_minor(200_00, NGN))
    }

    fn cart_of<'a>(quantity: u32) -> Result<CartLedger<'a>, crate::cart::CartError> {
        let mut cart = CartLedger::new(NGN);
        cart.add(
            &Product::new("1", "Headphones", Money::from_minor(120_00, NGN), "Electronics"),
            quantity,
        )?;
        Ok(cart)
    }

    #[test]
    fn empty_cart_has_no_fee() -> TestResult {
        assert_eq!(rate().fee(&CartLedger::new(NGN))?, Money::from_minor(0, NGN));

        Ok(())
    }

    #[test]
    fn fee_is_quantity_times_rate() -> TestResult {
        let mut cart = cart_of(2)?;
        cart.add(
            &Product::new("2", "Shoes", Money::from_minor(80_00, NGN), "Fashion"),
            3,
        )?;

        assert_eq!(rate().fee(&cart)?, Money::from_minor(1000_00, NGN));

        Ok(())
    }

    #[test]
    fn fee_is_proportional_to_item_count() -> TestResult {
        for quantity in [1, 2, 7, 50] {
            let single = rate().fee(&cart_of(quantity)?)?;
            let double = rate().fee(&cart_of(quantity * 2)?)?;

            assert_eq!(
                double.to_minor_units(),
                2 * single.to_minor_units(),
                "fee for {quantity} items should double"
            );
        }

        Ok(())
    }

    #[test]
    fn rate_in_other_currency_is_an_error() -> TestResult {
        let rate = DeliveryRate::per_item(Money::from_minor(2_00, USD));

        assert_eq!(
            rate.fee(&cart_of(1)?),
            Err(DeliveryError::CurrencyMismatch(
                USD.iso_alpha_code,
                NGN.iso_alpha_code
            ))
        );

        Ok(())
    }
}
