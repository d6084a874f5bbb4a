//! Pricing
//!
//! The single formula that turns a cart into the amount a shopper pays. The
//! same [`CheckoutTotals`] value is shown on the checkout summary and sent to
//! the payment gateway, so the two can never disagree.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{CartError, CartLedger},
    coupons::{Coupon, CouponCode},
    delivery::{DeliveryError, DeliveryRate},
    discounts::{DiscountError, coupon_discount, product_discount},
    products::Catalog,
};

/// Errors that can occur while calculating checkout totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Error calculating the cart subtotal.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Error calculating a discount.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Error calculating the delivery fee.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Every figure of one checkout evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutTotals<'a> {
    subtotal: Money<'a, Currency>,
    product_discount: Money<'a, Currency>,
    coupon_discount: Money<'a, Currency>,
    delivery_fee: Money<'a, Currency>,
    grand_total: Money<'a, Currency>,
    item_count: u64,
    coupon: Option<CouponCode>,
}

impl<'a> CheckoutTotals<'a> {
    /// Sum of line totals before any discount
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Promotional discount from the live catalog
    pub fn product_discount(&self) -> Money<'a, Currency> {
        self.product_discount
    }

    /// Subtotal less the product discount
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn subtotal_after_product(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.product_discount)
    }

    /// Discount from the applied coupon
    pub fn coupon_discount(&self) -> Money<'a, Currency> {
        self.coupon_discount
    }

    /// Combined product and coupon discounts
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the addition fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.product_discount.add(self.coupon_discount)
    }

    /// Delivery fee
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Amount payable: the figure displayed and the figure charged
    pub fn grand_total(&self) -> Money<'a, Currency> {
        self.grand_total
    }

    /// Number of units in the cart
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Code of the coupon that was active, if any
    pub fn coupon(&self) -> Option<&CouponCode> {
        self.coupon.as_ref()
    }

    /// Currency of every figure
    pub fn currency(&self) -> &'a Currency {
        self.grand_total.currency()
    }
}

/// Compute every checkout figure for a cart in one pass.
///
/// ```text
/// subtotal_after_product = subtotal - product_discount
/// grand_total            = subtotal_after_product - coupon_discount + delivery_fee
/// ```
///
/// # Errors
///
/// Returns a [`PricingError`] if any amount overflows or currencies do not match.
pub fn compute_checkout_totals<'a>(
    cart: &CartLedger<'a>,
    coupon: Option<&Coupon<'a>>,
    catalog: &impl Catalog<'a>,
    delivery: &DeliveryRate<'a>,
) -> Result<CheckoutTotals<'a>, PricingError> {
    let subtotal = cart.subtotal()?;
    let product_discount = product_discount(cart, catalog)?;
    let subtotal_after_product = subtotal.sub(product_discount)?;
    let coupon_discount = coupon_discount(cart, coupon, catalog, subtotal_after_product)?;
    let delivery_fee = delivery.fee(cart)?;

    let grand_total = subtotal_after_product
        .sub(coupon_discount)?
        .add(delivery_fee)?;

    Ok(CheckoutTotals {
        subtotal,
        product_discount,
        coupon_discount,
        delivery_fee,
        grand_total,
        item_count: cart.count(),
        coupon: coupon.map(|c| c.code().clone()),
    })
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::iso::NGN;
    use testresult::TestResult;

    use crate::products::{Product, ProductId, StaticCatalog};

    use super::*;

    fn delivery<'a>() -> DeliveryRate<'a> {
        DeliveryRate::per_item(Money::from_minor(200_00, NGN))
    }

    fn discounted_catalog<'a>() -> StaticCatalog<'a> {
        StaticCatalog::new([Product::new(
            "1",
            "Blender",
            Money::from_minor(1000_00, NGN),
            "Kitchen",
        )
        .with_discount(Percentage::from(Decimal::new(10, 2)))])
    }

    fn cart<'a>(catalog: &StaticCatalog<'a>) -> Result<CartLedger<'a>, CartError> {
        let mut cart = CartLedger::new(NGN);

        for product in catalog.products() {
            cart.add(product, 2)?;
        }

        Ok(cart)
    }

    #[test]
    fn totals_without_coupon() -> TestResult {
        let catalog = discounted_catalog();
        let cart = cart(&catalog)?;

        let totals = compute_checkout_totals(&cart, None, &catalog, &delivery())?;

        assert_eq!(totals.subtotal(), Money::from_minor(2000_00, NGN));
        assert_eq!(totals.product_discount(), Money::from_minor(200_00, NGN));
        assert_eq!(totals.coupon_discount(), Money::from_minor(0, NGN));
        assert_eq!(totals.delivery_fee(), Money::from_minor(400_00, NGN));
        assert_eq!(totals.grand_total(), Money::from_minor(2200_00, NGN));
        assert_eq!(totals.item_count(), 2);
        assert!(totals.coupon().is_none());

        Ok(())
    }

    #[test]
    fn totals_with_order_coupon() -> TestResult {
        let catalog = discounted_catalog();
        let cart = cart(&catalog)?;
        let coupon = Coupon::OrderPercent {
            code: CouponCode::new("SAVE10"),
            percent: Percentage::from(Decimal::new(10, 2)),
        };

        let totals = compute_checkout_totals(&cart, Some(&coupon), &catalog, &delivery())?;

        assert_eq!(totals.coupon_discount(), Money::from_minor(180_00, NGN));
        assert_eq!(totals.grand_total(), Money::from_minor(2020_00, NGN));
        assert_eq!(totals.savings()?, Money::from_minor(380_00, NGN));
        assert_eq!(totals.coupon().map(CouponCode::as_str), Some("SAVE10"));

        Ok(())
    }

    #[test]
    fn fixed_coupon_beyond_discounted_subtotal_is_not_clamped() -> TestResult {
        let catalog = discounted_catalog();
        let mut cart = CartLedger::new(NGN);
        if let Some(blender) = catalog.product(&ProductId::from("1")) {
            cart.add(blender, 1)?;
        }

        let coupon = Coupon::ProductFixed {
            code: CouponCode::new("BIGBLEND"),
            product: ProductId::from("1"),
            amount: Money::from_minor(1500_00, NGN),
        };

        let totals = compute_checkout_totals(&cart, Some(&coupon), &catalog, &delivery())?;

        assert_eq!(totals.coupon_discount(), Money::from_minor(1500_00, NGN));
        assert_eq!(totals.grand_total(), Money::from_minor(-400_00, NGN));

        Ok(())
    }

    #[test]
    fn grand_total_is_subtotal_plus_delivery_without_discounts() -> TestResult {
        let catalog = StaticCatalog::new([
            Product::new("1", "Rice 5kg", Money::from_minor(4_999_99, NGN), "Pantry Staples"),
            Product::new("2", "Milk", Money::from_minor(1_250_50, NGN), "Dairy & Eggs"),
        ]);
        let cart = cart(&catalog)?;

        let totals = compute_checkout_totals(&cart, None, &catalog, &delivery())?;

        assert_eq!(
            totals.grand_total(),
            totals.subtotal().add(totals.delivery_fee())?
        );

        Ok(())
    }

    #[test]
    fn empty_cart_totals_are_zero() -> TestResult {
        let catalog = discounted_catalog();

        let totals = compute_checkout_totals(&CartLedger::new(NGN), None, &catalog, &delivery())?;

        assert_eq!(totals.grand_total(), Money::from_minor(0, NGN));
        assert_eq!(totals.item_count(), 0);

        Ok(())
    }

    #[test]
    fn subtotal_after_product_subtracts_product_discount() -> TestResult {
        let catalog = discounted_catalog();
        let cart = cart(&catalog)?;

        let totals = compute_checkout_totals(&cart, None, &catalog, &delivery())?;

        assert_eq!(
            totals.subtotal_after_product()?,
            Money::from_minor(1800_00, NGN)
        );

        Ok(())
    }
}
