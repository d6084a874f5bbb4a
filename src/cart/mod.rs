//! Cart
//!
//! The cart ledger: one line per product, holding a snapshot of the product at
//! the time it was first added and the quantity the shopper wants.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::products::{Product, ProductId};

pub mod service;
pub mod storage;

/// Errors related to cart lines or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (product, line currency, cart currency).
    #[error("Product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// A line total or the subtotal does not fit in minor units.
    #[error("cart amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single product entry in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: ProductId,
    name: String,
    price: Money<'a, Currency>,
    category: String,
    image: Option<String>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Snapshot a product into a new line.
    pub fn from_product(product: &Product<'a>, quantity: u32) -> Self {
        Self {
            product: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            image: product.image.clone(),
            quantity,
        }
    }

    /// Build a line from already-snapshotted fields.
    pub fn new(
        product: ProductId,
        name: String,
        price: Money<'a, Currency>,
        category: String,
        image: Option<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            name,
            price,
            category,
            image,
            quantity,
        }
    }

    /// Product this line refers to
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Product name at the time it was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at the time it was added
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Category at the time it was added
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Image at the time it was added
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Quantity, always at least one while the line is in a cart
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity, undiscounted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = self
            .price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(CartError::Overflow)?;

        Ok(Money::from_minor(minor, self.price.currency()))
    }
}

/// A line taken out of the cart, kept so the removal can be undone.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedLine<'a>(CartLine<'a>);

impl<'a> RemovedLine<'a> {
    /// The line as it was when removed
    pub fn line(&self) -> &CartLine<'a> {
        &self.0
    }

    /// Consume into the underlying line
    pub fn into_line(self) -> CartLine<'a> {
        self.0
    }
}

/// Outcome of [`CartLedger::update_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityUpdate<'a> {
    /// The line now has the requested quantity.
    Updated,

    /// The requested quantity was zero, so the line was removed.
    Removed(RemovedLine<'a>),

    /// No line for that product; nothing changed.
    Missing,
}

/// Cart Ledger
#[derive(Debug, Clone)]
pub struct CartLedger<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> CartLedger<'a> {
    /// Create an empty cart in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from existing lines.
    ///
    /// Lines for the same product are merged and zero-quantity lines dropped,
    /// so the result always satisfies the one-line-per-product invariant.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if any line is priced in another currency.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut ledger = Self::new(currency);

        for line in lines {
            ledger.ensure_currency(&line)?;

            if line.quantity == 0 {
                continue;
            }

            ledger.merge(line);
        }

        Ok(ledger)
    }

    /// Add `quantity` units of a product.
    ///
    /// Increments the existing line if there is one; otherwise appends a new
    /// line. A quantity of zero never creates a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the product is priced in another currency.
    pub fn add(&mut self, product: &Product<'a>, quantity: u32) -> Result<(), CartError> {
        let line = CartLine::from_product(product, quantity);

        self.ensure_currency(&line)?;

        if let Some(existing) = self.line_mut(&product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else if quantity > 0 {
            self.lines.push(line);
        }

        Ok(())
    }

    /// Remove the line for a product, returning it so the removal can be undone.
    pub fn remove(&mut self, product: &ProductId) -> Option<RemovedLine<'a>> {
        let idx = self.lines.iter().position(|line| &line.product == product)?;

        Some(RemovedLine(self.lines.remove(idx)))
    }

    /// Undo a removal.
    ///
    /// If the product has been added again since, the removed quantity is
    /// added on top; otherwise the line goes back to the front of the cart.
    pub fn restore(&mut self, removed: RemovedLine<'a>) {
        let line = removed.into_line();

        if let Some(existing) = self.line_mut(&line.product) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.insert(0, line);
        }
    }

    /// Set the quantity of a line. Zero removes it.
    pub fn update_quantity(&mut self, product: &ProductId, quantity: u32) -> QuantityUpdate<'a> {
        if quantity == 0 {
            return self
                .remove(product)
                .map_or(QuantityUpdate::Missing, QuantityUpdate::Removed);
        }

        match self.line_mut(product) {
            Some(line) => {
                line.quantity = quantity;
                QuantityUpdate::Updated
            }
            None => QuantityUpdate::Missing,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of unit price times quantity over every line, undiscounted.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total overflows or currencies do not match.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        self.lines
            .iter()
            .try_fold(
                Money::from_minor(0, self.currency),
                |acc, line| -> Result<_, CartError> { Ok(acc.add(line.total()?)?) },
            )
    }

    /// Look up the line for a product.
    pub fn get(&self, product: &ProductId) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|line| &line.product == product)
    }

    /// Iterate over the lines in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// The lines in cart order.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency every line is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn line_mut(&mut self, product: &ProductId) -> Option<&mut CartLine<'a>> {
        self.lines.iter_mut().find(|line| &line.product == product)
    }

    fn merge(&mut self, line: CartLine<'a>) {
        if let Some(existing) = self.line_mut(&line.product) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    fn ensure_currency(&self, line: &CartLine<'a>) -> Result<(), CartError> {
        let line_currency = line.price.currency();

        if line_currency == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                line.product.clone(),
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{NGN, USD};
    use testresult::TestResult;

    use super::*;

    fn headphones<'a>() -> Product<'a> {
        Product::new(
            "1",
            "Wireless Headphones",
            Money::from_minor(120_00, NGN),
            "Electronics",
        )
    }

    fn shoes<'a>() -> Product<'a> {
        Product::new("2", "Running Shoes", Money::from_minor(80_00, NGN), "Fashion")
    }

    #[test]
    fn add_appends_new_line() -> TestResult {
        let mut cart = CartLedger::new(NGN);

        cart.add(&headphones(), 2)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(2));

        Ok(())
    }

    #[test]
    fn repeated_add_is_additive() -> TestResult {
        let mut cart = CartLedger::new(NGN);

        cart.add(&headphones(), 2)?;
        cart.add(&headphones(), 3)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(5));

        Ok(())
    }

    #[test]
    fn add_zero_does_not_create_line() -> TestResult {
        let mut cart = CartLedger::new(NGN);

        cart.add(&headphones(), 0)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_saturates_instead_of_overflowing() -> TestResult {
        let mut cart = CartLedger::new(NGN);

        cart.add(&headphones(), u32::MAX)?;
        cart.add(&headphones(), 5)?;

        assert_eq!(
            cart.get(&ProductId::from("1")).map(CartLine::quantity),
            Some(u32::MAX)
        );

        Ok(())
    }

    #[test]
    fn add_rejects_other_currency() {
        let mut cart = CartLedger::new(NGN);
        let product = Product::new("9", "Import", Money::from_minor(100, USD), "Misc");

        let result = cart.add(&product, 1);

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                ProductId::from("9"),
                USD.iso_alpha_code,
                NGN.iso_alpha_code
            ))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn line_snapshots_product_fields() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        let mut product = headphones();
        product.image = Some("/products/headphones.png".to_string());

        cart.add(&product, 1)?;

        let line = cart.get(&ProductId::from("1"));

        assert_eq!(line.map(CartLine::name), Some("Wireless Headphones"));
        assert_eq!(line.map(CartLine::category), Some("Electronics"));
        assert_eq!(line.and_then(CartLine::image), Some("/products/headphones.png"));
        assert_eq!(line.map(|l| *l.price()), Some(Money::from_minor(120_00, NGN)));

        Ok(())
    }

    #[test]
    fn remove_returns_removed_line() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;

        let removed = cart.remove(&ProductId::from("1"));

        assert_eq!(removed.as_ref().map(|r| r.line().quantity()), Some(2));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn remove_missing_is_noop() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 1)?;

        assert!(cart.remove(&ProductId::from("404")).is_none());
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn restore_reinserts_at_front() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;
        cart.add(&shoes(), 1)?;

        let removed = cart.remove(&ProductId::from("1"));
        assert!(removed.is_some(), "line should have been removed");

        if let Some(removed) = removed {
            cart.restore(removed);
        }

        let ids: Vec<&str> = cart.iter().map(|l| l.product().as_str()).collect();

        assert_eq!(ids, ["1", "2"]);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(2));

        Ok(())
    }

    #[test]
    fn restore_merges_when_product_was_added_again() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;

        let removed = cart.remove(&ProductId::from("1"));
        cart.add(&headphones(), 1)?;

        if let Some(removed) = removed {
            cart.restore(removed);
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(3));

        Ok(())
    }

    #[test]
    fn update_quantity_sets_exact_value() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;

        let update = cart.update_quantity(&ProductId::from("1"), 7);

        assert_eq!(update, QuantityUpdate::Updated);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(7));

        Ok(())
    }

    #[test]
    fn update_quantity_zero_removes() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;

        let update = cart.update_quantity(&ProductId::from("1"), 0);

        assert!(matches!(update, QuantityUpdate::Removed(ref r) if r.line().quantity() == 2));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn update_quantity_missing_is_noop() {
        let mut cart = CartLedger::new(NGN);

        assert_eq!(
            cart.update_quantity(&ProductId::from("1"), 3),
            QuantityUpdate::Missing
        );
        assert_eq!(
            cart.update_quantity(&ProductId::from("1"), 0),
            QuantityUpdate::Missing
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn count_sums_quantities() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;
        cart.add(&shoes(), 3)?;

        assert_eq!(cart.count(), 5);
        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn subtotal_sums_line_totals() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;
        cart.add(&shoes(), 1)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(320_00, NGN));

        Ok(())
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() -> TestResult {
        let cart = CartLedger::new(NGN);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, NGN));

        Ok(())
    }

    #[test]
    fn subtotal_survives_add_then_remove() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;
        let before = cart.subtotal()?;

        cart.add(&shoes(), 4)?;
        cart.remove(&ProductId::from("2"));

        assert_eq!(cart.subtotal()?, before);

        Ok(())
    }

    #[test]
    fn line_total_overflow_is_an_error() {
        let line = CartLine::from_product(
            &Product::new("1", "Gold", Money::from_minor(i64::MAX, NGN), "Misc"),
            2,
        );

        assert_eq!(line.total(), Err(CartError::Overflow));
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let mut cart = CartLedger::new(NGN);
        cart.add(&headphones(), 2)?;
        cart.add(&shoes(), 1)?;

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);

        Ok(())
    }

    #[test]
    fn with_lines_merges_duplicates_and_drops_zero_quantities() -> TestResult {
        let lines = [
            CartLine::from_product(&headphones(), 1),
            CartLine::from_product(&shoes(), 0),
            CartLine::from_product(&headphones(), 2),
        ];

        let cart = CartLedger::with_lines(lines, NGN)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::from("1")).map(CartLine::quantity), Some(3));

        Ok(())
    }
}
