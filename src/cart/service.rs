//! Cart service.

use rusty_money::{Money, iso::Currency};
use tracing::{debug, warn};

use crate::{
    cart::{
        CartError, CartLedger, CartLine, QuantityUpdate, RemovedLine,
        storage::{CartStore, StoredCartLine},
    },
    coupons::{Coupon, CouponError, CouponTable},
    delivery::DeliveryRate,
    pricing::{CheckoutTotals, PricingError, compute_checkout_totals},
    products::{Catalog, Product, ProductId},
};

/// Owns a shopper's cart and applied coupon, persisting the cart after every change.
#[derive(Debug)]
pub struct CartService<'a, C, S> {
    ledger: CartLedger<'a>,
    coupon: Option<Coupon<'a>>,
    catalog: &'a C,
    coupons: &'a CouponTable<'a>,
    delivery: DeliveryRate<'a>,
    store: S,
}

impl<'a, C, S> CartService<'a, C, S>
where
    C: Catalog<'a>,
    S: CartStore,
{
    /// Create a service, restoring whatever cart the store holds.
    ///
    /// Store failures and unusable stored lines are logged and skipped; the
    /// service then starts from whatever could be recovered.
    pub fn new(
        currency: &'static Currency,
        catalog: &'a C,
        coupons: &'a CouponTable<'a>,
        delivery: DeliveryRate<'a>,
        store: S,
    ) -> Self {
        let ledger = restore_ledger(&store, currency);

        Self {
            ledger,
            coupon: None,
            catalog,
            coupons,
            delivery,
            store,
        }
    }

    /// Add units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the product is priced in another currency.
    pub fn add(&mut self, product: &Product<'a>, quantity: u32) -> Result<(), CartError> {
        self.ledger.add(product, quantity)?;

        debug!(product = %product.id, quantity, "added to cart");
        self.persist();

        Ok(())
    }

    /// Remove a product's line, returning it so the removal can be undone.
    pub fn remove(&mut self, product: &ProductId) -> Option<RemovedLine<'a>> {
        let removed = self.ledger.remove(product)?;

        debug!(product = %product, "removed from cart");
        self.persist();

        Some(removed)
    }

    /// Undo a removal.
    pub fn undo_remove(&mut self, removed: RemovedLine<'a>) {
        debug!(product = %removed.line().product(), "restoring removed line");

        self.ledger.restore(removed);
        self.persist();
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, product: &ProductId, quantity: u32) -> QuantityUpdate<'a> {
        let update = self.ledger.update_quantity(product, quantity);

        if !matches!(update, QuantityUpdate::Missing) {
            debug!(product = %product, quantity, "updated cart quantity");
            self.persist();
        }

        update
    }

    /// Empty the cart. The applied coupon stays applied.
    pub fn clear(&mut self) {
        self.ledger.clear();

        debug!("cleared cart");
        self.persist();
    }

    /// Apply a coupon code, replacing any coupon already applied.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::InvalidCoupon`] if the code is unknown; the
    /// previously applied coupon, if any, stays applied.
    pub fn apply_coupon(&mut self, code: &str) -> Result<&Coupon<'a>, CouponError> {
        let coupon = match self.coupons.resolve(code) {
            Ok(coupon) => coupon.clone(),
            Err(err) => {
                debug!(code, "rejected coupon code");
                return Err(err);
            }
        };

        debug!(code = %coupon.code(), "applied coupon");

        Ok(&*self.coupon.insert(coupon))
    }

    /// Remove the applied coupon, returning it.
    pub fn remove_coupon(&mut self) -> Option<Coupon<'a>> {
        self.coupon.take()
    }

    /// The applied coupon, if any
    pub fn coupon(&self) -> Option<&Coupon<'a>> {
        self.coupon.as_ref()
    }

    /// Total number of units in the cart
    pub fn count(&self) -> u64 {
        self.ledger.count()
    }

    /// Undiscounted cart subtotal
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        self.ledger.subtotal()
    }

    /// Evaluate every checkout figure against the current cart and coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any amount overflows or currencies do not match.
    pub fn totals(&self) -> Result<CheckoutTotals<'a>, PricingError> {
        compute_checkout_totals(
            &self.ledger,
            self.coupon.as_ref(),
            self.catalog,
            &self.delivery,
        )
    }

    /// The cart ledger
    pub fn ledger(&self) -> &CartLedger<'a> {
        &self.ledger
    }

    /// The catalog prices are read from
    pub fn catalog(&self) -> &'a C {
        self.catalog
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let lines: Vec<StoredCartLine> = self.ledger.iter().map(StoredCartLine::from).collect();

        if let Err(err) = self.store.save(&lines) {
            warn!(error = %err, "failed to persist cart; keeping in-memory cart");
        }
    }
}

fn restore_ledger<S: CartStore>(store: &S, currency: &'static Currency) -> CartLedger<'static> {
    let stored = match store.load() {
        Ok(stored) => stored,
        Err(err) => {
            warn!(error = %err, "failed to load persisted cart; starting empty");
            return CartLedger::new(currency);
        }
    };

    let lines = stored
        .into_iter()
        .filter_map(|stored| {
            let id = stored.id.clone();

            CartLine::try_from(stored)
                .inspect_err(|err| warn!(product = %id, error = %err, "skipping stored cart line"))
                .ok()
        })
        .filter(|line| {
            let matches = line.price().currency() == currency;

            if !matches {
                warn!(product = %line.product(), "skipping stored cart line in another currency");
            }

            matches
        });

    CartLedger::with_lines(lines, currency).unwrap_or_else(|err| {
        warn!(error = %err, "failed to restore persisted cart; starting empty");
        CartLedger::new(currency)
    })
}
