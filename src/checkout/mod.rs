//! Checkout
//!
//! Charges the shopper for exactly the totals they were shown and records the
//! order. The charge and the order are built from a single evaluation of the
//! cart, so the amount paid and the amount recorded cannot drift apart.

use jiff::Timestamp;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::{service::CartService, storage::CartStore},
    money::to_decimal,
    orders::{Order, OrderId, OrderOwner, OrderRepository, OrderStoreError},
    pricing::PricingError,
    products::Catalog,
};

pub mod gateway;

pub use gateway::{
    ChargeRequest, Customer, MockPaymentGateway, PaymentGateway, PaymentOutcome, SimulatedGateway,
    SimulatedOutcome,
};

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to pay for; no charge was attempted.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The provider declined the payment. The cart is untouched.
    #[error("payment {reference} failed: {reason}")]
    PaymentFailed {
        /// Reference of the declined charge
        reference: OrderId,
        /// Reason given by the provider
        reason: String,
    },

    /// The shopper cancelled the payment. The cart is untouched.
    #[error("payment {0} was cancelled")]
    PaymentCancelled(OrderId),

    /// Totals could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The charge succeeded but the order could not be recorded. The cart is
    /// kept so the payment can be reconciled.
    #[error("payment {reference} succeeded but the order was not saved: {source}")]
    OrderNotSaved {
        /// Reference of the successful charge
        reference: OrderId,
        /// Storage failure
        #[source]
        source: OrderStoreError,
    },
}

/// Charge the shopper for their cart and record the order.
///
/// On success the order is saved exactly once, and the cart and applied
/// coupon are cleared.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart,
/// [`CheckoutError::PaymentFailed`] or [`CheckoutError::PaymentCancelled`] if
/// the charge does not go through, and [`CheckoutError::OrderNotSaved`] if the
/// order cannot be recorded after a successful charge.
pub fn place_order<'a, C, S, G, R>(
    service: &mut CartService<'a, C, S>,
    gateway: &G,
    orders: &mut R,
    customer: &Customer,
) -> Result<Order, CheckoutError>
where
    C: Catalog<'a>,
    S: CartStore,
    G: PaymentGateway + ?Sized,
    R: OrderRepository + ?Sized,
{
    if service.ledger().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = service.totals()?;
    let owner = OrderOwner::from_user(customer.user_id.as_deref());
    let reference = OrderId::generate(&owner);

    let request = ChargeRequest {
        reference: reference.clone(),
        amount: to_decimal(&totals.grand_total()),
        currency: totals.currency().iso_alpha_code,
        customer: customer.clone(),
    };

    info!(reference = %reference, amount = %request.amount, currency = request.currency, "charging customer");

    let provider_ref = match gateway.charge(&request) {
        PaymentOutcome::Successful { provider_ref } => provider_ref,
        PaymentOutcome::Failed { reason } => {
            warn!(reference = %reference, reason = %reason, "payment failed");
            return Err(CheckoutError::PaymentFailed { reference, reason });
        }
        PaymentOutcome::Cancelled => {
            warn!(reference = %reference, "payment cancelled");
            return Err(CheckoutError::PaymentCancelled(reference));
        }
    };

    let order = Order::from_checkout(
        reference,
        &owner,
        service.ledger(),
        &totals,
        provider_ref,
        Timestamp::now(),
    );

    if let Err(source) = orders.save(&order) {
        warn!(reference = %order.id, error = %source, "paid order was not saved; keeping cart");

        return Err(CheckoutError::OrderNotSaved {
            reference: order.id,
            source,
        });
    }

    service.clear();
    service.remove_coupon();

    info!(reference = %order.id, total = %order.grand_total, "order placed");

    Ok(order)
}
