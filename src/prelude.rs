//! Meg Store prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartError, CartLedger, CartLine, QuantityUpdate, RemovedLine,
        service::CartService,
        storage::{CartStore, CartStoreError, JsonFileCartStore, MemoryCartStore, StoredCartLine},
    },
    checkout::{
        ChargeRequest, CheckoutError, Customer, PaymentGateway, PaymentOutcome, SimulatedGateway,
        SimulatedOutcome, place_order,
    },
    coupons::{Coupon, CouponCode, CouponError, CouponTable},
    delivery::{DeliveryError, DeliveryRate},
    discounts::{DiscountError, coupon_discount, product_discount},
    fixtures::{Fixture, FixtureError},
    orders::{
        JsonOrderStore, MemoryOrderStore, Order, OrderId, OrderLine, OrderOwner, OrderRepository,
        OrderStatus, OrderStoreError,
    },
    pricing::{CheckoutTotals, PricingError, compute_checkout_totals},
    products::{Catalog, Product, ProductId, StaticCatalog},
    receipt::{Receipt, ReceiptError},
};
