//! Meg Store
//!
//! Cart, discount and checkout pricing core for the Meg Store storefront.
//!
//! A [`cart::CartLedger`] holds snapshot lines priced from a
//! [`products::Catalog`]. [`pricing::compute_checkout_totals`] layers the
//! product discounts, an optional [`coupons::Coupon`] and the per-item
//! delivery charge on top of it, and [`checkout::place_order`] charges the
//! grand total and records an [`orders::Order`].

pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod delivery;
pub mod discounts;
pub mod fixtures;
pub mod logging;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
