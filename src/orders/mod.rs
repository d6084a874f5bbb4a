//! Orders
//!
//! A placed order is a frozen snapshot of the cart and of the one checkout
//! evaluation that was charged. Amounts are stored in major units alongside
//! their currency code so the record reads the same as the receipt.

use std::fmt;

use jiff::{Timestamp, Zoned, civil::DateTime};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{CartLedger, CartLine},
    money::to_decimal,
    pricing::CheckoutTotals,
};

pub mod store;

pub use store::{JsonOrderStore, MemoryOrderStore, OrderRepository, OrderStoreError};

/// Number of user id characters used as an order id prefix.
const USER_PREFIX_LEN: usize = 6;

/// Order identifier, e.g. `ab12cd_ORD-20240305-140709-0F3A`.
///
/// Doubles as the payment reference sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate an id for an order placed now, in local time.
    pub fn generate(owner: &OrderOwner) -> Self {
        let suffix = rand::thread_rng().gen_range(0..0xffff_u16);

        Self::at(Zoned::now().datetime(), suffix, owner)
    }

    /// Build an id from a local time and a random suffix.
    pub fn at(datetime: DateTime, suffix: u16, owner: &OrderOwner) -> Self {
        let id = format!("ORD-{}-{suffix:04X}", datetime.strftime("%Y%m%d-%H%M%S"));

        match owner {
            OrderOwner::Guest => Self(id),
            OrderOwner::User(user) => {
                let prefix: String = user.chars().take(USER_PREFIX_LEN).collect();

                Self(format!("{prefix}_{id}"))
            }
        }
    }

    /// The id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Whose order log an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderOwner {
    /// Checked out without signing in
    Guest,

    /// A signed-in user
    User(String),
}

impl OrderOwner {
    /// Owner for an optional user id. A blank id counts as a guest.
    pub fn from_user(user: Option<&str>) -> Self {
        match user.map(str::trim) {
            Some(user) if !user.is_empty() => Self::User(user.to_string()),
            _ => Self::Guest,
        }
    }

    /// The user id, if signed in
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::Guest => None,
            Self::User(user) => Some(user),
        }
    }
}

/// Fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Paid, awaiting confirmation
    Pending,
    /// Confirmed by the store
    Confirmed,
    /// Handed to the courier
    Shipped,
    /// Received by the shopper
    Delivered,
    /// Cancelled
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };

        f.write_str(status)
    }
}

/// A cart line as it was when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product identifier
    pub id: String,
    /// Product name
    pub name: String,
    /// Product category
    pub category: String,
    /// Product image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price in major units
    pub unit_price: Decimal,
    /// Quantity ordered
    pub quantity: u32,
}

impl From<&CartLine<'_>> for OrderLine {
    fn from(line: &CartLine<'_>) -> Self {
        Self {
            id: line.product().to_string(),
            name: line.name().to_string(),
            category: line.category().to_string(),
            image: line.image().map(str::to_string),
            unit_price: to_decimal(line.price()),
            quantity: line.quantity(),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id, also the payment reference
    pub id: OrderId,
    /// Signed-in user, or none for guests
    #[serde(default)]
    pub user: Option<String>,
    /// Line snapshot
    pub lines: Vec<OrderLine>,
    /// ISO currency code of every amount
    pub currency: String,
    /// Sum of line totals before discounts
    pub subtotal: Decimal,
    /// Promotional product discount
    pub product_discount: Decimal,
    /// Coupon discount
    pub coupon_discount: Decimal,
    /// Delivery fee
    pub delivery_fee: Decimal,
    /// Amount charged
    pub grand_total: Decimal,
    /// Applied coupon code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    /// Fulfilment status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: Timestamp,
    /// Payment provider reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<String>,
}

impl Order {
    /// Snapshot a cart and the totals it was charged at into a pending order.
    pub fn from_checkout(
        id: OrderId,
        owner: &OrderOwner,
        cart: &CartLedger<'_>,
        totals: &CheckoutTotals<'_>,
        tracking: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user: owner.user().map(str::to_string),
            lines: cart.iter().map(OrderLine::from).collect(),
            currency: totals.currency().iso_alpha_code.to_string(),
            subtotal: to_decimal(&totals.subtotal()),
            product_discount: to_decimal(&totals.product_discount()),
            coupon_discount: to_decimal(&totals.coupon_discount()),
            delivery_fee: to_decimal(&totals.delivery_fee()),
            grand_total: to_decimal(&totals.grand_total()),
            coupon: totals.coupon().map(|code| code.as_str().to_string()),
            status: OrderStatus::Pending,
            created_at,
            tracking,
        }
    }

    /// Owner of this order's log
    pub fn owner(&self) -> OrderOwner {
        OrderOwner::from_user(self.user.as_deref())
    }

    /// Total number of units ordered
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Whether the stored amounts add up to the grand total.
    pub fn is_balanced(&self) -> bool {
        self.subtotal - self.product_discount - self.coupon_discount + self.delivery_fee
            == self.grand_total
    }
}
