//! Payment gateway

use mockall::automock;
use rust_decimal::Decimal;

use crate::orders::OrderId;

/// Who is paying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Customer {
    /// Signed-in user id; none for guest checkout
    pub user_id: Option<String>,

    /// Name shown to the payment provider
    pub name: String,

    /// Email the provider sends the receipt to
    pub email: String,
}

/// A single charge sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    /// Our reference for the charge, the order id
    pub reference: OrderId,

    /// Amount in major units
    pub amount: Decimal,

    /// ISO currency code
    pub currency: &'static str,

    /// Paying customer
    pub customer: Customer,
}

/// How a charge ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The shopper paid.
    Successful {
        /// The provider's own reference for the payment, kept for tracking
        provider_ref: Option<String>,
    },

    /// The provider declined the payment.
    Failed {
        /// Reason given by the provider
        reason: String,
    },

    /// The shopper closed the payment dialog.
    Cancelled,
}

/// Port for the third-party payment provider.
#[automock]
pub trait PaymentGateway {
    /// Charge the customer. Called at most once per checkout.
    fn charge(&self, request: &ChargeRequest) -> PaymentOutcome;
}

/// Outcome a [`SimulatedGateway`] reports for every charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SimulatedOutcome {
    /// Every charge succeeds
    #[default]
    Succeed,
    /// Every charge is declined
    Decline,
    /// Every charge is cancelled by the shopper
    Cancel,
}

/// Gateway that never contacts a provider, for dry runs and demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedGateway {
    outcome: SimulatedOutcome,
}

impl SimulatedGateway {
    /// Create a gateway that always reports `outcome`.
    pub fn new(outcome: SimulatedOutcome) -> Self {
        Self { outcome }
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, request: &ChargeRequest) -> PaymentOutcome {
        match self.outcome {
            SimulatedOutcome::Succeed => PaymentOutcome::Successful {
                provider_ref: Some(format!("SIM-{}", request.reference)),
            },
            SimulatedOutcome::Decline => PaymentOutcome::Failed {
                reason: "declined by simulated gateway".to_string(),
            },
            SimulatedOutcome::Cancel => PaymentOutcome::Cancelled,
        }
    }
}
