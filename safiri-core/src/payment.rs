use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Result code pushed by the provider when the payer dismisses the checkout
/// prompt on their device.
pub const RESULT_CODE_USER_CANCELLED: &str = "1032";
/// Result code pushed when the payer enters a wrong PIN.
pub const RESULT_CODE_WRONG_PIN: &str = "2001";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderEventStatus {
    Pending,
    Completed,
    Failed,
}

/// Raw status push from the payment provider, keyed by checkout reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub reference: String,
    pub status: ProviderEventStatus,
    pub result_code: Option<String>,
}

/// Reduced payment outcome exposed to the booking flow. Anything other than
/// `Processing` is terminal and never reverts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Processing,
    Success,
    CancelledByUser,
    PinError,
    GenericFailure,
}

impl PaymentOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentOutcome::Processing)
    }
}

/// Checkout session opened with the provider. Status events for the
/// reference arrive on the channel until the provider drops the sender.
#[derive(Debug)]
pub struct CheckoutSession {
    pub reference: String,
    pub events: mpsc::Receiver<ProviderEvent>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a checkout for the given amount and obtain the provider-assigned
    /// reference plus the event channel for that reference. `currency` is an
    /// ISO code such as "KES"; `account` is the payer's phone number for
    /// mobile money, or a card token.
    async fn initiate_checkout(
        &self,
        booking_id: Uuid,
        amount: f64,
        currency: &str,
        account: &str,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>>;
}
