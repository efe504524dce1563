use async_trait::async_trait;
use uuid::Uuid;

/// Payload for guest and host confirmation messages sent after a booking
/// reaches PAID.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking_id: Uuid,
    pub host_id: Uuid,
    pub guest_email: Option<String>,
    pub item_name: String,
    pub total_amount: f64,
}

/// Fire-and-forget confirmation delivery. A delivery failure is logged by the
/// caller and never rolls back the booking.
#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
