use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{BookingRecord, BookingStatus};

/// Repository trait for booking persistence. The engine only needs
/// create/read/update-by-id semantics; storage technology is the
/// implementor's concern.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(
        &self,
        booking: &BookingRecord,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>>;

    /// Conditional status update. The store must re-check the current
    /// status against `expected` under its own write guard and fail without
    /// mutating when they differ, so two racing transitions cannot both
    /// apply.
    async fn update_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Attach the provider checkout reference to an already persisted
    /// booking.
    async fn set_payment_reference(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_bookings_for_host(
        &self,
        host_id: Uuid,
    ) -> Result<Vec<BookingRecord>, Box<dyn std::error::Error + Send + Sync>>;
}
