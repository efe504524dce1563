use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use safiri_booking::models::{BookingRecord, BookingStatus};
use safiri_booking::repository::BookingRepository;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory booking store. Reference implementation of the repository
/// semantics; records are only ever created and status-updated, never
/// removed.
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, BookingRecord>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn create_booking(
        &self,
        booking: &BookingRecord,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(format!("Booking already exists: {}", booking.id).into());
        }
        bookings.insert(booking.id, booking.clone());
        Ok(booking.id)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&id)
            .ok_or_else(|| format!("Booking not found: {}", id))?;
        // Re-check under the write lock; a transition decided against a
        // stale read must not overwrite a newer status.
        if booking.status != expected {
            return Err(format!(
                "Booking {} is {:?}, expected {:?}",
                id, booking.status, expected
            )
            .into());
        }
        booking.status = status;
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn set_payment_reference(
        &self,
        id: Uuid,
        reference: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&id)
            .ok_or_else(|| format!("Booking not found: {}", id))?;
        booking.payment_reference = Some(reference.to_string());
        booking.updated_at = Utc::now();
        Ok(())
    }

    async fn list_bookings_for_host(
        &self,
        host_id: Uuid,
    ) -> Result<Vec<BookingRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let mut records: Vec<BookingRecord> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.host_id == host_id)
            .cloned()
            .collect();
        records.sort_by_key(|b| b.created_at);
        Ok(records)
    }
}
