use serde::Serialize;

use crate::models::{BookingRecord, BookingStatus};

/// Host-dashboard aggregates over a set of booking records.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct HostBookingStats {
    pub total_bookings: usize,
    pub pending: usize,
    pub paid: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Sum of totals over PAID bookings only.
    pub gross_revenue: f64,
    /// Slots across PAID bookings.
    pub guests_hosted: u32,
}

pub fn aggregate_host_stats(bookings: &[BookingRecord]) -> HostBookingStats {
    let mut stats = HostBookingStats::default();
    for booking in bookings {
        stats.total_bookings += 1;
        match booking.status {
            BookingStatus::Pending => stats.pending += 1,
            BookingStatus::Paid => {
                stats.paid += 1;
                stats.gross_revenue += booking.total_amount;
                stats.guests_hosted += booking.slot_count;
            }
            BookingStatus::Failed => stats.failed += 1,
            BookingStatus::Cancelled => stats.cancelled += 1,
        }
    }
    stats
}
