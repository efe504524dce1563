use chrono::{DateTime, Utc};
use safiri_core::category::ItemCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionType {
    /// Credited for referring a host onto the platform.
    Host,
    /// Credited for a referred booking.
    Booking,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingStatus {
    Pending,
    Converted,
}

/// One row per successfully converted referred booking.
///
/// `commission_amount` is fixed at creation (`base_amount * rate / 100`) and
/// never recomputed, so later rate changes cannot rewrite the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionEntry {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Option<Uuid>,
    pub booking_id: Uuid,
    pub commission_type: CommissionType,
    pub rate: f64,
    pub base_amount: f64,
    pub commission_amount: f64,
    pub status: CommissionStatus,
    pub paid_at: Option<DateTime<Utc>>,
    /// Set exactly once when a withdrawal consumes this entry. A withdrawn
    /// entry leaves the withdrawable balance but stays in lifetime totals.
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CommissionEntry {
    pub fn new(
        referrer_id: Uuid,
        referred_user_id: Option<Uuid>,
        booking_id: Uuid,
        commission_type: CommissionType,
        rate: f64,
        base_amount: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            referrer_id,
            referred_user_id,
            booking_id,
            commission_type,
            rate,
            base_amount,
            commission_amount: base_amount * rate / 100.0,
            status: CommissionStatus::Pending,
            paid_at: None,
            withdrawn_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.status = CommissionStatus::Paid;
        self.paid_at = Some(at);
    }

    pub fn is_withdrawable(&self) -> bool {
        self.status == CommissionStatus::Paid && self.withdrawn_at.is_none()
    }
}

/// One row per qualifying referral click. Converts exactly once, at the
/// moment a commission entry is created from it, and never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralTracking {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub item_category: Option<ItemCategory>,
    pub status: TrackingStatus,
    pub converted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ReferralTracking {
    pub fn new(
        referrer_id: Uuid,
        referred_user_id: Option<Uuid>,
        item_id: Option<Uuid>,
        item_category: Option<ItemCategory>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            referrer_id,
            referred_user_id,
            item_id,
            item_category,
            status: TrackingStatus::Pending,
            converted_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_converted(&self) -> bool {
        self.status == TrackingStatus::Converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_amount_fixed_at_creation() {
        let entry = CommissionEntry::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            CommissionType::Booking,
            5.0,
            2000.0,
        );
        assert_eq!(entry.commission_amount, 100.0);
        assert_eq!(entry.status, CommissionStatus::Pending);
        assert!(!entry.is_withdrawable());
    }

    #[test]
    fn test_withdrawable_requires_paid_and_unwithdrawn() {
        let mut entry = CommissionEntry::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            CommissionType::Booking,
            5.0,
            2000.0,
        );
        entry.mark_paid(Utc::now());
        assert!(entry.is_withdrawable());

        entry.withdrawn_at = Some(Utc::now());
        assert!(!entry.is_withdrawable());
    }
}
