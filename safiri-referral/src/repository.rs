use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safiri_core::category::ItemCategory;
use uuid::Uuid;

use crate::models::{CommissionEntry, ReferralTracking};
use crate::rates::CategoryRates;

/// Repository trait for referral tracking and the commission ledger.
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn create_tracking(
        &self,
        tracking: &ReferralTracking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_tracking(
        &self,
        id: Uuid,
    ) -> Result<Option<ReferralTracking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Pending tracking row for the referrer/referred pair, if one exists.
    /// Backs the first-click-wins dedupe in `ReferralLedger::record_click`.
    async fn find_pending_tracking(
        &self,
        referrer_id: Uuid,
        referred_user_id: Option<Uuid>,
    ) -> Result<Option<ReferralTracking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Persist the commission entry and mark the tracking row converted as
    /// one unit: both are applied or neither is. Returns false without
    /// applying anything when the tracking was already converted (the
    /// idempotent retry path).
    async fn apply_conversion(
        &self,
        tracking_id: Uuid,
        converted_at: DateTime<Utc>,
        entry: &CommissionEntry,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn entries_for_referrer(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<CommissionEntry>, Box<dyn std::error::Error + Send + Sync>>;

    /// Mark the given entries withdrawn, re-checking under the store's write
    /// lock that every one of them is still withdrawable. Applies all or
    /// nothing, so two concurrent withdrawals cannot consume the same entry.
    async fn apply_withdrawal(
        &self,
        referrer_id: Uuid,
        entry_ids: &[Uuid],
        withdrawn_at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Rate-table collaborator. `None` means the category is unconfigured and
/// the caller falls back to the documented defaults.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn rates_for(
        &self,
        category: ItemCategory,
    ) -> Result<Option<CategoryRates>, Box<dyn std::error::Error + Send + Sync>>;
}
