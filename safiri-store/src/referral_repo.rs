use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use safiri_core::category::ItemCategory;
use safiri_referral::models::{CommissionEntry, ReferralTracking, TrackingStatus};
use safiri_referral::rates::{CategoryRates, RateTable};
use safiri_referral::repository::{RateSource, ReferralRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct ReferralState {
    tracking: HashMap<Uuid, ReferralTracking>,
    entries: HashMap<Uuid, CommissionEntry>,
}

/// In-memory referral store. One lock over tracking rows and commission
/// entries, so the conversion apply and the withdrawal re-check are each a
/// single consistent mutation.
pub struct InMemoryReferralRepository {
    state: RwLock<ReferralState>,
}

impl InMemoryReferralRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ReferralState::default()),
        }
    }
}

impl Default for InMemoryReferralRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReferralRepository for InMemoryReferralRepository {
    async fn create_tracking(
        &self,
        tracking: &ReferralTracking,
    ) -> Result<Uuid, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write().await;
        state.tracking.insert(tracking.id, tracking.clone());
        Ok(tracking.id)
    }

    async fn get_tracking(
        &self,
        id: Uuid,
    ) -> Result<Option<ReferralTracking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.state.read().await.tracking.get(&id).cloned())
    }

    async fn find_pending_tracking(
        &self,
        referrer_id: Uuid,
        referred_user_id: Option<Uuid>,
    ) -> Result<Option<ReferralTracking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .state
            .read()
            .await
            .tracking
            .values()
            .find(|t| {
                t.referrer_id == referrer_id
                    && t.referred_user_id == referred_user_id
                    && !t.is_converted()
            })
            .cloned())
    }

    async fn apply_conversion(
        &self,
        tracking_id: Uuid,
        converted_at: DateTime<Utc>,
        entry: &CommissionEntry,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write().await;
        let tracking = state
            .tracking
            .get_mut(&tracking_id)
            .ok_or_else(|| format!("Tracking row not found: {}", tracking_id))?;
        if tracking.is_converted() {
            // Raced with another conversion of the same row; apply nothing.
            return Ok(false);
        }
        tracking.status = TrackingStatus::Converted;
        tracking.converted_at = Some(converted_at);
        state.entries.insert(entry.id, entry.clone());
        Ok(true)
    }

    async fn entries_for_referrer(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<CommissionEntry>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .state
            .read()
            .await
            .entries
            .values()
            .filter(|e| e.referrer_id == referrer_id)
            .cloned()
            .collect())
    }

    async fn apply_withdrawal(
        &self,
        referrer_id: Uuid,
        entry_ids: &[Uuid],
        withdrawn_at: DateTime<Utc>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.write().await;
        // Re-check every entry under the write lock before mutating any, so
        // a withdrawal that raced another request fails whole.
        for id in entry_ids {
            match state.entries.get(id) {
                Some(entry) if entry.referrer_id == referrer_id && entry.is_withdrawable() => {}
                Some(_) => {
                    return Err(format!("Entry {} is no longer withdrawable", id).into());
                }
                None => return Err(format!("Entry not found: {}", id).into()),
            }
        }
        for id in entry_ids {
            if let Some(entry) = state.entries.get_mut(id) {
                entry.withdrawn_at = Some(withdrawn_at);
            }
        }
        Ok(())
    }
}

/// Rate source backed by the configured table. Unconfigured categories map
/// to `None`, so the ledger applies its documented defaults.
pub struct StaticRateSource {
    table: RateTable,
}

impl StaticRateSource {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn rates_for(
        &self,
        category: ItemCategory,
    ) -> Result<Option<CategoryRates>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.table.get(category))
    }
}
