use std::sync::Arc;

use chrono::{DateTime, Utc};
use safiri_core::category::ItemCategory;
use uuid::Uuid;

use crate::models::{CommissionEntry, CommissionType, ReferralTracking};
use crate::rates::CategoryRates;
use crate::repository::{RateSource, ReferralRepository};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient withdrawable balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Withdrawal amount must be positive")]
    NonPositiveAmount,

    #[error("Rate lookup failed: {0}")]
    RateLookup(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Outcome of a referral click.
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// First qualifying click for this referrer/referred pair; a tracking
    /// row was created.
    Tracked(ReferralTracking),
    /// A pending row for the pair already exists; it is returned unchanged.
    AlreadyTracked(ReferralTracking),
}

impl ClickOutcome {
    pub fn tracking(&self) -> &ReferralTracking {
        match self {
            ClickOutcome::Tracked(t) | ClickOutcome::AlreadyTracked(t) => t,
        }
    }
}

/// Outcome of a conversion attempt.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// Commission credited and the tracking row converted.
    Recorded(CommissionEntry),
    /// Tracking row absent or already converted; nothing was applied.
    Skipped,
}

/// Receipt for a completed withdrawal. The marked entries cover the
/// requested amount; because whole entries are consumed, the consumed total
/// may minimally exceed the request.
#[derive(Debug, Clone)]
pub struct WithdrawalReceipt {
    pub referrer_id: Uuid,
    pub requested_amount: f64,
    pub consumed_amount: f64,
    pub entry_ids: Vec<Uuid>,
    pub withdrawn_at: DateTime<Utc>,
}

/// Computes commissions for converted referrals and maintains the
/// withdrawable/lifetime balances.
pub struct ReferralLedger {
    repo: Arc<dyn ReferralRepository>,
    rates: Arc<dyn RateSource>,
}

impl ReferralLedger {
    pub fn new(repo: Arc<dyn ReferralRepository>, rates: Arc<dyn RateSource>) -> Self {
        Self { repo, rates }
    }

    /// Record a qualifying click on a referral link. The first click for a
    /// referrer/referred pair creates the tracking row that a later
    /// conversion credits against; repeat clicks while that row is still
    /// pending are no-ops so a visitor reloading the link cannot spawn
    /// duplicate attributions.
    pub async fn record_click(
        &self,
        referrer_id: Uuid,
        referred_user_id: Option<Uuid>,
        item_id: Option<Uuid>,
        item_category: Option<ItemCategory>,
    ) -> Result<ClickOutcome, LedgerError> {
        if let Some(existing) = self
            .repo
            .find_pending_tracking(referrer_id, referred_user_id)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?
        {
            return Ok(ClickOutcome::AlreadyTracked(existing));
        }

        let tracking = ReferralTracking::new(referrer_id, referred_user_id, item_id, item_category);
        self.repo
            .create_tracking(&tracking)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        tracing::info!(
            "Referral click tracked: referrer {}, tracking {}",
            referrer_id,
            tracking.id
        );
        Ok(ClickOutcome::Tracked(tracking))
    }

    /// Credit the referrer for a paid booking attributed to `tracking_id`.
    ///
    /// Idempotent: an absent or already-converted tracking row is a silent
    /// no-op, because payment confirmation and referral crediting can both
    /// attempt this from independent async paths.
    ///
    /// Commission is a percentage of the service fee, which is itself a
    /// percentage of the gross booking amount. The two stages are configured
    /// independently and must not be collapsed into one combined rate.
    pub async fn record_conversion(
        &self,
        tracking_id: Uuid,
        booking_id: Uuid,
        booking_amount: f64,
    ) -> Result<ConversionOutcome, LedgerError> {
        let tracking = match self
            .repo
            .get_tracking(tracking_id)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?
        {
            Some(tracking) => tracking,
            None => return Ok(ConversionOutcome::Skipped),
        };
        if tracking.is_converted() {
            return Ok(ConversionOutcome::Skipped);
        }

        let rates = match tracking.item_category {
            Some(category) => self
                .rates
                .rates_for(category)
                .await
                .map_err(|e| LedgerError::RateLookup(e.to_string()))?
                .unwrap_or_default(),
            None => CategoryRates::default(),
        };

        let service_fee_amount = booking_amount * rates.service_fee_rate / 100.0;
        let mut entry = CommissionEntry::new(
            tracking.referrer_id,
            tracking.referred_user_id,
            booking_id,
            CommissionType::Booking,
            rates.commission_rate,
            service_fee_amount,
        );
        let now = Utc::now();
        entry.mark_paid(now);

        let applied = self
            .repo
            .apply_conversion(tracking_id, now, &entry)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;
        if !applied {
            // Lost the race against a concurrent conversion of the same row.
            return Ok(ConversionOutcome::Skipped);
        }

        tracing::info!(
            "Commission {} credited to referrer {} for booking {} ({} of service fee {})",
            entry.commission_amount,
            entry.referrer_id,
            booking_id,
            entry.rate,
            service_fee_amount
        );
        Ok(ConversionOutcome::Recorded(entry))
    }

    /// Sum of paid, not-yet-withdrawn entries.
    pub async fn withdrawable_balance(&self, referrer_id: Uuid) -> Result<f64, LedgerError> {
        let entries = self.entries(referrer_id).await?;
        Ok(entries
            .iter()
            .filter(|e| e.is_withdrawable())
            .map(|e| e.commission_amount)
            .sum())
    }

    /// Sum of all paid entries regardless of withdrawal state. Reported
    /// separately from the withdrawable balance, never conflated.
    pub async fn lifetime_earnings(&self, referrer_id: Uuid) -> Result<f64, LedgerError> {
        let entries = self.entries(referrer_id).await?;
        Ok(entries
            .iter()
            .filter(|e| e.paid_at.is_some())
            .map(|e| e.commission_amount)
            .sum())
    }

    /// Withdraw `amount` by consuming whole entries, oldest paid first for a
    /// deterministic audit trail. Fails with `InsufficientBalance` (and no
    /// mutation) when the withdrawable balance cannot cover the request.
    pub async fn withdraw(
        &self,
        referrer_id: Uuid,
        amount: f64,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        if amount <= 0.0 {
            return Err(LedgerError::NonPositiveAmount);
        }

        let mut entries = self.entries(referrer_id).await?;
        entries.retain(|e| e.is_withdrawable());
        entries.sort_by_key(|e| (e.paid_at, e.created_at, e.id));

        let available: f64 = entries.iter().map(|e| e.commission_amount).sum();
        if amount > available {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let mut consumed = 0.0;
        let mut entry_ids = Vec::new();
        for entry in &entries {
            if consumed >= amount {
                break;
            }
            consumed += entry.commission_amount;
            entry_ids.push(entry.id);
        }

        let withdrawn_at = Utc::now();
        self.repo
            .apply_withdrawal(referrer_id, &entry_ids, withdrawn_at)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))?;

        tracing::info!(
            "Referrer {} withdrew {} across {} entries",
            referrer_id,
            consumed,
            entry_ids.len()
        );
        Ok(WithdrawalReceipt {
            referrer_id,
            requested_amount: amount,
            consumed_amount: consumed,
            entry_ids,
            withdrawn_at,
        })
    }

    async fn entries(&self, referrer_id: Uuid) -> Result<Vec<CommissionEntry>, LedgerError> {
        self.repo
            .entries_for_referrer(referrer_id)
            .await
            .map_err(|e| LedgerError::Persistence(e.to_string()))
    }
}
