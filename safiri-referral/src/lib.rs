pub mod ledger;
pub mod link;
pub mod models;
pub mod rates;
pub mod repository;

pub use ledger::{ClickOutcome, ConversionOutcome, LedgerError, ReferralLedger, WithdrawalReceipt};
pub use link::{can_generate_link, generate_referral_code, referral_link};
pub use models::{CommissionEntry, CommissionStatus, CommissionType, ReferralTracking, TrackingStatus};
pub use rates::{CategoryRates, RateTable, DEFAULT_COMMISSION_RATE, DEFAULT_SERVICE_FEE_RATE};
pub use repository::{RateSource, ReferralRepository};
