pub mod app_config;
pub mod booking_repo;
pub mod referral_repo;

pub use app_config::{CategoryRateConfig, CommissionConfig, Config, PaymentConfig};
pub use booking_repo::InMemoryBookingRepository;
pub use referral_repo::{InMemoryReferralRepository, StaticRateSource};
