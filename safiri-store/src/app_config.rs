use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use safiri_core::category::ItemCategory;
use safiri_referral::rates::{CategoryRates, RateTable};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub commission: CommissionConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommissionConfig {
    #[serde(default = "default_service_fee_rate")]
    pub default_service_fee_rate: f64,
    #[serde(default = "default_commission_rate")]
    pub default_commission_rate: f64,
    /// Category slug ("trip", "hotel", ...) to rates. Unknown slugs are
    /// logged and skipped.
    #[serde(default)]
    pub categories: HashMap<String, CategoryRateConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryRateConfig {
    pub service_fee_rate: f64,
    pub commission_rate: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// ISO currency code passed through to the payment provider.
    pub currency: String,
}

fn default_service_fee_rate() -> f64 {
    20.0
}

fn default_commission_rate() -> f64 {
    5.0
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SAFIRI_COMMISSION__DEFAULT_COMMISSION_RATE=10`
            .add_source(config::Environment::with_prefix("SAFIRI").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Materialize the configured per-category rate table.
    pub fn rate_table(&self) -> RateTable {
        let mut table = RateTable::new();
        for (slug, rates) in &self.commission.categories {
            match ItemCategory::from_str(slug) {
                Ok(category) => table.set(
                    category,
                    CategoryRates {
                        service_fee_rate: rates.service_fee_rate,
                        commission_rate: rates.commission_rate,
                    },
                ),
                Err(e) => tracing::warn!("Skipping rate config entry: {}", e),
            }
        }
        table
    }
}
