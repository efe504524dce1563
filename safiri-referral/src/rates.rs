use std::collections::HashMap;

use safiri_core::category::ItemCategory;
use serde::{Deserialize, Serialize};

/// Default platform share of the gross booking amount, in percent.
pub const DEFAULT_SERVICE_FEE_RATE: f64 = 20.0;
/// Default referrer share of the service fee, in percent.
pub const DEFAULT_COMMISSION_RATE: f64 = 5.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CategoryRates {
    pub service_fee_rate: f64,
    pub commission_rate: f64,
}

impl Default for CategoryRates {
    fn default() -> Self {
        Self {
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

/// Per-category commission configuration. An unconfigured category falls
/// back to the defaults rather than failing a conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    rates: HashMap<ItemCategory, CategoryRates>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: ItemCategory, rates: CategoryRates) {
        self.rates.insert(category, rates);
    }

    /// Configured rates, if any.
    pub fn get(&self, category: ItemCategory) -> Option<CategoryRates> {
        self.rates.get(&category).copied()
    }

    /// Configured rates or the documented defaults.
    pub fn rates_for(&self, category: ItemCategory) -> CategoryRates {
        self.get(category).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_category_falls_back_to_defaults() {
        let mut table = RateTable::new();
        table.set(
            ItemCategory::Hotel,
            CategoryRates {
                service_fee_rate: 15.0,
                commission_rate: 10.0,
            },
        );

        assert_eq!(
            table.rates_for(ItemCategory::Hotel),
            CategoryRates {
                service_fee_rate: 15.0,
                commission_rate: 10.0,
            }
        );
        assert_eq!(
            table.rates_for(ItemCategory::Trip),
            CategoryRates {
                service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
                commission_rate: DEFAULT_COMMISSION_RATE,
            }
        );
        assert!(table.get(ItemCategory::Trip).is_none());
    }
}
