use serde::{Deserialize, Serialize};

/// Bookable item categories across the marketplace. Commission and service
/// fee rates are configured per category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Trip,
    Event,
    Hotel,
    Attraction,
    AdventurePlace,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Trip => "trip",
            ItemCategory::Event => "event",
            ItemCategory::Hotel => "hotel",
            ItemCategory::Attraction => "attraction",
            ItemCategory::AdventurePlace => "adventure_place",
        }
    }
}

impl std::str::FromStr for ItemCategory {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trip" => Ok(ItemCategory::Trip),
            "event" => Ok(ItemCategory::Event),
            "hotel" => Ok(ItemCategory::Hotel),
            "attraction" => Ok(ItemCategory::Attraction),
            "adventure_place" => Ok(ItemCategory::AdventurePlace),
            other => Err(crate::CoreError::ValidationError(format!(
                "Unknown item category: {}",
                other
            ))),
        }
    }
}


impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
