use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether an item charges an entrance fee at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntranceType {
    Free,
    Paid,
}

/// A date-ranged facility rental picked in the wizard (e.g. a cottage or a
/// conference room). Dates start out empty and must be entered explicitly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacilitySelection {
    pub name: String,
    pub unit_price: f64,
    pub capacity: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FacilitySelection {
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            capacity: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Both dates present and ordered.
    pub fn has_valid_dates(&self) -> bool {
        matches!(
            (self.start_date, self.end_date),
            (Some(start), Some(end)) if end >= start
        )
    }

    /// Chargeable rental days, minimum one. A same-day rental charges a full
    /// day. `None` when the date range is absent or inverted.
    pub fn rental_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days().max(1)),
            _ => None,
        }
    }
}

/// A per-person activity add-on (e.g. a boat ride or a guided hike).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivitySelection {
    pub name: String,
    pub unit_price: f64,
    pub people_count: u32,
}

impl ActivitySelection {
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            people_count: 1,
        }
    }
}
