pub mod calculator;
pub mod selection;

pub use calculator::{activity_cost, booking_total, entrance_fee, facility_cost};
pub use selection::{ActivitySelection, EntranceType, FacilitySelection};
