use crate::selection::{ActivitySelection, EntranceType, FacilitySelection};

/// Entrance fee for the party. Free items always charge zero, regardless of
/// the configured per-head prices.
pub fn entrance_fee(
    adults: u32,
    children: u32,
    price_adult: f64,
    price_child: f64,
    entrance_type: EntranceType,
) -> f64 {
    match entrance_type {
        EntranceType::Free => 0.0,
        EntranceType::Paid => adults as f64 * price_adult + children as f64 * price_child,
    }
}

/// Cost of one facility rental: unit price times chargeable days, minimum one
/// day. A selection without a valid date range contributes zero here; callers
/// must treat it as incomplete and block submission rather than charge it.
pub fn facility_cost(selection: &FacilitySelection) -> f64 {
    match selection.rental_days() {
        Some(days) => selection.unit_price * days as f64,
        None => 0.0,
    }
}

/// Cost of one activity add-on: unit price per person, people floor-clamped
/// to one.
pub fn activity_cost(selection: &ActivitySelection) -> f64 {
    selection.unit_price * selection.people_count.max(1) as f64
}

/// Total booking amount. Raw sum, no sub-unit rounding.
pub fn booking_total(
    entrance_fee: f64,
    facilities: &[FacilitySelection],
    activities: &[ActivitySelection],
) -> f64 {
    entrance_fee
        + facilities.iter().map(facility_cost).sum::<f64>()
        + activities.iter().map(activity_cost).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_free_entrance_charges_nothing() {
        let fee = entrance_fee(2, 3, 500.0, 250.0, EntranceType::Free);
        assert_eq!(fee, 0.0);
    }

    #[test]
    fn test_paid_entrance_per_head() {
        let fee = entrance_fee(2, 3, 500.0, 250.0, EntranceType::Paid);
        assert_eq!(fee, 1750.0);
    }

    #[test]
    fn test_same_day_rental_charges_one_full_day() {
        let mut facility = FacilitySelection::new("Cottage", 3000.0);
        facility.start_date = Some(date(2026, 9, 10));
        facility.end_date = Some(date(2026, 9, 10));

        assert_eq!(facility_cost(&facility), 3000.0);
    }

    #[test]
    fn test_multi_day_rental_prorates_by_day() {
        let mut facility = FacilitySelection::new("Cottage", 3000.0);
        facility.start_date = Some(date(2026, 9, 10));
        facility.end_date = Some(date(2026, 9, 13));

        assert_eq!(facility_cost(&facility), 9000.0);
    }

    #[test]
    fn test_valid_rental_never_costs_less_than_unit_price() {
        let mut facility = FacilitySelection::new("Boat dock", 1200.0);
        facility.start_date = Some(date(2026, 9, 1));
        facility.end_date = Some(date(2026, 9, 1));

        assert!(facility_cost(&facility) >= facility.unit_price);
    }

    #[test]
    fn test_missing_or_inverted_dates_block_instead_of_charging() {
        let mut facility = FacilitySelection::new("Cottage", 3000.0);
        assert!(!facility.has_valid_dates());
        assert_eq!(facility_cost(&facility), 0.0);

        facility.start_date = Some(date(2026, 9, 13));
        facility.end_date = Some(date(2026, 9, 10));
        assert!(!facility.has_valid_dates());
        assert_eq!(facility_cost(&facility), 0.0);
    }

    #[test]
    fn test_activity_cost_scales_with_people() {
        let mut activity = ActivitySelection::new("Boat ride", 800.0);
        let single = activity_cost(&activity);

        activity.people_count = 3;
        assert_eq!(activity_cost(&activity), single * 3.0);
    }

    #[test]
    fn test_activity_people_floor_clamped_to_one() {
        let mut activity = ActivitySelection::new("Boat ride", 800.0);
        activity.people_count = 0;
        assert_eq!(activity_cost(&activity), 800.0);
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let mut facility = FacilitySelection::new("Cottage", 3000.0);
        facility.start_date = Some(date(2026, 9, 10));
        facility.end_date = Some(date(2026, 9, 12));

        let mut activity = ActivitySelection::new("Boat ride", 800.0);
        activity.people_count = 2;

        let fee = entrance_fee(2, 1, 500.0, 250.0, EntranceType::Paid);
        let total = booking_total(fee, &[facility.clone()], &[activity.clone()]);

        assert_eq!(total, fee + facility_cost(&facility) + activity_cost(&activity));
        assert_eq!(total, 1250.0 + 6000.0 + 1600.0);
    }
}
