use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::BookingSelection;

/// The fixed superset of wizard steps, in canonical order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStep {
    VisitDate,
    PartySize,
    AddOns,
    GuestIdentity,
    Payment,
    Review,
}

const STEP_SUPERSET: [BookingStep; 6] = [
    BookingStep::VisitDate,
    BookingStep::PartySize,
    BookingStep::AddOns,
    BookingStep::GuestIdentity,
    BookingStep::Payment,
    BookingStep::Review,
];

/// Capability descriptor for one booking session; decides which steps exist.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WizardContext {
    pub has_add_ons: bool,
    pub is_guest_user: bool,
    pub is_paid_booking: bool,
    pub skip_date_selection: bool,
}

/// Why the current step refuses to advance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepBlocked {
    #[error("Select a visit date")]
    VisitDateMissing,
    #[error("Visit date cannot be in the past")]
    VisitDateInPast,
    #[error("At least one guest is required")]
    EmptyParty,
    #[error("Facility '{0}' needs a complete date range")]
    FacilityDatesIncomplete(String),
    #[error("Guest name, email and phone are all required")]
    GuestDetailsIncomplete,
    #[error("Select a payment method")]
    PaymentMethodMissing,
    #[error("Payment details are incomplete")]
    PaymentDetailsIncomplete,
    #[error("Booking total is invalid")]
    TotalInvalid,
}

/// Ordered, filtered list of wizard steps for one session.
///
/// `next`/`previous` walk the filtered list, never the superset, so
/// retreating from the step after `AddOns` lands on `PartySize` even when
/// `VisitDate` was skipped.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    ctx: WizardContext,
    steps: Vec<BookingStep>,
}

impl StepSequencer {
    pub fn new(ctx: WizardContext) -> Self {
        let steps = STEP_SUPERSET
            .iter()
            .copied()
            .filter(|step| match step {
                BookingStep::VisitDate => !ctx.skip_date_selection,
                BookingStep::AddOns => ctx.has_add_ons,
                BookingStep::GuestIdentity => ctx.is_guest_user,
                BookingStep::Payment => ctx.is_paid_booking,
                BookingStep::PartySize | BookingStep::Review => true,
            })
            .collect();

        Self { ctx, steps }
    }

    pub fn context(&self) -> &WizardContext {
        &self.ctx
    }

    pub fn steps(&self) -> &[BookingStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// PartySize and Review are always present, so the plan is never empty.
    pub fn first(&self) -> BookingStep {
        self.steps[0]
    }

    pub fn is_last(&self, step: BookingStep) -> bool {
        self.steps.last() == Some(&step)
    }

    /// 1-based position of a step after filtering and renumbering.
    pub fn step_number(&self, step: BookingStep) -> Option<usize> {
        self.steps.iter().position(|s| *s == step).map(|i| i + 1)
    }

    pub fn next(&self, current: BookingStep) -> Option<BookingStep> {
        let pos = self.steps.iter().position(|s| *s == current)?;
        self.steps.get(pos + 1).copied()
    }

    pub fn previous(&self, current: BookingStep) -> Option<BookingStep> {
        let pos = self.steps.iter().position(|s| *s == current)?;
        pos.checked_sub(1).map(|p| self.steps[p])
    }

    /// Gate for advancing past `step`. `today` anchors the visit-date check.
    pub fn validate(
        &self,
        step: BookingStep,
        selection: &BookingSelection,
        today: NaiveDate,
    ) -> Result<(), StepBlocked> {
        match step {
            BookingStep::VisitDate => match selection.visit_date {
                None => Err(StepBlocked::VisitDateMissing),
                Some(date) if date < today => Err(StepBlocked::VisitDateInPast),
                Some(_) => Ok(()),
            },
            BookingStep::PartySize => {
                if selection.party_size() >= 1 {
                    Ok(())
                } else {
                    Err(StepBlocked::EmptyParty)
                }
            }
            BookingStep::AddOns => self.validate_facility_dates(selection),
            BookingStep::GuestIdentity => match &selection.customer {
                Some(crate::models::Customer::Guest(identity)) if identity.is_complete() => Ok(()),
                _ => Err(StepBlocked::GuestDetailsIncomplete),
            },
            BookingStep::Payment => self.validate_payment(selection),
            BookingStep::Review => {
                // Everything price-affecting or submission-relevant re-checks
                // here so the final gate cannot be bypassed by step order.
                if selection.party_size() < 1 {
                    return Err(StepBlocked::EmptyParty);
                }
                self.validate_facility_dates(selection)?;
                if self.ctx.is_paid_booking {
                    self.validate_payment(selection)?;
                }
                Ok(())
            }
        }
    }

    /// Every selected facility must carry a complete, ordered date range; a
    /// selection without one must never silently contribute zero.
    fn validate_facility_dates(&self, selection: &BookingSelection) -> Result<(), StepBlocked> {
        for facility in &selection.facilities {
            if !facility.has_valid_dates() {
                return Err(StepBlocked::FacilityDatesIncomplete(facility.name.clone()));
            }
        }
        Ok(())
    }

    fn validate_payment(&self, selection: &BookingSelection) -> Result<(), StepBlocked> {
        match &selection.payment_method {
            None => Err(StepBlocked::PaymentMethodMissing),
            Some(method) if method.is_complete() => Ok(()),
            Some(_) => Err(StepBlocked::PaymentDetailsIncomplete),
        }
    }
}
