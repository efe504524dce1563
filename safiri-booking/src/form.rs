use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    BookableItem, BookingRecord, BookingSelection, BookingStatus, Customer, GuestIdentity,
    PaymentMethod,
};
use crate::sequencer::{BookingStep, StepBlocked, StepSequencer, WizardContext};
use safiri_pricing as pricing;
use safiri_pricing::ActivitySelection;

/// One wizard session: owns the draft selection and the current step pointer.
/// A session is exclusively owned by one dialog; it is discarded on submit
/// success or when the dialog closes.
#[derive(Debug)]
pub struct BookingFormState {
    item: BookableItem,
    sequencer: StepSequencer,
    selection: BookingSelection,
    current: BookingStep,
    blocked: Option<StepBlocked>,
    /// Set while a mutating collaborator call is outstanding; gates advance
    /// and submit so a double-tap cannot submit twice.
    busy: bool,
}

impl BookingFormState {
    /// Open a session for `item`. Pre-seeds the fixed date and, for
    /// authenticated users, the customer reference.
    pub fn open(item: BookableItem, user_id: Option<Uuid>) -> Self {
        let ctx = item.wizard_context(user_id.is_some());
        let sequencer = StepSequencer::new(ctx);

        let mut selection = BookingSelection::default();
        selection.visit_date = item.fixed_date;
        if let Some(user_id) = user_id {
            selection.customer = Some(Customer::User { user_id });
        }

        let current = sequencer.first();
        Self {
            item,
            sequencer,
            selection,
            current,
            blocked: None,
            busy: false,
        }
    }

    pub fn item(&self) -> &BookableItem {
        &self.item
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn context(&self) -> &WizardContext {
        self.sequencer.context()
    }

    pub fn current_step(&self) -> BookingStep {
        self.current
    }

    /// 1-based number of the current step within the filtered plan.
    pub fn current_step_number(&self) -> usize {
        self.sequencer.step_number(self.current).unwrap_or(1)
    }

    /// The validation error that blocked the last `advance`, if any.
    pub fn blocking_error(&self) -> Option<&StepBlocked> {
        self.blocked.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_visit_date(&mut self, date: NaiveDate) {
        self.selection.visit_date = Some(date);
    }

    pub fn set_party_size(&mut self, adults: u32, children: u32) {
        self.selection.party_adults = adults;
        self.selection.party_children = children;
    }

    pub fn set_guest_identity(&mut self, name: &str, email: &str, phone: &str) {
        self.selection.customer = Some(Customer::Guest(GuestIdentity {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }));
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.selection.payment_method = Some(method);
    }

    /// Idempotent add/remove of a facility offered by the item. On add the
    /// date range starts empty so the user must enter it explicitly.
    pub fn toggle_facility(&mut self, name: &str) -> bool {
        if let Some(pos) = self.selection.facilities.iter().position(|f| f.name == name) {
            self.selection.facilities.remove(pos);
            return true;
        }
        match self.item.facilities.iter().find(|f| f.name == name) {
            Some(offered) => {
                let mut picked = offered.clone();
                picked.start_date = None;
                picked.end_date = None;
                self.selection.facilities.push(picked);
                true
            }
            None => false,
        }
    }

    /// Idempotent add/remove of an activity offered by the item. On add the
    /// people count defaults to one.
    pub fn toggle_activity(&mut self, name: &str) -> bool {
        if let Some(pos) = self.selection.activities.iter().position(|a| a.name == name) {
            self.selection.activities.remove(pos);
            return true;
        }
        match self.item.activities.iter().find(|a| a.name == name) {
            Some(offered) => {
                self.selection
                    .activities
                    .push(ActivitySelection::new(offered.name.clone(), offered.unit_price));
                true
            }
            None => false,
        }
    }

    pub fn update_facility_dates(&mut self, name: &str, start: NaiveDate, end: NaiveDate) -> bool {
        match self.selection.facilities.iter_mut().find(|f| f.name == name) {
            Some(facility) => {
                facility.start_date = Some(start);
                facility.end_date = Some(end);
                true
            }
            None => false,
        }
    }

    /// People count is floor-clamped to one.
    pub fn update_activity_people(&mut self, name: &str, people: u32) -> bool {
        match self.selection.activities.iter_mut().find(|a| a.name == name) {
            Some(activity) => {
                activity.people_count = people.max(1);
                true
            }
            None => false,
        }
    }

    /// Advance to the next step if the current step's validator passes.
    /// Returns false (and records the blocking error) otherwise; the caller
    /// surfaces that as a blocking UI state.
    pub fn advance(&mut self) -> bool {
        if self.busy {
            return false;
        }
        let today = Utc::now().date_naive();
        match self.sequencer.validate(self.current, &self.selection, today) {
            Ok(()) => {
                self.blocked = None;
                match self.sequencer.next(self.current) {
                    Some(next) => {
                        self.current = next;
                        true
                    }
                    None => false,
                }
            }
            Err(blocked) => {
                self.blocked = Some(blocked);
                false
            }
        }
    }

    /// Step back without validation. Returns false on the first step.
    pub fn retreat(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.blocked = None;
        match self.sequencer.previous(self.current) {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Live total for the current selection; delegates to the pricing
    /// calculator. Invalid facility ranges contribute zero here and are
    /// caught by the Review gate instead.
    pub fn compute_total(&self) -> f64 {
        let fee = pricing::entrance_fee(
            self.selection.party_adults,
            self.selection.party_children,
            self.item.adult_price,
            self.item.child_price,
            self.item.entrance_type,
        );
        pricing::booking_total(fee, &self.selection.facilities, &self.selection.activities)
    }

    /// Final submission gate: the Review validator plus a sane total.
    pub fn can_submit(&self) -> bool {
        let today = Utc::now().date_naive();
        self.sequencer
            .validate(BookingStep::Review, &self.selection, today)
            .is_ok()
            && self.compute_total() >= 0.0
    }

    /// Snapshot the draft into the immutable submission payload.
    pub fn build_record(&self) -> Result<BookingRecord, StepBlocked> {
        let today = Utc::now().date_naive();
        self.sequencer
            .validate(BookingStep::Review, &self.selection, today)?;

        let total = self.compute_total();
        if total < 0.0 {
            return Err(StepBlocked::TotalInvalid);
        }
        let customer = match &self.selection.customer {
            Some(customer) => customer.clone(),
            None => return Err(StepBlocked::GuestDetailsIncomplete),
        };

        let now = Utc::now();
        Ok(BookingRecord {
            id: Uuid::new_v4(),
            item_id: self.item.id,
            category: self.item.category,
            host_id: self.item.host_id,
            item_name: self.item.name.clone(),
            total_amount: total,
            slot_count: self.selection.party_size(),
            selection: self.selection.clone(),
            customer,
            payment_method: self.selection.payment_method.clone(),
            payment_reference: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Take the busy flag. Returns false when a submission is already
    /// outstanding.
    pub(crate) fn begin_submission(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub(crate) fn end_submission(&mut self) {
        self.busy = false;
    }
}
