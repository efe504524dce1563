use chrono::{DateTime, NaiveDate, Utc};
use safiri_core::category::ItemCategory;
use safiri_pricing::{ActivitySelection, EntranceType, FacilitySelection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sequencer::WizardContext;

/// Payment method chosen in the wizard, with method-specific fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney {
        phone: String,
    },
    Card {
        number: String,
        expiry: String,
        cvv: String,
    },
    Cash,
}

impl PaymentMethod {
    /// All method-specific required fields present and non-empty.
    pub fn is_complete(&self) -> bool {
        match self {
            PaymentMethod::MobileMoney { phone } => !phone.trim().is_empty(),
            PaymentMethod::Card { number, expiry, cvv } => {
                !number.trim().is_empty() && !expiry.trim().is_empty() && !cvv.trim().is_empty()
            }
            PaymentMethod::Cash => true,
        }
    }

    /// Account handed to the payment provider when opening a checkout.
    pub fn billing_account(&self) -> &str {
        match self {
            PaymentMethod::MobileMoney { phone } => phone,
            PaymentMethod::Card { number, .. } => number,
            PaymentMethod::Cash => "",
        }
    }
}

/// Contact details collected from unauthenticated bookers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuestIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl GuestIdentity {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
    }
}

/// Who is booking: collected guest details, or a reference to an
/// authenticated user. Exactly one applies per booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Customer {
    Guest(GuestIdentity),
    User { user_id: Uuid },
}

impl Customer {
    pub fn email(&self) -> Option<&str> {
        match self {
            Customer::Guest(identity) => Some(&identity.email),
            Customer::User { .. } => None,
        }
    }
}

/// Mutable draft assembled by the wizard. Mutated only through
/// `BookingFormState` setters and never persisted directly; the derived
/// `BookingRecord` is what gets stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingSelection {
    pub visit_date: Option<NaiveDate>,
    pub party_adults: u32,
    pub party_children: u32,
    pub facilities: Vec<FacilitySelection>,
    pub activities: Vec<ActivitySelection>,
    pub customer: Option<Customer>,
    pub payment_method: Option<PaymentMethod>,
}

impl BookingSelection {
    pub fn party_size(&self) -> u32 {
        self.party_adults + self.party_children
    }
}

/// What the wizard needs to know about the item being booked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookableItem {
    pub id: Uuid,
    pub category: ItemCategory,
    pub host_id: Uuid,
    pub name: String,
    pub entrance_type: EntranceType,
    pub adult_price: f64,
    pub child_price: f64,
    /// Set for items with a fixed event date; the wizard skips date selection.
    pub fixed_date: Option<NaiveDate>,
    /// Facility add-ons offered by the item, with their unit prices.
    pub facilities: Vec<FacilitySelection>,
    /// Activity add-ons offered by the item, with their unit prices.
    pub activities: Vec<ActivitySelection>,
}

impl BookableItem {
    /// Anything on this item that could produce a charge.
    pub fn is_paid(&self) -> bool {
        self.entrance_type == EntranceType::Paid
            || self.facilities.iter().any(|f| f.unit_price > 0.0)
            || self.activities.iter().any(|a| a.unit_price > 0.0)
    }

    /// Capability descriptor driving which wizard steps exist.
    pub fn wizard_context(&self, authenticated: bool) -> WizardContext {
        WizardContext {
            has_add_ons: !self.facilities.is_empty() || !self.activities.is_empty(),
            is_guest_user: !authenticated,
            is_paid_booking: self.is_paid(),
            skip_date_selection: self.fixed_date.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

/// The immutable submission payload. Only the status (and timestamps) change
/// after creation; records are never deleted, cancellation is a status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    pub category: ItemCategory,
    pub host_id: Uuid,
    pub item_name: String,
    pub total_amount: f64,
    /// Seats/slots consumed: adults plus children.
    pub slot_count: u32,
    pub selection: BookingSelection,
    pub customer: Customer,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn update_status(&mut self, new_status: BookingStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}
