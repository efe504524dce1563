pub mod form;
pub mod models;
pub mod orchestrator;
pub mod repository;
pub mod sequencer;
pub mod stats;
pub mod watcher;

pub use form::BookingFormState;
pub use models::{BookableItem, BookingRecord, BookingSelection, BookingStatus, Customer, GuestIdentity, PaymentMethod};
pub use orchestrator::{BookingOrchestrator, LogOnlyNotifier, MockPaymentProvider, SubmissionError};
pub use repository::BookingRepository;
pub use sequencer::{BookingStep, StepBlocked, StepSequencer, WizardContext};
pub use stats::{aggregate_host_stats, HostBookingStats};
pub use watcher::{OutcomeReducer, PaymentWatch};
