use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::form::BookingFormState;
use crate::models::{BookingRecord, BookingStatus};
use crate::repository::BookingRepository;
use crate::watcher::PaymentWatch;
use safiri_core::notify::{BookingConfirmation, ConfirmationNotifier};
use safiri_core::payment::{CheckoutSession, PaymentProvider, ProviderEvent};

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Booking is not ready to submit: {0}")]
    NotReady(#[from] crate::sequencer::StepBlocked),

    #[error("A submission is already in progress for this session")]
    AlreadyInFlight,

    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

/// Drives a wizard draft through submission, payment and confirmation.
pub struct BookingOrchestrator {
    repo: Arc<dyn BookingRepository>,
    provider: Arc<dyn PaymentProvider>,
    notifier: Arc<dyn ConfirmationNotifier>,
    currency: String,
}

impl BookingOrchestrator {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        provider: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn ConfirmationNotifier>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            provider,
            notifier,
            currency: currency.into(),
        }
    }

    /// Submit the wizard draft. The PENDING record is persisted before any
    /// provider call, so a checkout is never opened for a booking that does
    /// not exist. For paid bookings the returned `PaymentWatch` tracks the
    /// provider's status pushes. The form is locked for the duration so
    /// duplicate taps cannot submit twice.
    pub async fn submit(
        &self,
        form: &mut BookingFormState,
    ) -> Result<(BookingRecord, Option<PaymentWatch>), SubmissionError> {
        if !form.begin_submission() {
            return Err(SubmissionError::AlreadyInFlight);
        }
        let result = self.submit_locked(form).await;
        form.end_submission();
        result
    }

    async fn submit_locked(
        &self,
        form: &mut BookingFormState,
    ) -> Result<(BookingRecord, Option<PaymentWatch>), SubmissionError> {
        let mut record = form.build_record()?;

        self.repo
            .create_booking(&record)
            .await
            .map_err(|e| SubmissionError::Persistence(e.to_string()))?;

        // The checkout only opens against a persisted record. If the
        // provider call fails the booking stays PENDING without a reference
        // and can be retried.
        let watch = if form.context().is_paid_booking {
            let account = record
                .payment_method
                .as_ref()
                .map(|m| m.billing_account().to_string())
                .unwrap_or_default();
            let session = self
                .provider
                .initiate_checkout(record.id, record.total_amount, &self.currency, &account)
                .await
                .map_err(|e| SubmissionError::Provider(e.to_string()))?;
            self.repo
                .set_payment_reference(record.id, &session.reference)
                .await
                .map_err(|e| SubmissionError::Persistence(e.to_string()))?;
            record.payment_reference = Some(session.reference.clone());
            Some(PaymentWatch::spawn(session.reference, session.events))
        } else {
            None
        };

        tracing::info!(
            "Booking {} submitted for item {} (total {})",
            record.id,
            record.item_id,
            record.total_amount
        );
        Ok((record, watch))
    }

    /// Payment confirmed for a pending booking: mark it PAID and fire the
    /// guest/host confirmations. Notification failures are logged, never
    /// propagated.
    pub async fn confirm_paid(&self, booking_id: Uuid) -> Result<(), SubmissionError> {
        let booking = self.transition(booking_id, BookingStatus::Paid).await?;
        tracing::info!("Booking {} marked as PAID", booking_id);

        let confirmation = BookingConfirmation {
            booking_id,
            host_id: booking.host_id,
            guest_email: booking.customer.email().map(String::from),
            item_name: booking.item_name.clone(),
            total_amount: booking.total_amount,
        };
        if let Err(e) = self.notifier.booking_confirmed(&confirmation).await {
            tracing::warn!("Confirmation delivery failed for booking {}: {}", booking_id, e);
        }
        Ok(())
    }

    /// Terminal payment failure: leave the record retryable as FAILED.
    pub async fn mark_failed(&self, booking_id: Uuid) -> Result<(), SubmissionError> {
        self.transition(booking_id, BookingStatus::Failed).await?;
        tracing::info!("Booking {} marked as FAILED", booking_id);
        Ok(())
    }

    /// Cancellation is a status change, never a delete.
    pub async fn cancel(&self, booking_id: Uuid) -> Result<(), SubmissionError> {
        self.transition(booking_id, BookingStatus::Cancelled).await?;
        tracing::info!("Booking {} marked as CANCELLED", booking_id);
        Ok(())
    }

    async fn transition(
        &self,
        booking_id: Uuid,
        to: BookingStatus,
    ) -> Result<BookingRecord, SubmissionError> {
        let booking = self
            .repo
            .get_booking(booking_id)
            .await
            .map_err(|e| SubmissionError::Persistence(e.to_string()))?
            .ok_or(SubmissionError::NotFound(booking_id))?;

        let allowed = match to {
            // PAID and FAILED only ever follow PENDING.
            BookingStatus::Paid | BookingStatus::Failed => booking.status == BookingStatus::Pending,
            BookingStatus::Cancelled => booking.status != BookingStatus::Cancelled,
            BookingStatus::Pending => false,
        };
        if !allowed {
            return Err(SubmissionError::InvalidTransition {
                from: booking.status,
                to,
            });
        }

        // Conditional write: the store re-checks the status it is replacing,
        // so a transition decided against this (possibly stale) read cannot
        // clobber one that landed in between.
        self.repo
            .update_booking_status(booking_id, booking.status, to)
            .await
            .map_err(|e| SubmissionError::Persistence(e.to_string()))?;
        Ok(booking)
    }
}

/// Test double for the payment provider. Keeps the sender side of every
/// opened checkout so tests can push status events by reference.
pub struct MockPaymentProvider {
    senders: Mutex<HashMap<String, mpsc::Sender<ProviderEvent>>>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Push a provider event for the given checkout reference.
    pub async fn push(&self, reference: &str, event: ProviderEvent) -> bool {
        let senders = self.senders.lock().await;
        match senders.get(reference) {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Number of checkouts opened so far.
    pub async fn open_checkouts(&self) -> usize {
        self.senders.lock().await.len()
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn initiate_checkout(
        &self,
        booking_id: Uuid,
        _amount: f64,
        _currency: &str,
        _account: &str,
    ) -> Result<CheckoutSession, Box<dyn std::error::Error + Send + Sync>> {
        let reference = format!("mock_chk_{}", booking_id.simple());
        let (tx, rx) = mpsc::channel(16);
        self.senders.lock().await.insert(reference.clone(), tx);
        Ok(CheckoutSession {
            reference,
            events: rx,
        })
    }
}

/// Notifier that only logs. Stands in for the real delivery collaborator in
/// tests and local runs.
pub struct LogOnlyNotifier;


#[async_trait::async_trait]
impl ConfirmationNotifier for LogOnlyNotifier {
    async fn booking_confirmed(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Confirmation for booking {} (host {})",
            confirmation.booking_id,
            confirmation.host_id
        );
        Ok(())
    }
}
