use safiri_core::payment::{
    PaymentOutcome, ProviderEvent, ProviderEventStatus, RESULT_CODE_USER_CANCELLED,
    RESULT_CODE_WRONG_PIN,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Latching reducer from raw provider events to a payment outcome.
///
/// Once a terminal outcome is reached, later events for the same reference
/// are ignored; events for other references are ignored outright.
#[derive(Debug)]
pub struct OutcomeReducer {
    reference: String,
    outcome: PaymentOutcome,
}

impl OutcomeReducer {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            outcome: PaymentOutcome::Processing,
        }
    }

    pub fn outcome(&self) -> PaymentOutcome {
        self.outcome
    }

    pub fn apply(&mut self, event: &ProviderEvent) -> PaymentOutcome {
        if self.outcome.is_terminal() || event.reference != self.reference {
            return self.outcome;
        }
        self.outcome = match event.status {
            ProviderEventStatus::Pending => PaymentOutcome::Processing,
            ProviderEventStatus::Completed => PaymentOutcome::Success,
            ProviderEventStatus::Failed => match event.result_code.as_deref() {
                Some(RESULT_CODE_USER_CANCELLED) => PaymentOutcome::CancelledByUser,
                Some(RESULT_CODE_WRONG_PIN) => PaymentOutcome::PinError,
                _ => PaymentOutcome::GenericFailure,
            },
        };
        self.outcome
    }
}

/// Scoped subscription to one checkout reference.
///
/// The consuming task is aborted when the handle drops, so a closed booking
/// dialog can never receive a stale callback for a discarded draft.
#[derive(Debug)]
pub struct PaymentWatch {
    reference: String,
    outcome_rx: watch::Receiver<PaymentOutcome>,
    task: JoinHandle<()>,
}

impl PaymentWatch {
    pub fn spawn(reference: String, mut events: mpsc::Receiver<ProviderEvent>) -> Self {
        let (outcome_tx, outcome_rx) = watch::channel(PaymentOutcome::Processing);
        let task_reference = reference.clone();

        let task = tokio::spawn(async move {
            let mut reducer = OutcomeReducer::new(task_reference.clone());
            while let Some(event) = events.recv().await {
                let outcome = reducer.apply(&event);
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
                if outcome.is_terminal() {
                    tracing::info!(
                        "Checkout {} reached terminal outcome {:?}",
                        task_reference,
                        outcome
                    );
                    break;
                }
            }
        });

        Self {
            reference,
            outcome_rx,
            task,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn outcome(&self) -> PaymentOutcome {
        *self.outcome_rx.borrow()
    }

    /// Wait until the outcome leaves `Processing`. Returns the last observed
    /// outcome if the provider channel closes first.
    pub async fn wait_terminal(&mut self) -> PaymentOutcome {
        loop {
            let outcome = *self.outcome_rx.borrow();
            if outcome.is_terminal() {
                return outcome;
            }
            if self.outcome_rx.changed().await.is_err() {
                return *self.outcome_rx.borrow();
            }
        }
    }
}

impl Drop for PaymentWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(reference: &str, status: ProviderEventStatus, code: Option<&str>) -> ProviderEvent {
        ProviderEvent {
            reference: reference.into(),
            status,
            result_code: code.map(String::from),
        }
    }

    #[test]
    fn test_success_latches_over_later_failure() {
        let mut reducer = OutcomeReducer::new("chk_1");

        reducer.apply(&event("chk_1", ProviderEventStatus::Completed, None));
        assert_eq!(reducer.outcome(), PaymentOutcome::Success);

        reducer.apply(&event("chk_1", ProviderEventStatus::Failed, None));
        assert_eq!(reducer.outcome(), PaymentOutcome::Success);
    }

    #[test]
    fn test_failure_codes_map_to_distinct_outcomes() {
        let mut cancelled = OutcomeReducer::new("chk_1");
        cancelled.apply(&event(
            "chk_1",
            ProviderEventStatus::Failed,
            Some(RESULT_CODE_USER_CANCELLED),
        ));
        assert_eq!(cancelled.outcome(), PaymentOutcome::CancelledByUser);

        let mut pin = OutcomeReducer::new("chk_1");
        pin.apply(&event("chk_1", ProviderEventStatus::Failed, Some(RESULT_CODE_WRONG_PIN)));
        assert_eq!(pin.outcome(), PaymentOutcome::PinError);

        let mut generic = OutcomeReducer::new("chk_1");
        generic.apply(&event("chk_1", ProviderEventStatus::Failed, Some("9999")));
        assert_eq!(generic.outcome(), PaymentOutcome::GenericFailure);
    }

    #[test]
    fn test_other_references_ignored() {
        let mut reducer = OutcomeReducer::new("chk_1");
        reducer.apply(&event("chk_2", ProviderEventStatus::Completed, None));
        assert_eq!(reducer.outcome(), PaymentOutcome::Processing);
    }

    #[test]
    fn test_pending_event_keeps_processing() {
        let mut reducer = OutcomeReducer::new("chk_1");
        reducer.apply(&event("chk_1", ProviderEventStatus::Pending, None));
        assert_eq!(reducer.outcome(), PaymentOutcome::Processing);
        assert!(!reducer.outcome().is_terminal());
    }

    #[tokio::test]
    async fn test_watch_reduces_channel_events() {
        let (tx, rx) = mpsc::channel(8);
        let mut watch = PaymentWatch::spawn("chk_1".into(), rx);
        assert_eq!(watch.outcome(), PaymentOutcome::Processing);

        tx.send(event("chk_1", ProviderEventStatus::Completed, None))
            .await
            .unwrap();

        assert_eq!(watch.wait_terminal().await, PaymentOutcome::Success);

        // A late failure push never reverts the terminal outcome.
        let _ = tx
            .send(event("chk_1", ProviderEventStatus::Failed, None))
            .await;
        assert_eq!(watch.outcome(), PaymentOutcome::Success);
    }

    #[tokio::test]
    async fn test_dropping_watch_aborts_task() {
        let (tx, rx) = mpsc::channel(8);
        let watch = PaymentWatch::spawn("chk_1".into(), rx);
        drop(watch);

        // Dropping the handle aborts the task, which drops the receiver.
        tokio::time::timeout(std::time::Duration::from_secs(1), tx.closed())
            .await
            .expect("watch task should be aborted on drop");
        assert!(tx.is_closed());
    }
}
