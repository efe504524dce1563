use std::sync::Arc;

use chrono::{Duration, Utc};
use safiri_booking::models::{BookableItem, BookingStatus, PaymentMethod};
use safiri_booking::orchestrator::{BookingOrchestrator, LogOnlyNotifier, MockPaymentProvider};
use safiri_booking::repository::BookingRepository;
use safiri_booking::stats::aggregate_host_stats;
use safiri_booking::BookingFormState;
use safiri_core::category::ItemCategory;
use safiri_core::payment::{PaymentOutcome, ProviderEvent, ProviderEventStatus};
use safiri_pricing::{ActivitySelection, EntranceType, FacilitySelection};
use safiri_referral::ledger::{ClickOutcome, ConversionOutcome, LedgerError, ReferralLedger};
use safiri_referral::models::ReferralTracking;
use safiri_referral::rates::RateTable;
use safiri_referral::repository::ReferralRepository;
use safiri_store::{
    CategoryRateConfig, CommissionConfig, Config, InMemoryBookingRepository,
    InMemoryReferralRepository, PaymentConfig, StaticRateSource,
};
use std::collections::HashMap;
use uuid::Uuid;

fn app_config() -> Config {
    let mut categories = HashMap::new();
    categories.insert(
        "adventure_place".to_string(),
        CategoryRateConfig {
            service_fee_rate: 20.0,
            commission_rate: 5.0,
        },
    );
    Config {
        commission: CommissionConfig {
            default_service_fee_rate: 20.0,
            default_commission_rate: 5.0,
            categories,
        },
        payment: PaymentConfig {
            currency: "KES".into(),
        },
    }
}

fn waterfall_item(host_id: Uuid) -> BookableItem {
    BookableItem {
        id: Uuid::new_v4(),
        category: ItemCategory::AdventurePlace,
        host_id,
        name: "Karura Falls".into(),
        entrance_type: EntranceType::Paid,
        adult_price: 500.0,
        child_price: 250.0,
        fixed_date: None,
        facilities: vec![FacilitySelection::new("Cottage", 3000.0)],
        activities: vec![ActivitySelection::new("Boat ride", 800.0)],
    }
}

fn walk_wizard_to_review(form: &mut BookingFormState) {
    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    form.set_visit_date(tomorrow);
    assert!(form.advance());

    form.set_party_size(2, 0);
    assert!(form.advance());

    form.toggle_activity("Boat ride");
    form.update_activity_people("Boat ride", 2);
    assert!(form.advance());

    form.set_guest_identity("Amina", "amina@example.com", "254700000001");
    assert!(form.advance());

    form.set_payment_method(PaymentMethod::MobileMoney {
        phone: "254700000001".into(),
    });
    assert!(form.advance());
}

#[tokio::test]
async fn test_guest_booking_payment_and_referral_flow() {
    let config = app_config();
    let host_id = Uuid::new_v4();
    let bookings = Arc::new(InMemoryBookingRepository::new());
    let provider = Arc::new(MockPaymentProvider::new());
    let orchestrator = BookingOrchestrator::new(
        bookings.clone(),
        provider.clone(),
        Arc::new(LogOnlyNotifier),
        config.payment.currency.clone(),
    );

    let item = waterfall_item(host_id);
    let mut form = BookingFormState::open(item.clone(), None);
    walk_wizard_to_review(&mut form);

    // 2 adults entrance + 2-person boat ride.
    assert_eq!(form.compute_total(), 1000.0 + 1600.0);
    assert!(form.can_submit());

    let (record, watch) = orchestrator.submit(&mut form).await.unwrap();
    assert_eq!(record.status, BookingStatus::Pending);
    let mut watch = watch.expect("paid booking opens a checkout");
    let reference = record.payment_reference.clone().unwrap();
    // The stored record already exists and carries the checkout reference.
    let stored = bookings.get_booking(record.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_reference.as_deref(), Some(reference.as_str()));

    provider
        .push(
            &reference,
            ProviderEvent {
                reference: reference.clone(),
                status: ProviderEventStatus::Completed,
                result_code: None,
            },
        )
        .await;
    assert_eq!(watch.wait_terminal().await, PaymentOutcome::Success);

    orchestrator.confirm_paid(record.id).await.unwrap();
    let stored = bookings.get_booking(record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Paid);

    // Referral crediting runs off the paid booking, with rates from config.
    let referrals = Arc::new(InMemoryReferralRepository::new());
    let ledger = ReferralLedger::new(
        referrals.clone(),
        Arc::new(StaticRateSource::new(config.rate_table())),
    );

    let referrer_id = Uuid::new_v4();
    let tracking = match ledger
        .record_click(
            referrer_id,
            None,
            Some(item.id),
            Some(ItemCategory::AdventurePlace),
        )
        .await
        .unwrap()
    {
        ClickOutcome::Tracked(tracking) => tracking,
        ClickOutcome::AlreadyTracked(_) => panic!("first click must create the row"),
    };

    let outcome = ledger
        .record_conversion(tracking.id, record.id, record.total_amount)
        .await
        .unwrap();
    let entry = match outcome {
        ConversionOutcome::Recorded(entry) => entry,
        ConversionOutcome::Skipped => panic!("first conversion must be recorded"),
    };
    // 2600 gross -> 520 service fee -> 26 commission.
    assert_eq!(entry.base_amount, 520.0);
    assert_eq!(entry.commission_amount, 26.0);

    // The payment path and the crediting path may both fire this.
    let retried = ledger
        .record_conversion(tracking.id, record.id, record.total_amount)
        .await
        .unwrap();
    assert!(matches!(retried, ConversionOutcome::Skipped));

    assert_eq!(ledger.withdrawable_balance(referrer_id).await.unwrap(), 26.0);
    assert_eq!(ledger.lifetime_earnings(referrer_id).await.unwrap(), 26.0);

    let receipt = ledger.withdraw(referrer_id, 26.0).await.unwrap();
    assert_eq!(receipt.consumed_amount, 26.0);
    assert_eq!(ledger.withdrawable_balance(referrer_id).await.unwrap(), 0.0);
    assert_eq!(ledger.lifetime_earnings(referrer_id).await.unwrap(), 26.0);

    // Host dashboard sees the paid booking.
    let host_bookings = bookings.list_bookings_for_host(host_id).await.unwrap();
    let stats = aggregate_host_stats(&host_bookings);
    assert_eq!(stats.paid, 1);
    assert_eq!(stats.gross_revenue, 2600.0);
    assert_eq!(stats.guests_hosted, 2);
}

#[tokio::test]
async fn test_failed_payment_leaves_booking_retryable() {
    let bookings = Arc::new(InMemoryBookingRepository::new());
    let provider = Arc::new(MockPaymentProvider::new());
    let orchestrator = BookingOrchestrator::new(
        bookings.clone(),
        provider.clone(),
        Arc::new(LogOnlyNotifier),
        "KES",
    );

    let mut form = BookingFormState::open(waterfall_item(Uuid::new_v4()), None);
    walk_wizard_to_review(&mut form);
    let (record, watch) = orchestrator.submit(&mut form).await.unwrap();
    let mut watch = watch.unwrap();
    let reference = record.payment_reference.clone().unwrap();

    provider
        .push(
            &reference,
            ProviderEvent {
                reference: reference.clone(),
                status: ProviderEventStatus::Failed,
                result_code: Some("1032".into()),
            },
        )
        .await;
    assert_eq!(watch.wait_terminal().await, PaymentOutcome::CancelledByUser);

    orchestrator.mark_failed(record.id).await.unwrap();
    let stored = bookings.get_booking(record.id).await.unwrap().unwrap();
    // Failed, never deleted: the guest can retry against the same record.
    assert_eq!(stored.status, BookingStatus::Failed);
}

#[tokio::test]
async fn test_free_booking_skips_checkout_entirely() {
    let bookings = Arc::new(InMemoryBookingRepository::new());
    let orchestrator = BookingOrchestrator::new(
        bookings.clone(),
        Arc::new(MockPaymentProvider::new()),
        Arc::new(LogOnlyNotifier),
        "KES",
    );

    let item = BookableItem {
        id: Uuid::new_v4(),
        category: ItemCategory::Attraction,
        host_id: Uuid::new_v4(),
        name: "Community forest".into(),
        entrance_type: EntranceType::Free,
        adult_price: 0.0,
        child_price: 0.0,
        fixed_date: None,
        facilities: vec![],
        activities: vec![],
    };
    let user_id = Uuid::new_v4();
    let mut form = BookingFormState::open(item, Some(user_id));

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    form.set_visit_date(tomorrow);
    assert!(form.advance());
    form.set_party_size(1, 2);
    assert!(form.advance());

    let (record, watch) = orchestrator.submit(&mut form).await.unwrap();
    assert!(watch.is_none(), "zero-total booking opens no checkout");
    assert!(record.payment_reference.is_none());
    assert_eq!(record.total_amount, 0.0);
    assert_eq!(record.slot_count, 3);
}

#[tokio::test]
async fn test_conditional_withdrawal_rejects_double_spend() {
    let referrals = Arc::new(InMemoryReferralRepository::new());
    let ledger = ReferralLedger::new(
        referrals.clone(),
        Arc::new(StaticRateSource::new(RateTable::new())),
    );

    let referrer_id = Uuid::new_v4();
    let tracking = ReferralTracking::new(referrer_id, None, None, Some(ItemCategory::Trip));
    referrals.create_tracking(&tracking).await.unwrap();
    let entry = match ledger
        .record_conversion(tracking.id, Uuid::new_v4(), 10_000.0)
        .await
        .unwrap()
    {
        ConversionOutcome::Recorded(entry) => entry,
        ConversionOutcome::Skipped => panic!("conversion must be recorded"),
    };

    // A second request replaying the same entry set must fail whole once the
    // first apply consumed the entries.
    let now = Utc::now();
    referrals
        .apply_withdrawal(referrer_id, &[entry.id], now)
        .await
        .unwrap();
    let replay = referrals.apply_withdrawal(referrer_id, &[entry.id], now).await;
    assert!(replay.is_err());

    // And through the ledger the balance is now spent.
    let result = ledger.withdraw(referrer_id, entry.commission_amount).await;
    assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
}

#[tokio::test]
async fn test_status_update_rejects_stale_expected_status() {
    let bookings = Arc::new(InMemoryBookingRepository::new());

    let mut form = BookingFormState::open(waterfall_item(Uuid::new_v4()), None);
    walk_wizard_to_review(&mut form);
    let record = form.build_record().unwrap();
    bookings.create_booking(&record).await.unwrap();

    bookings
        .update_booking_status(record.id, BookingStatus::Pending, BookingStatus::Paid)
        .await
        .unwrap();

    // A demotion decided while the booking was still PENDING loses the race
    // and must not overwrite the PAID status.
    let stale = bookings
        .update_booking_status(record.id, BookingStatus::Pending, BookingStatus::Failed)
        .await;
    assert!(stale.is_err());

    let stored = bookings.get_booking(record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Paid);
}

#[tokio::test]
async fn test_repeat_referral_click_is_deduplicated() {
    let referrals = Arc::new(InMemoryReferralRepository::new());
    let ledger = ReferralLedger::new(
        referrals.clone(),
        Arc::new(StaticRateSource::new(RateTable::new())),
    );

    let referrer_id = Uuid::new_v4();
    let referred = Some(Uuid::new_v4());
    let first = ledger
        .record_click(referrer_id, referred, None, Some(ItemCategory::Trip))
        .await
        .unwrap();
    let second = ledger
        .record_click(referrer_id, referred, None, Some(ItemCategory::Trip))
        .await
        .unwrap();

    assert!(matches!(first, ClickOutcome::Tracked(_)));
    match second {
        ClickOutcome::AlreadyTracked(tracking) => assert_eq!(tracking.id, first.tracking().id),
        ClickOutcome::Tracked(_) => panic!("repeat click must reuse the pending row"),
    }
}
