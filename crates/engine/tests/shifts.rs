use engine::{EngineError, FundingSource, Money, RecordCmd, ShiftLabel, ShiftStatus};
use uuid::Uuid;

mod support;
use support::{day, units};

#[tokio::test]
async fn close_reconciles_counted_cash() {
    let mut engine = support::engine().await;

    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    assert_eq!(shift.opening_cash, Money::ZERO);
    assert!(shift.is_open());

    let sale = engine
        .record_transaction(RecordCmd::sale(&shift, units(1000)))
        .await
        .unwrap();
    assert!(sale.is_committed());
    engine
        .record_transaction(RecordCmd::expense(&shift, FundingSource::Sales, units(200)))
        .await
        .unwrap();
    assert_eq!(engine.compute_expected_cash(&shift).await.unwrap(), units(800));

    let closed = engine
        .close_shift(shift.id.unwrap(), units(800))
        .await
        .unwrap();
    let close = closed.close.unwrap();
    assert_eq!(closed.status, ShiftStatus::Closed);
    assert_eq!(close.expected_closing, units(800));
    assert_eq!(close.actual_closing, units(800));
    assert_eq!(close.shortage, Money::ZERO);

    let stored = engine.store().all_shifts().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], closed);
}

#[tokio::test]
async fn shortage_is_signed() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Evening)
        .await
        .unwrap();
    engine
        .record_transaction(RecordCmd::sale(&shift, units(300)))
        .await
        .unwrap();
    engine
        .record_transaction(RecordCmd::withdrawal(&shift, units(50)))
        .await
        .unwrap();

    let closed = engine
        .close_shift(shift.id.unwrap(), Money::new(24_050))
        .await
        .unwrap();
    let close = closed.close.unwrap();
    assert_eq!(close.expected_closing, units(250));
    assert_eq!(close.shortage, Money::new(-950));
}

#[tokio::test]
async fn pocket_and_credit_flows_leave_the_till_alone() {
    let mut engine = support::engine().await;
    let vendor = engine
        .add_vendor("Acme", Money::ZERO)
        .await
        .unwrap()
        .into_inner();
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    for cmd in [
        RecordCmd::expense(&shift, FundingSource::Pocket, units(40)),
        RecordCmd::purchase(&shift, vendor.id, FundingSource::Credit, units(500)),
        RecordCmd::purchase(&shift, vendor.id, FundingSource::Pocket, units(60)),
        RecordCmd::vendor_payment(&shift, vendor.id, FundingSource::Pocket, units(70)),
    ] {
        engine.record_transaction(cmd).await.unwrap();
    }

    assert_eq!(engine.compute_expected_cash(&shift).await.unwrap(), Money::ZERO);
}

#[tokio::test]
async fn opening_cash_follows_the_previous_slot() {
    let mut engine = support::engine().await;

    let mut counted = 500;
    let slots = [
        (day(10), ShiftLabel::Morning),
        (day(10), ShiftLabel::Evening),
        (day(10), ShiftLabel::Night),
        (day(11), ShiftLabel::Morning),
    ];
    let mut previous = Money::ZERO;
    for (date, label) in slots {
        let shift = engine.open_or_get_shift(date, label).await.unwrap();
        assert_eq!(shift.opening_cash, previous, "{date} {}", label.as_str());
        engine
            .close_shift(shift.id.unwrap(), units(counted))
            .await
            .unwrap();
        previous = units(counted);
        counted += 100;
    }
}

#[tokio::test]
async fn opening_cash_is_zero_without_a_closed_predecessor() {
    let mut engine = support::engine().await;

    // Morning still open, and nothing closed the night before.
    engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    let evening = engine
        .open_or_get_shift(day(10), ShiftLabel::Evening)
        .await
        .unwrap();
    assert_eq!(evening.opening_cash, Money::ZERO);

    // A night shift never reaches back to the morning.
    let morning = engine
        .open_or_get_shift(day(14), ShiftLabel::Morning)
        .await
        .unwrap();
    engine
        .close_shift(morning.id.unwrap(), units(900))
        .await
        .unwrap();
    let night = engine
        .open_or_get_shift(day(14), ShiftLabel::Night)
        .await
        .unwrap();
    assert_eq!(night.opening_cash, Money::ZERO);
}

#[tokio::test]
async fn skipped_morning_carries_last_night_cash() {
    let mut engine = support::engine().await;

    let night = engine
        .open_or_get_shift(day(9), ShiftLabel::Night)
        .await
        .unwrap();
    engine
        .close_shift(night.id.unwrap(), units(700))
        .await
        .unwrap();

    let evening = engine
        .open_or_get_shift(day(10), ShiftLabel::Evening)
        .await
        .unwrap();
    assert_eq!(evening.opening_cash, units(700));

    // Once the evening is closed, its count wins over the previous night.
    engine
        .close_shift(evening.id.unwrap(), units(450))
        .await
        .unwrap();
    let night = engine
        .open_or_get_shift(day(10), ShiftLabel::Night)
        .await
        .unwrap();
    assert_eq!(night.opening_cash, units(450));
}

#[tokio::test]
async fn open_returns_the_existing_open_shift() {
    let mut engine = support::engine().await;
    let first = engine
        .open_or_get_shift(day(10), ShiftLabel::Night)
        .await
        .unwrap();
    let again = engine
        .open_or_get_shift(day(10), ShiftLabel::Night)
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(engine.store().all_shifts().await.len(), 1);

    let found = engine
        .find_open_shift(day(10), ShiftLabel::Night)
        .await
        .unwrap();
    assert_eq!(found.and_then(|shift| shift.id), first.id);
}

#[tokio::test]
async fn open_synthesizes_a_shift_when_creation_fails() {
    let mut engine = support::engine().await;
    engine.store().set_writes_down(true);

    let local = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    assert!(local.id.is_none());
    assert!(local.is_pending());
    assert_eq!(local.opening_cash, Money::ZERO);
    assert_eq!(engine.pending_count(), 1);

    // Asking again does not queue a second creation.
    let again = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    assert!(again.id.is_none());
    assert_eq!(engine.pending_count(), 1);

    let err = engine
        .record_transaction(RecordCmd::sale(&local, units(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));
    assert_eq!(engine.compute_expected_cash(&local).await.unwrap(), Money::ZERO);

    engine.store().set_writes_down(false);
    let stored = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    assert!(stored.id.is_some());
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.store().all_shifts().await.len(), 1);
}

#[tokio::test]
async fn open_reports_a_failed_lookup() {
    let mut engine = support::engine().await;
    engine.store().set_reads_down(true);

    let err = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn closing_twice_or_unknown_is_an_error() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    let id = shift.id.unwrap();
    engine.close_shift(id, units(10)).await.unwrap();

    let err = engine.close_shift(id, units(10)).await.unwrap_err();
    assert!(matches!(err, EngineError::ShiftClosed(_)));

    let err = engine
        .close_shift(Uuid::new_v4(), units(10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine.close_shift(id, units(-1)).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn closed_shift_rejects_transactions() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    let closed = engine
        .close_shift(shift.id.unwrap(), Money::ZERO)
        .await
        .unwrap();

    let err = engine
        .record_transaction(RecordCmd::sale(&closed, units(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ShiftClosed(_)));
    assert_eq!(engine.pending_count(), 0);

    // The slot can be opened again as a fresh shift.
    let reopened = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    assert_ne!(reopened.id, closed.id);
    assert!(reopened.is_open());
}

#[tokio::test]
async fn close_waits_for_pending_writes_of_the_shift() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    let id = shift.id.unwrap();

    engine.store().set_writes_down(true);
    let sale = engine
        .record_transaction(RecordCmd::sale(&shift, units(120)))
        .await
        .unwrap();
    assert!(sale.is_queued());

    let err = engine.close_shift(id, units(120)).await.unwrap_err();
    assert!(matches!(err, EngineError::PendingWrites(_)));

    engine.store().set_writes_down(false);
    let closed = engine.close_shift(id, units(120)).await.unwrap();
    let close = closed.close.unwrap();
    assert_eq!(close.expected_closing, units(120));
    assert_eq!(close.shortage, Money::ZERO);
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn failed_close_is_not_queued() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    engine.store().set_writes_down(true);
    let err = engine
        .close_shift(shift.id.unwrap(), units(10))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert_eq!(engine.pending_count(), 0);

    engine.store().set_writes_down(false);
    let stored = engine.store().all_shifts().await;
    assert!(stored[0].is_open());
}
