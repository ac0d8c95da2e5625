use engine::{EngineError, FundingSource, Money, PendingOp, RecordCmd, ShiftLabel, TransactionKind};
use uuid::Uuid;

mod support;
use support::{day, units};

#[tokio::test]
async fn failed_withdrawal_is_queued_then_committed() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    engine.store().set_writes_down(true);
    let outcome = engine
        .record_transaction(RecordCmd::withdrawal(&shift, units(300)))
        .await
        .unwrap();
    assert!(outcome.is_queued());
    let queued = outcome.into_inner();
    assert_eq!(engine.pending_count(), 1);
    assert!(engine.store().all_transactions().await.is_empty());

    engine.store().set_writes_down(false);
    assert!(engine.flush_pending().await);
    assert_eq!(engine.personal_balance().await.unwrap(), units(-300));

    // Nothing left to replay: a second flush changes nothing.
    assert!(engine.flush_pending().await);
    let stored = engine.store().all_transactions().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, queued.id);
    assert_eq!(stored[0].kind, TransactionKind::Withdrawal);
}

#[tokio::test]
async fn replay_after_a_lost_ack_does_not_duplicate() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    // The row lands but the caller hears a failure.
    engine.store().set_lose_acks(true);
    let outcome = engine
        .record_transaction(RecordCmd::sale(&shift, units(75)))
        .await
        .unwrap();
    assert!(outcome.is_queued());

    engine.store().set_lose_acks(false);
    assert!(engine.flush_pending().await);
    assert_eq!(engine.store().all_transactions().await.len(), 1);
    assert_eq!(engine.compute_expected_cash(&shift).await.unwrap(), units(75));
}

#[tokio::test]
async fn queued_writes_keep_their_order() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    engine.store().set_writes_down(true);
    let sale = engine
        .record_transaction(RecordCmd::sale(&shift, units(100)))
        .await
        .unwrap()
        .into_inner();
    let withdrawal = engine
        .record_transaction(RecordCmd::withdrawal(&shift, units(30)))
        .await
        .unwrap()
        .into_inner();

    let queued: Vec<_> = engine
        .pending()
        .filter_map(|op| match op {
            PendingOp::Insert(engine::store::Record::Transaction(tx)) => Some(tx.id),
            _ => None,
        })
        .collect();
    assert_eq!(queued, vec![sale.id, withdrawal.id]);

    // Once the store is back, the queued writes go in before the new one.
    engine.store().set_writes_down(false);
    let late = engine
        .record_transaction(RecordCmd::sale(&shift, units(5)))
        .await
        .unwrap();
    assert!(late.is_committed());
    assert_eq!(engine.pending_count(), 0);
    assert_eq!(engine.compute_expected_cash(&shift).await.unwrap(), units(75));
}

#[tokio::test]
async fn rejected_writes_are_never_queued() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    engine.store().set_writes_down(true);

    let err = engine
        .record_transaction(RecordCmd::sale(&shift, units(-1)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .record_transaction(RecordCmd::expense(&shift, FundingSource::Credit, units(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));

    let err = engine
        .record_transaction(RecordCmd::new(
            &shift,
            TransactionKind::VendorPayment {
                source: FundingSource::Credit,
                vendor_id: Uuid::new_v4(),
                payment_method: Some("cheque".to_string()),
            },
            units(10),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));

    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn write_for_an_unknown_shift_is_rejected_not_queued() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    let stray = RecordCmd {
        shift_id: Some(Uuid::new_v4()),
        ..RecordCmd::sale(&shift, units(10))
    };
    let err = engine.record_transaction(stray).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidReference(_)));
    assert!(!err.is_transient());
    assert_eq!(engine.pending_count(), 0);

    let sale = engine
        .record_transaction(RecordCmd::sale(&shift, units(10)))
        .await
        .unwrap();
    assert!(sale.is_committed());
    assert_eq!(engine.store().all_transactions().await.len(), 1);
}

#[tokio::test]
async fn stuck_write_only_holds_back_its_own_key() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    // Queued during the outage, then refused for good once the store is back.
    engine.store().set_writes_down(true);
    let toggle = engine
        .set_vendor_active(Uuid::new_v4(), false)
        .await
        .unwrap();
    assert!(toggle.is_queued());
    engine.store().set_writes_down(false);
    assert!(!engine.flush_pending().await);

    let sale = engine
        .record_transaction(RecordCmd::sale(&shift, units(25)))
        .await
        .unwrap();
    assert!(sale.is_committed());
    let vendor = engine.add_vendor("Acme", Money::ZERO).await.unwrap();
    assert!(vendor.is_committed());
    assert_eq!(engine.pending_count(), 1);

    assert!(engine.discard_pending(0).is_some());
    assert!(engine.flush_pending().await);
    assert_eq!(engine.compute_expected_cash(&shift).await.unwrap(), units(25));
}

#[tokio::test]
async fn zero_amount_is_accepted() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    let outcome = engine
        .record_transaction(RecordCmd::sale(&shift, Money::ZERO).description("  void slip "))
        .await
        .unwrap();
    let tx = outcome.into_inner();
    assert_eq!(tx.description.as_deref(), Some("void slip"));
}

#[tokio::test]
async fn discarded_write_never_reaches_the_store() {
    let mut engine = support::engine().await;
    let shift = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();

    engine.store().set_writes_down(true);
    let _ = engine
        .record_transaction(RecordCmd::sale(&shift, units(40)))
        .await
        .unwrap();
    assert!(engine.discard_pending(0).is_some());
    assert!(engine.discard_pending(0).is_none());

    engine.store().set_writes_down(false);
    assert!(engine.flush_pending().await);
    assert!(engine.store().all_transactions().await.is_empty());
}

#[tokio::test]
async fn queued_shift_keeps_its_carried_opening_cash() {
    let mut engine = support::engine().await;
    let morning = engine
        .open_or_get_shift(day(10), ShiftLabel::Morning)
        .await
        .unwrap();
    engine
        .record_transaction(RecordCmd::sale(&morning, units(200)))
        .await
        .unwrap();
    engine
        .close_shift(morning.id.unwrap(), units(200))
        .await
        .unwrap();

    engine.store().set_writes_down(true);
    let evening = engine
        .open_or_get_shift(day(10), ShiftLabel::Evening)
        .await
        .unwrap();
    assert!(evening.is_pending());
    assert_eq!(evening.opening_cash, units(200));

    engine.store().set_writes_down(false);
    let evening = engine
        .open_or_get_shift(day(10), ShiftLabel::Evening)
        .await
        .unwrap();
    assert_eq!(evening.opening_cash, units(200));
    assert_eq!(engine.store().all_shifts().await.len(), 2);
}
