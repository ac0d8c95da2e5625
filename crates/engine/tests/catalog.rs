use engine::{EngineError, Money};
use uuid::Uuid;

mod support;
use support::units;

#[tokio::test]
async fn vendors_are_listed_by_name_and_filtered_on_active() {
    let mut engine = support::engine().await;
    let zed = engine
        .add_vendor("Zed Wholesale", units(10))
        .await
        .unwrap()
        .into_inner();
    engine.add_vendor("  Acme  ", Money::ZERO).await.unwrap();

    let names: Vec<_> = engine
        .vendors(true)
        .await
        .unwrap()
        .into_iter()
        .map(|vendor| vendor.name)
        .collect();
    assert_eq!(names, vec!["Acme", "Zed Wholesale"]);

    let outcome = engine.set_vendor_active(zed.id, false).await.unwrap();
    assert!(outcome.is_committed());
    assert_eq!(engine.vendors(true).await.unwrap().len(), 1);
    assert_eq!(engine.vendors(false).await.unwrap().len(), 2);
    assert!(!engine.vendor(zed.id).await.unwrap().active);

    engine.set_vendor_active(zed.id, true).await.unwrap();
    assert!(engine.vendor(zed.id).await.unwrap().active);
}

#[tokio::test]
async fn catalog_rejections() {
    let mut engine = support::engine().await;

    let err = engine.add_vendor("   ", Money::ZERO).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
    let err = engine.add_expense_head("").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let err = engine
        .set_vendor_active(Uuid::new_v4(), false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(engine.pending_count(), 0);
}

#[tokio::test]
async fn queued_vendor_is_created_once() {
    let mut engine = support::engine().await;

    engine.store().set_lose_acks(true);
    let outcome = engine.add_vendor("Acme", Money::ZERO).await.unwrap();
    assert!(outcome.is_queued());
    let vendor = outcome.into_inner();

    engine.store().set_lose_acks(false);
    assert!(engine.flush_pending().await);
    let vendors = engine.vendors(false).await.unwrap();
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0].id, vendor.id);
}

#[tokio::test]
async fn expense_heads_lifecycle() {
    let mut engine = support::engine().await;
    let rent = engine
        .add_expense_head("Rent")
        .await
        .unwrap()
        .into_inner();
    let tea = engine
        .add_expense_head("Tea")
        .await
        .unwrap()
        .into_inner();

    engine.set_expense_head_active(tea.id, false).await.unwrap();
    let active: Vec<_> = engine
        .expense_heads(true)
        .await
        .unwrap()
        .into_iter()
        .map(|head| head.id)
        .collect();
    assert_eq!(active, vec![rent.id]);

    engine.store().set_writes_down(true);
    let removal = engine.remove_expense_head(rent.id).await.unwrap();
    assert!(removal.is_queued());
    assert_eq!(engine.expense_heads(false).await.unwrap().len(), 2);

    engine.store().set_writes_down(false);
    assert!(engine.flush_pending().await);
    let left: Vec<_> = engine
        .expense_heads(false)
        .await
        .unwrap()
        .into_iter()
        .map(|head| head.name)
        .collect();
    assert_eq!(left, vec!["Tea"]);

    // Deleting twice is harmless.
    let again = engine.remove_expense_head(rent.id).await.unwrap();
    assert!(again.is_committed());
}

#[tokio::test]
async fn vendors_can_be_renamed_and_removed() {
    let mut engine = support::engine().await;
    let acme = engine
        .add_vendor("Acme", units(50))
        .await
        .unwrap()
        .into_inner();

    let outcome = engine
        .rename_vendor(acme.id, "  Acme Traders ")
        .await
        .unwrap();
    assert!(outcome.is_committed());
    let renamed = engine.vendor(acme.id).await.unwrap();
    assert_eq!(renamed.name, "Acme Traders");
    assert_eq!(renamed.opening_balance, units(50));

    let err = engine.rename_vendor(acme.id, "  ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
    let err = engine
        .rename_vendor(Uuid::new_v4(), "Ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(engine.pending_count(), 0);

    engine.store().set_writes_down(true);
    let removal = engine.remove_vendor(acme.id).await.unwrap();
    assert!(removal.is_queued());
    assert!(engine.vendor(acme.id).await.is_ok());

    engine.store().set_writes_down(false);
    assert!(engine.flush_pending().await);
    let err = engine.vendor(acme.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.vendors(false).await.unwrap().is_empty());
}
