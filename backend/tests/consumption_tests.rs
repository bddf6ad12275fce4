//! Consumption report tests
//!
//! Drives `ConsumptionService` against the in-memory ledger store:
//! - stock is drawn on create and re-charged by the difference on update
//! - a rejected draw leaves both the ledger and the reports untouched
//! - deleting keeps stock consumed unless restore-on-delete is switched on
//! - concurrent draws never take a ledger below zero

use std::sync::Arc;

use livestock_backend::services::consumption::{ConsumptionInput, ConsumptionService};
use livestock_backend::store::MemoryLedgerStore;
use livestock_backend::AppError;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ConsumableKind;
use uuid::Uuid;

fn input(item_id: Uuid, report_id: Uuid, quantity: i32) -> ConsumptionInput {
    ConsumptionInput {
        item_id,
        report_id,
        quantity,
    }
}

/// One circle with one daily report and one provisioned item
struct Fixture {
    store: MemoryLedgerStore,
    circle: Uuid,
    item: Uuid,
    daily: Uuid,
    ledger: Uuid,
}

impl Fixture {
    async fn new(kind: ConsumableKind, remaining: i64) -> Self {
        let store = MemoryLedgerStore::new();
        let circle = Uuid::new_v4();
        let item = Uuid::new_v4();
        let daily = store.add_daily_report(circle).await;
        let ledger = store
            .add_ledger(kind, circle, item, Decimal::from(remaining))
            .await;
        Self {
            store,
            circle,
            item,
            daily,
            ledger,
        }
    }

    fn service(&self, kind: ConsumableKind) -> ConsumptionService {
        ConsumptionService::new(Arc::new(self.store.clone()), kind)
    }

    async fn remaining(&self, kind: ConsumableKind) -> Decimal {
        self.store.remaining(kind, self.ledger).await.unwrap()
    }
}

// ============================================================================
// Create / update / delete
// ============================================================================

#[tokio::test]
async fn test_create_update_then_overdraw() {
    let fx = Fixture::new(ConsumableKind::Food, 100).await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();
    assert_eq!(created.remaining, Decimal::from(70));
    assert_eq!(created.report.quantity, 30);
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(70));

    let updated = service
        .update_report(created.report.id, input(fx.item, fx.daily, 50))
        .await
        .unwrap();
    assert_eq!(updated.remaining, Decimal::from(50));
    assert_eq!(updated.report.quantity, 50);

    let err = service
        .create_report(input(fx.item, fx.daily, 60))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(50));
    assert_eq!(fx.store.active_report_count(ConsumableKind::Food).await, 1);
}

#[tokio::test]
async fn test_create_exact_remaining_empties_ledger() {
    let fx = Fixture::new(ConsumableKind::Medicine, 12).await;
    let service = fx.service(ConsumableKind::Medicine);

    let outcome = service.create_report(input(fx.item, fx.daily, 12)).await.unwrap();

    assert_eq!(outcome.remaining, Decimal::ZERO);
    assert_eq!(outcome.kind, ConsumableKind::Medicine);
}

#[tokio::test]
async fn test_insufficient_create_leaves_no_report() {
    let fx = Fixture::new(ConsumableKind::Food, 10).await;
    let service = fx.service(ConsumableKind::Food);

    let err = service
        .create_report(input(fx.item, fx.daily, 11))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(10));
    assert_eq!(fx.store.active_report_count(ConsumableKind::Food).await, 0);
}

#[tokio::test]
async fn test_rejected_update_changes_nothing() {
    let fx = Fixture::new(ConsumableKind::Food, 40).await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();

    // 10 left, growing the report by 20 would take it to -10
    let err = service
        .update_report(created.report.id, input(fx.item, fx.daily, 50))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(10));
    let report = service.get_report(created.report.id).await.unwrap();
    assert_eq!(report.quantity, 30);
}

#[tokio::test]
async fn test_shrinking_update_returns_stock() {
    let fx = Fixture::new(ConsumableKind::Food, 40).await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();
    let updated = service
        .update_report(created.report.id, input(fx.item, fx.daily, 5))
        .await
        .unwrap();

    assert_eq!(updated.remaining, Decimal::from(35));
}

#[tokio::test]
async fn test_update_unknown_report_is_not_found() {
    let fx = Fixture::new(ConsumableKind::Food, 40).await;
    let service = fx.service(ConsumableKind::Food);

    let err = service
        .update_report(Uuid::new_v4(), input(fx.item, fx.daily, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(40));
}

#[tokio::test]
async fn test_delete_keeps_stock_consumed_by_default() {
    let fx = Fixture::new(ConsumableKind::Food, 25).await;
    let service = fx.service(ConsumableKind::Food);

    for _ in 0..2 {
        let created = service.create_report(input(fx.item, fx.daily, 10)).await.unwrap();
        service.delete_report(created.report.id).await.unwrap();
    }

    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(5));
    assert_eq!(fx.store.active_report_count(ConsumableKind::Food).await, 0);

    // The ledger is drained even though no report is active
    let err = service
        .create_report(input(fx.item, fx.daily, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
}

#[tokio::test]
async fn test_delete_restores_stock_when_enabled() {
    let fx = Fixture::new(ConsumableKind::Medicine, 25).await;
    let service = fx
        .service(ConsumableKind::Medicine)
        .with_restore_on_delete(true);

    for _ in 0..5 {
        let created = service.create_report(input(fx.item, fx.daily, 10)).await.unwrap();
        service.delete_report(created.report.id).await.unwrap();
    }

    assert_eq!(fx.remaining(ConsumableKind::Medicine).await, Decimal::from(25));
}

#[tokio::test]
async fn test_deleted_report_is_gone() {
    let fx = Fixture::new(ConsumableKind::Food, 25).await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 10)).await.unwrap();
    service.delete_report(created.report.id).await.unwrap();

    assert!(matches!(
        service.get_report(created.report.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_report(created.report.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(service.list_reports(fx.daily).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_reports_of_daily_report() {
    let fx = Fixture::new(ConsumableKind::Food, 100).await;
    let other_daily = fx.store.add_daily_report(fx.circle).await;
    let service = fx.service(ConsumableKind::Food);

    service.create_report(input(fx.item, fx.daily, 1)).await.unwrap();
    service.create_report(input(fx.item, fx.daily, 2)).await.unwrap();
    service.create_report(input(fx.item, other_daily, 3)).await.unwrap();

    let reports = service.list_reports(fx.daily).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.report_id == fx.daily));
}

#[tokio::test]
async fn test_inactive_daily_report_is_not_found() {
    let fx = Fixture::new(ConsumableKind::Food, 100).await;
    fx.store.deactivate_daily_report(fx.daily).await;
    let service = fx.service(ConsumableKind::Food);

    let err = service
        .create_report(input(fx.item, fx.daily, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(100));
}

// ============================================================================
// Moving a report between ledger rows
// ============================================================================

#[tokio::test]
async fn test_moving_report_to_another_item() {
    let fx = Fixture::new(ConsumableKind::Food, 50).await;
    let other_item = Uuid::new_v4();
    let other_ledger = fx
        .store
        .add_ledger(ConsumableKind::Food, fx.circle, other_item, Decimal::from(20))
        .await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();
    let moved = service
        .update_report(created.report.id, input(other_item, fx.daily, 15))
        .await
        .unwrap();

    assert_eq!(moved.report.item_id, other_item);
    assert_eq!(moved.remaining, Decimal::from(5));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(50));
    assert_eq!(
        fx.store.remaining(ConsumableKind::Food, other_ledger).await,
        Some(Decimal::from(5))
    );
}

#[tokio::test]
async fn test_rejected_move_changes_neither_ledger() {
    let fx = Fixture::new(ConsumableKind::Food, 50).await;
    let other_item = Uuid::new_v4();
    let other_ledger = fx
        .store
        .add_ledger(ConsumableKind::Food, fx.circle, other_item, Decimal::from(20))
        .await;
    let service = fx.service(ConsumableKind::Food);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();
    let err = service
        .update_report(created.report.id, input(other_item, fx.daily, 21))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(20));
    assert_eq!(
        fx.store.remaining(ConsumableKind::Food, other_ledger).await,
        Some(Decimal::from(20))
    );
    assert_eq!(
        service.get_report(created.report.id).await.unwrap().item_id,
        fx.item
    );
}

#[tokio::test]
async fn test_moving_report_to_item_without_stock_is_not_found() {
    let fx = Fixture::new(ConsumableKind::Medicine, 50).await;
    let service = fx.service(ConsumableKind::Medicine);

    let created = service.create_report(input(fx.item, fx.daily, 30)).await.unwrap();
    let err = service
        .update_report(created.report.id, input(Uuid::new_v4(), fx.daily, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(fx.remaining(ConsumableKind::Medicine).await, Decimal::from(20));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_never_overdraw() {
    let fx = Fixture::new(ConsumableKind::Food, 100).await;
    let service = fx.service(ConsumableKind::Food);

    let handles: Vec<_> = (0..30)
        .map(|_| {
            let service = service.clone();
            let (item, daily) = (fx.item, fx.daily);
            tokio::spawn(async move { service.create_report(input(item, daily, 7)).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::InsufficientStock(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // 100 / 7 = 14 draws fit, leaving 2
    assert_eq!(accepted, 14);
    assert_eq!(fx.remaining(ConsumableKind::Food).await, Decimal::from(2));
    assert_eq!(fx.store.active_report_count(ConsumableKind::Food).await, 14);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Create(i32),
    Update(usize, i32),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..40i32).prop_map(Op::Create),
        (any::<usize>(), 1..40i32).prop_map(|(i, q)| Op::Update(i, q)),
        any::<usize>().prop_map(Op::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The ledger always matches a simple model and never goes negative
    #[test]
    fn prop_ledger_follows_model(
        initial in 0..200i64,
        restore in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..25),
    ) {
        tokio_test::block_on(async {
            let fx = Fixture::new(ConsumableKind::Food, initial).await;
            let service = fx.service(ConsumableKind::Food).with_restore_on_delete(restore);

            let mut remaining = initial;
            let mut live: Vec<(Uuid, i64)> = Vec::new();

            for op in ops {
                match op {
                    Op::Create(q) => {
                        let result = service.create_report(input(fx.item, fx.daily, q)).await;
                        if i64::from(q) <= remaining {
                            let outcome = result.unwrap();
                            remaining -= i64::from(q);
                            live.push((outcome.report.id, i64::from(q)));
                        } else {
                            assert!(matches!(result, Err(AppError::InsufficientStock(_))));
                        }
                    }
                    Op::Update(i, q) if !live.is_empty() => {
                        let idx = i % live.len();
                        let (id, old) = live[idx];
                        let result = service.update_report(id, input(fx.item, fx.daily, q)).await;
                        let after = remaining - (i64::from(q) - old);
                        if after >= 0 {
                            result.unwrap();
                            remaining = after;
                            live[idx].1 = i64::from(q);
                        } else {
                            assert!(matches!(result, Err(AppError::InsufficientStock(_))));
                        }
                    }
                    Op::Delete(i) if !live.is_empty() => {
                        let (id, qty) = live.remove(i % live.len());
                        service.delete_report(id).await.unwrap();
                        if restore {
                            remaining += qty;
                        }
                    }
                    _ => {}
                }

                let actual = fx.remaining(ConsumableKind::Food).await;
                assert!(actual >= Decimal::ZERO);
                assert_eq!(actual, Decimal::from(remaining));
            }

            assert_eq!(fx.store.active_report_count(ConsumableKind::Food).await, live.len());
        });
    }
}
