//! In-process ledger store
//!
//! Keeps ledgers and reports in a map behind one async mutex. A unit of
//! work holds the mutex for its whole life and edits a private copy of the
//! state; commit writes the copy back. This gives the same all-or-nothing
//! and one-writer-at-a-time behavior as the PostgreSQL store without a
//! database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use shared::ConsumableKind;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    ConsumptionRecord, ConsumptionReport, DailyReportRef, LedgerStore, LedgerTransaction,
    StockLedgerEntry,
};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    daily_reports: HashMap<Uuid, DailyReportRef>,
    ledgers: HashMap<(ConsumableKind, Uuid), StockLedgerEntry>,
    reports: HashMap<(ConsumableKind, Uuid), ConsumptionReport>,
}

impl MemoryState {
    fn active_ledger(
        &self,
        kind: ConsumableKind,
        livestock_circle_id: Uuid,
        item_id: Uuid,
    ) -> Option<&StockLedgerEntry> {
        self.ledgers.iter().find_map(|((k, _), entry)| {
            (*k == kind
                && entry.is_active
                && entry.livestock_circle_id == livestock_circle_id
                && entry.item_id == item_id)
                .then_some(entry)
        })
    }

    fn active_report(&self, kind: ConsumableKind, id: Uuid) -> Option<&ConsumptionReport> {
        self.reports.get(&(kind, id)).filter(|r| r.is_active)
    }
}

/// Ledger store kept in memory
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a daily report of a circle and return its id
    pub async fn add_daily_report(&self, livestock_circle_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.daily_reports.insert(
            id,
            DailyReportRef {
                id,
                livestock_circle_id,
                is_active: true,
            },
        );
        id
    }

    pub async fn deactivate_daily_report(&self, id: Uuid) {
        if let Some(report) = self.state.lock().await.daily_reports.get_mut(&id) {
            report.is_active = false;
        }
    }

    /// Provision a circle with `remaining` of an item and return the ledger id
    pub async fn add_ledger(
        &self,
        kind: ConsumableKind,
        livestock_circle_id: Uuid,
        item_id: Uuid,
        remaining: Decimal,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.state.lock().await.ledgers.insert(
            (kind, id),
            StockLedgerEntry {
                id,
                livestock_circle_id,
                item_id,
                remaining,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Current remaining quantity of a ledger row
    pub async fn remaining(&self, kind: ConsumableKind, ledger_id: Uuid) -> Option<Decimal> {
        self.state
            .lock()
            .await
            .ledgers
            .get(&(kind, ledger_id))
            .map(|entry| entry.remaining)
    }

    /// Number of active reports of a kind
    pub async fn active_report_count(&self, kind: ConsumableKind) -> usize {
        self.state
            .lock()
            .await
            .reports
            .iter()
            .filter(|((k, _), r)| *k == kind && r.is_active)
            .count()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryLedgerTransaction { guard, working }))
    }

    async fn find_report(&self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>> {
        Ok(self.state.lock().await.active_report(kind, id).cloned())
    }

    async fn list_reports(
        &self,
        kind: ConsumableKind,
        daily_report_id: Uuid,
    ) -> AppResult<Vec<ConsumptionReport>> {
        let state = self.state.lock().await;
        let mut reports: Vec<ConsumptionReport> = state
            .reports
            .iter()
            .filter(|((k, _), r)| *k == kind && r.is_active && r.report_id == daily_report_id)
            .map(|(_, r)| r.clone())
            .collect();
        reports.sort_by_key(|r| r.created_at);
        Ok(reports)
    }
}

struct MemoryLedgerTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl LedgerTransaction for MemoryLedgerTransaction {
    async fn daily_report(&mut self, id: Uuid) -> AppResult<Option<DailyReportRef>> {
        Ok(self.working.daily_reports.get(&id).copied())
    }

    async fn lock_ledger(
        &mut self,
        kind: ConsumableKind,
        livestock_circle_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<StockLedgerEntry>> {
        Ok(self
            .working
            .active_ledger(kind, livestock_circle_id, item_id)
            .cloned())
    }

    async fn lock_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>> {
        Ok(self.working.active_report(kind, id).cloned())
    }

    async fn set_remaining(
        &mut self,
        kind: ConsumableKind,
        ledger_id: Uuid,
        remaining: Decimal,
    ) -> AppResult<StockLedgerEntry> {
        let entry = self
            .working
            .ledgers
            .get_mut(&(kind, ledger_id))
            .ok_or_else(|| AppError::NotFound(format!("{} stock", kind.label())))?;
        entry.remaining = remaining;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn insert_report(
        &mut self,
        kind: ConsumableKind,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport> {
        let now = Utc::now();
        let report = ConsumptionReport {
            id: Uuid::new_v4(),
            item_id: record.item_id,
            report_id: record.report_id,
            quantity: record.quantity,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.working.reports.insert((kind, report.id), report.clone());
        Ok(report)
    }

    async fn update_report(
        &mut self,
        kind: ConsumableKind,
        id: Uuid,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport> {
        let report = self
            .working
            .reports
            .get_mut(&(kind, id))
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("{} report", kind.label())))?;
        report.item_id = record.item_id;
        report.report_id = record.report_id;
        report.quantity = record.quantity;
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn deactivate_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<()> {
        let report = self
            .working
            .reports
            .get_mut(&(kind, id))
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound(format!("{} report", kind.label())))?;
        report.is_active = false;
        report.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryLedgerTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let store = MemoryLedgerStore::new();
        let circle = Uuid::new_v4();
        let item = Uuid::new_v4();
        let ledger = store
            .add_ledger(ConsumableKind::Food, circle, item, Decimal::from(10))
            .await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_remaining(ConsumableKind::Food, ledger, Decimal::from(3))
                .await
                .unwrap();
        }

        assert_eq!(
            store.remaining(ConsumableKind::Food, ledger).await,
            Some(Decimal::from(10))
        );
    }

    #[tokio::test]
    async fn test_commit_writes_back() {
        let store = MemoryLedgerStore::new();
        let daily = store.add_daily_report(Uuid::new_v4()).await;

        let mut tx = store.begin().await.unwrap();
        let report = tx
            .insert_report(
                ConsumableKind::Medicine,
                ConsumptionRecord {
                    item_id: Uuid::new_v4(),
                    report_id: daily,
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(store
            .find_report(ConsumableKind::Medicine, report.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_report(ConsumableKind::Food, report.id)
            .await
            .unwrap()
            .is_none());
    }
}
