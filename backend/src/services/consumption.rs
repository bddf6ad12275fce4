//! Food and medicine consumption reports
//!
//! A consumption report records how much of one food or medicine a circle
//! used on a daily report. Creating, resizing or moving a report draws the
//! difference from the circle's stock ledger in the same unit of work, and
//! a ledger can never be drawn below zero.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{ledger, ConsumableKind};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{
    ConsumptionRecord, ConsumptionReport, DailyReportRef, LedgerStore, LedgerTransaction,
    StockLedgerEntry,
};

/// Consumption report service for one consumable kind
#[derive(Clone)]
pub struct ConsumptionService {
    store: Arc<dyn LedgerStore>,
    kind: ConsumableKind,
    restore_on_delete: bool,
}

/// Input for creating or replacing a consumption report
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConsumptionInput {
    /// Food or medicine id
    pub item_id: Uuid,
    /// Daily report the consumption belongs to
    pub report_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be greater than 0"))]
    pub quantity: i32,
}

/// Food report request body. `item_id` is accepted in place of `food_id`;
/// a `medicine_id` is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodReportInput {
    #[serde(alias = "item_id")]
    pub food_id: Uuid,
    pub report_id: Uuid,
    pub quantity: i32,
}

/// Medicine report request body, the mirror of [`FoodReportInput`]
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicineReportInput {
    #[serde(alias = "item_id")]
    pub medicine_id: Uuid,
    pub report_id: Uuid,
    pub quantity: i32,
}

impl From<FoodReportInput> for ConsumptionInput {
    fn from(input: FoodReportInput) -> Self {
        Self {
            item_id: input.food_id,
            report_id: input.report_id,
            quantity: input.quantity,
        }
    }
}

impl From<MedicineReportInput> for ConsumptionInput {
    fn from(input: MedicineReportInput) -> Self {
        Self {
            item_id: input.medicine_id,
            report_id: input.report_id,
            quantity: input.quantity,
        }
    }
}

/// A report together with what its ledger row has left afterwards
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionOutcome {
    #[serde(flatten)]
    pub report: ConsumptionReport,
    pub kind: ConsumableKind,
    pub remaining: Decimal,
}

type LedgerKey = (Uuid, Uuid);

impl ConsumptionService {
    pub fn new(store: Arc<dyn LedgerStore>, kind: ConsumableKind) -> Self {
        Self {
            store,
            kind,
            restore_on_delete: false,
        }
    }

    /// Give a deleted report's quantity back to its ledger row
    pub fn with_restore_on_delete(mut self, restore: bool) -> Self {
        self.restore_on_delete = restore;
        self
    }

    pub fn kind(&self) -> ConsumableKind {
        self.kind
    }

    /// Record consumption and draw it from the circle's ledger
    pub async fn create_report(&self, input: ConsumptionInput) -> AppResult<ConsumptionOutcome> {
        input.validate()?;

        let mut tx = self.store.begin().await?;

        let daily = self.active_daily_report(&mut *tx, input.report_id).await?;
        let entry = self
            .lock_ledger(&mut *tx, (daily.livestock_circle_id, input.item_id))
            .await?;

        let remaining = ledger::consume(entry.remaining, input.quantity)
            .map_err(|err| self.rejected(&entry, err))?;

        let entry = tx.set_remaining(self.kind, entry.id, remaining).await?;
        let report = tx.insert_report(self.kind, record(&input)).await?;
        tx.commit().await?;

        tracing::info!(
            kind = %self.kind,
            report_id = %report.id,
            ledger_id = %entry.id,
            quantity = report.quantity,
            remaining = %entry.remaining,
            "Consumption report created"
        );

        Ok(self.outcome(report, &entry))
    }

    /// Replace a report and re-charge the ledger with the difference
    pub async fn update_report(&self, id: Uuid, input: ConsumptionInput) -> AppResult<ConsumptionOutcome> {
        input.validate()?;

        let mut tx = self.store.begin().await?;

        let existing = tx
            .lock_report(self.kind, id)
            .await?
            .ok_or_else(|| self.report_not_found())?;

        let new_daily = self.active_daily_report(&mut *tx, input.report_id).await?;
        let old_circle = if existing.report_id == input.report_id {
            new_daily.livestock_circle_id
        } else {
            tx.daily_report(existing.report_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Daily report".to_string()))?
                .livestock_circle_id
        };

        let old_key = (old_circle, existing.item_id);
        let new_key = (new_daily.livestock_circle_id, input.item_id);

        let entry = if old_key == new_key {
            let entry = self.lock_ledger(&mut *tx, new_key).await?;
            let remaining = ledger::adjust(entry.remaining, existing.quantity, input.quantity)
                .map_err(|err| self.rejected(&entry, err))?;
            tx.set_remaining(self.kind, entry.id, remaining).await?
        } else {
            // Lock both rows in key order so two opposite moves cannot deadlock
            let (first, second) = if old_key < new_key {
                (old_key, new_key)
            } else {
                (new_key, old_key)
            };
            let first = self.lock_ledger(&mut *tx, first).await?;
            let second = self.lock_ledger(&mut *tx, second).await?;
            let (old_entry, new_entry) = if key_of(&first) == old_key {
                (first, second)
            } else {
                (second, first)
            };

            let new_remaining = ledger::consume(new_entry.remaining, input.quantity)
                .map_err(|err| self.rejected(&new_entry, err))?;
            let old_remaining = ledger::release(old_entry.remaining, existing.quantity)?;

            tx.set_remaining(self.kind, old_entry.id, old_remaining).await?;
            tx.set_remaining(self.kind, new_entry.id, new_remaining).await?
        };

        let report = tx.update_report(self.kind, id, record(&input)).await?;
        tx.commit().await?;

        tracing::info!(
            kind = %self.kind,
            report_id = %report.id,
            old_quantity = existing.quantity,
            new_quantity = report.quantity,
            remaining = %entry.remaining,
            "Consumption report updated"
        );

        Ok(self.outcome(report, &entry))
    }

    /// Soft delete a report.
    ///
    /// The consumed quantity stays drawn from the ledger unless the service
    /// was built with `with_restore_on_delete(true)`.
    pub async fn delete_report(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.store.begin().await?;

        let existing = tx
            .lock_report(self.kind, id)
            .await?
            .ok_or_else(|| self.report_not_found())?;

        if self.restore_on_delete {
            let daily = tx
                .daily_report(existing.report_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Daily report".to_string()))?;

            match tx
                .lock_ledger(self.kind, daily.livestock_circle_id, existing.item_id)
                .await?
            {
                Some(entry) => {
                    let remaining = ledger::release(entry.remaining, existing.quantity)?;
                    tx.set_remaining(self.kind, entry.id, remaining).await?;
                }
                None => tracing::warn!(
                    kind = %self.kind,
                    report_id = %id,
                    "No active ledger row to restore deleted report quantity to"
                ),
            }
        }

        tx.deactivate_report(self.kind, id).await?;
        tx.commit().await?;

        tracing::info!(
            kind = %self.kind,
            report_id = %id,
            restored = self.restore_on_delete,
            "Consumption report deleted"
        );

        Ok(())
    }

    pub async fn get_report(&self, id: Uuid) -> AppResult<ConsumptionReport> {
        self.store
            .find_report(self.kind, id)
            .await?
            .ok_or_else(|| self.report_not_found())
    }

    /// Active reports of a daily report
    pub async fn list_reports(&self, daily_report_id: Uuid) -> AppResult<Vec<ConsumptionReport>> {
        self.store.list_reports(self.kind, daily_report_id).await
    }

    async fn active_daily_report(
        &self,
        tx: &mut dyn LedgerTransaction,
        report_id: Uuid,
    ) -> AppResult<DailyReportRef> {
        tx.daily_report(report_id)
            .await?
            .filter(|report| report.is_active)
            .ok_or_else(|| AppError::NotFound("Daily report".to_string()))
    }

    async fn lock_ledger(
        &self,
        tx: &mut dyn LedgerTransaction,
        (livestock_circle_id, item_id): LedgerKey,
    ) -> AppResult<StockLedgerEntry> {
        tracing::debug!(kind = %self.kind, %livestock_circle_id, %item_id, "Locking ledger row");
        tx.lock_ledger(self.kind, livestock_circle_id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} stock for this circle", self.kind.label())))
    }

    fn rejected(&self, entry: &StockLedgerEntry, err: ledger::LedgerError) -> AppError {
        tracing::warn!(
            kind = %self.kind,
            ledger_id = %entry.id,
            remaining = %entry.remaining,
            "Stock draw rejected: {}",
            err
        );
        err.into()
    }

    fn report_not_found(&self) -> AppError {
        AppError::NotFound(format!("{} report", self.kind.label()))
    }

    fn outcome(&self, report: ConsumptionReport, entry: &StockLedgerEntry) -> ConsumptionOutcome {
        ConsumptionOutcome {
            report,
            kind: self.kind,
            remaining: entry.remaining,
        }
    }
}

fn record(input: &ConsumptionInput) -> ConsumptionRecord {
    ConsumptionRecord {
        item_id: input.item_id,
        report_id: input.report_id,
        quantity: input.quantity,
    }
}

fn key_of(entry: &StockLedgerEntry) -> LedgerKey {
    (entry.livestock_circle_id, entry.item_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;

    fn input(item_id: Uuid, report_id: Uuid, quantity: i32) -> ConsumptionInput {
        ConsumptionInput {
            item_id,
            report_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_touching_store() {
        let store = MemoryLedgerStore::new();
        let service = ConsumptionService::new(Arc::new(store.clone()), ConsumableKind::Food);

        let err = service
            .create_report(input(Uuid::new_v4(), Uuid::new_v4(), 0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(store.active_report_count(ConsumableKind::Food).await, 0);
    }

    #[tokio::test]
    async fn test_missing_daily_report_is_not_found() {
        let service = ConsumptionService::new(Arc::new(MemoryLedgerStore::new()), ConsumableKind::Medicine);

        let err = service
            .create_report(input(Uuid::new_v4(), Uuid::new_v4(), 3))
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(what) => assert_eq!(what, "Daily report"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_ledger_row_is_not_found() {
        let store = MemoryLedgerStore::new();
        let daily = store.add_daily_report(Uuid::new_v4()).await;
        let service = ConsumptionService::new(Arc::new(store), ConsumableKind::Medicine);

        let err = service
            .create_report(input(Uuid::new_v4(), daily, 3))
            .await
            .unwrap_err();

        match err {
            AppError::NotFound(what) => assert_eq!(what, "Medicine stock for this circle"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_food_and_medicine_ledgers_are_separate() {
        let store = MemoryLedgerStore::new();
        let circle = Uuid::new_v4();
        let item = Uuid::new_v4();
        let daily = store.add_daily_report(circle).await;
        let food_ledger = store
            .add_ledger(ConsumableKind::Food, circle, item, Decimal::from(10))
            .await;

        let medicine = ConsumptionService::new(Arc::new(store.clone()), ConsumableKind::Medicine);
        assert!(medicine.create_report(input(item, daily, 1)).await.is_err());
        assert_eq!(
            store.remaining(ConsumableKind::Food, food_ledger).await,
            Some(Decimal::from(10))
        );
    }

    #[test]
    fn test_report_inputs_only_accept_their_own_item_key() {
        let (item, daily) = (Uuid::new_v4(), Uuid::new_v4());

        let food: FoodReportInput = serde_json::from_str(&format!(
            r#"{{"food_id": "{item}", "report_id": "{daily}", "quantity": 4}}"#
        ))
        .unwrap();
        let food: ConsumptionInput = food.into();
        assert_eq!(food.item_id, item);
        assert_eq!(food.quantity, 4);

        let medicine: MedicineReportInput = serde_json::from_str(&format!(
            r#"{{"item_id": "{item}", "report_id": "{daily}", "quantity": 2}}"#
        ))
        .unwrap();
        assert_eq!(ConsumptionInput::from(medicine).item_id, item);

        assert!(serde_json::from_str::<MedicineReportInput>(&format!(
            r#"{{"food_id": "{item}", "report_id": "{daily}", "quantity": 2}}"#
        ))
        .is_err());
        assert!(serde_json::from_str::<FoodReportInput>(&format!(
            r#"{{"medicine_id": "{item}", "report_id": "{daily}", "quantity": 2}}"#
        ))
        .is_err());
    }
}
