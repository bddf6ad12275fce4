//! Storage seam for circle stock ledgers and consumption reports
//!
//! A consumption report and the ledger row it draws from must change
//! together. `LedgerStore::begin` hands out a unit of work that holds the
//! rows it touches locked until `commit`; dropping it without committing
//! discards every change made through it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::ConsumableKind;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Remaining stock of one food or medicine within one livestock circle
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockLedgerEntry {
    pub id: Uuid,
    pub livestock_circle_id: Uuid,
    pub item_id: Uuid,
    pub remaining: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quantity of one food or medicine consumed on a daily report
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConsumptionReport {
    pub id: Uuid,
    pub item_id: Uuid,
    pub report_id: Uuid,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The parts of a daily report the ledger protocol needs
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DailyReportRef {
    pub id: Uuid,
    pub livestock_circle_id: Uuid,
    pub is_active: bool,
}

/// Values written to a consumption report row
#[derive(Debug, Clone, Copy)]
pub struct ConsumptionRecord {
    pub item_id: Uuid,
    pub report_id: Uuid,
    pub quantity: i32,
}

/// Table layout of one consumable kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct KindTables {
    pub item: &'static str,
    pub ledger: &'static str,
    pub report: &'static str,
    pub item_column: &'static str,
}

pub(crate) fn tables(kind: ConsumableKind) -> KindTables {
    match kind {
        ConsumableKind::Food => KindTables {
            item: "foods",
            ledger: "livestock_circle_foods",
            report: "food_reports",
            item_column: "food_id",
        },
        ConsumableKind::Medicine => KindTables {
            item: "medicines",
            ledger: "livestock_circle_medicines",
            report: "medicine_reports",
            item_column: "medicine_id",
        },
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>>;

    async fn find_report(&self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>>;

    /// Active reports attached to a daily report, oldest first
    async fn list_reports(
        &self,
        kind: ConsumableKind,
        daily_report_id: Uuid,
    ) -> AppResult<Vec<ConsumptionReport>>;
}

/// Unit of work over ledgers and reports
#[async_trait]
pub trait LedgerTransaction: Send {
    async fn daily_report(&mut self, id: Uuid) -> AppResult<Option<DailyReportRef>>;

    /// Active ledger row for `(circle, item)`, locked until commit
    async fn lock_ledger(
        &mut self,
        kind: ConsumableKind,
        livestock_circle_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<StockLedgerEntry>>;

    /// Active report row, locked until commit
    async fn lock_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>>;

    async fn set_remaining(
        &mut self,
        kind: ConsumableKind,
        ledger_id: Uuid,
        remaining: Decimal,
    ) -> AppResult<StockLedgerEntry>;

    async fn insert_report(
        &mut self,
        kind: ConsumableKind,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport>;

    async fn update_report(
        &mut self,
        kind: ConsumableKind,
        id: Uuid,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport>;

    /// Soft delete
    async fn deactivate_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
