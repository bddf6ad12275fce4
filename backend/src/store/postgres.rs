//! PostgreSQL ledger store
//!
//! Ledger and report rows are locked with `SELECT ... FOR UPDATE` inside one
//! transaction, so two reports drawing from the same ledger row serialize
//! and the remaining-stock check always sees the committed value.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::ConsumableKind;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    tables, ConsumptionRecord, ConsumptionReport, DailyReportRef, LedgerStore, LedgerTransaction,
    StockLedgerEntry,
};
use crate::error::{AppError, AppResult};

/// Ledger store backed by the application database
#[derive(Clone)]
pub struct PgLedgerStore {
    db: PgPool,
}

impl PgLedgerStore {
    /// Create a new PgLedgerStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn ledger_columns(kind: ConsumableKind) -> String {
    format!(
        "id, livestock_circle_id, {} AS item_id, remaining, is_active, created_at, updated_at",
        tables(kind).item_column
    )
}

fn report_columns(kind: ConsumableKind) -> String {
    format!(
        "id, {} AS item_id, report_id, quantity, is_active, created_at, updated_at",
        tables(kind).item_column
    )
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgLedgerTransaction { tx }))
    }

    async fn find_report(&self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_active = TRUE",
            report_columns(kind),
            tables(kind).report
        );

        let report = sqlx::query_as::<_, ConsumptionReport>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(report)
    }

    async fn list_reports(
        &self,
        kind: ConsumableKind,
        daily_report_id: Uuid,
    ) -> AppResult<Vec<ConsumptionReport>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE report_id = $1 AND is_active = TRUE ORDER BY created_at",
            report_columns(kind),
            tables(kind).report
        );

        let reports = sqlx::query_as::<_, ConsumptionReport>(&sql)
            .bind(daily_report_id)
            .fetch_all(&self.db)
            .await?;

        Ok(reports)
    }
}

struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn daily_report(&mut self, id: Uuid) -> AppResult<Option<DailyReportRef>> {
        let report = sqlx::query_as::<_, DailyReportRef>(
            "SELECT id, livestock_circle_id, is_active FROM daily_reports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(report)
    }

    async fn lock_ledger(
        &mut self,
        kind: ConsumableKind,
        livestock_circle_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<Option<StockLedgerEntry>> {
        let t = tables(kind);
        let sql = format!(
            "SELECT {} FROM {} WHERE livestock_circle_id = $1 AND {} = $2 AND is_active = TRUE FOR UPDATE",
            ledger_columns(kind),
            t.ledger,
            t.item_column
        );

        let entry = sqlx::query_as::<_, StockLedgerEntry>(&sql)
            .bind(livestock_circle_id)
            .bind(item_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(entry)
    }

    async fn lock_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<Option<ConsumptionReport>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_active = TRUE FOR UPDATE",
            report_columns(kind),
            tables(kind).report
        );

        let report = sqlx::query_as::<_, ConsumptionReport>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(report)
    }

    async fn set_remaining(
        &mut self,
        kind: ConsumableKind,
        ledger_id: Uuid,
        remaining: Decimal,
    ) -> AppResult<StockLedgerEntry> {
        let sql = format!(
            "UPDATE {} SET remaining = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            tables(kind).ledger,
            ledger_columns(kind)
        );

        sqlx::query_as::<_, StockLedgerEntry>(&sql)
            .bind(remaining)
            .bind(ledger_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} stock", kind.label())))
    }

    async fn insert_report(
        &mut self,
        kind: ConsumableKind,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport> {
        let t = tables(kind);
        let sql = format!(
            "INSERT INTO {} ({}, report_id, quantity) VALUES ($1, $2, $3) RETURNING {}",
            t.report,
            t.item_column,
            report_columns(kind)
        );

        let report = sqlx::query_as::<_, ConsumptionReport>(&sql)
            .bind(record.item_id)
            .bind(record.report_id)
            .bind(record.quantity)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(report)
    }

    async fn update_report(
        &mut self,
        kind: ConsumableKind,
        id: Uuid,
        record: ConsumptionRecord,
    ) -> AppResult<ConsumptionReport> {
        let t = tables(kind);
        let sql = format!(
            r#"
            UPDATE {}
            SET {} = $1, report_id = $2, quantity = $3, updated_at = NOW()
            WHERE id = $4 AND is_active = TRUE
            RETURNING {}
            "#,
            t.report,
            t.item_column,
            report_columns(kind)
        );

        sqlx::query_as::<_, ConsumptionReport>(&sql)
            .bind(record.item_id)
            .bind(record.report_id)
            .bind(record.quantity)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} report", kind.label())))
    }

    async fn deactivate_report(&mut self, kind: ConsumableKind, id: Uuid) -> AppResult<()> {
        let sql = format!(
            "UPDATE {} SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
            tables(kind).report
        );

        let result = sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} report", kind.label())));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
