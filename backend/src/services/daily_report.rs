//! Daily report service: per-day head counts of a livestock circle

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{validate_unit_counts, ListQuery, PaginatedResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct DailyReportService {
    db: PgPool,
}

/// Daily report information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyReport {
    pub id: Uuid,
    pub livestock_circle_id: Uuid,
    pub report_date: NaiveDate,
    pub dead_unit: i32,
    pub good_unit: i32,
    pub bad_unit: i32,
    pub note: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyReportFilter {
    pub livestock_circle_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDailyReportInput {
    pub livestock_circle_id: Uuid,
    /// Defaults to today
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub dead_unit: i32,
    #[serde(default)]
    pub good_unit: i32,
    #[serde(default)]
    pub bad_unit: i32,
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDailyReportInput {
    pub report_date: Option<NaiveDate>,
    pub dead_unit: Option<i32>,
    pub good_unit: Option<i32>,
    pub bad_unit: Option<i32>,
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
}

const REPORT_COLUMNS: &str = "id, livestock_circle_id, report_date, dead_unit, good_unit, bad_unit, \
     note, is_active, created_at, updated_at";

impl DailyReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active daily reports, newest first
    pub async fn list_reports(
        &self,
        filter: &DailyReportFilter,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<DailyReport>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM daily_reports
            WHERE is_active = TRUE
              AND ($1::UUID IS NULL OR livestock_circle_id = $1)
              AND ($2::DATE IS NULL OR report_date >= $2)
              AND ($3::DATE IS NULL OR report_date <= $3)
            "#,
        )
        .bind(filter.livestock_circle_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(&self.db)
        .await?;

        let reports = sqlx::query_as::<_, DailyReport>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM daily_reports
            WHERE is_active = TRUE
              AND ($1::UUID IS NULL OR livestock_circle_id = $1)
              AND ($2::DATE IS NULL OR report_date >= $2)
              AND ($3::DATE IS NULL OR report_date <= $3)
            ORDER BY report_date DESC, created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.livestock_circle_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(reports, query, total))
    }

    pub async fn get_report(&self, report_id: Uuid) -> AppResult<DailyReport> {
        sqlx::query_as::<_, DailyReport>(&format!(
            "SELECT {REPORT_COLUMNS} FROM daily_reports WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(report_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Daily report".to_string()))
    }

    pub async fn create_report(&self, input: CreateDailyReportInput) -> AppResult<DailyReport> {
        input.validate()?;
        validate_unit_counts(input.dead_unit, input.good_unit, input.bad_unit)
            .map_err(|msg| AppError::validation("units", msg))?;

        let circle_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM livestock_circles WHERE id = $1 AND is_active = TRUE)",
        )
        .bind(input.livestock_circle_id)
        .fetch_one(&self.db)
        .await?;

        if !circle_exists {
            return Err(AppError::NotFound("Livestock circle".to_string()));
        }

        let report_date = input.report_date.unwrap_or_else(|| Utc::now().date_naive());

        let report = sqlx::query_as::<_, DailyReport>(&format!(
            r#"
            INSERT INTO daily_reports (livestock_circle_id, report_date, dead_unit, good_unit, bad_unit, note)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(input.livestock_circle_id)
        .bind(report_date)
        .bind(input.dead_unit)
        .bind(input.good_unit)
        .bind(input.bad_unit)
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            daily_report_id = %report.id,
            circle_id = %report.livestock_circle_id,
            "Daily report created for {}",
            report.report_date
        );

        Ok(report)
    }

    pub async fn update_report(&self, report_id: Uuid, input: UpdateDailyReportInput) -> AppResult<DailyReport> {
        input.validate()?;
        let existing = self.get_report(report_id).await?;

        let report_date = input.report_date.unwrap_or(existing.report_date);
        let dead_unit = input.dead_unit.unwrap_or(existing.dead_unit);
        let good_unit = input.good_unit.unwrap_or(existing.good_unit);
        let bad_unit = input.bad_unit.unwrap_or(existing.bad_unit);
        let note = input.note.or(existing.note);

        validate_unit_counts(dead_unit, good_unit, bad_unit)
            .map_err(|msg| AppError::validation("units", msg))?;

        let report = sqlx::query_as::<_, DailyReport>(&format!(
            r#"
            UPDATE daily_reports
            SET report_date = $1, dead_unit = $2, good_unit = $3, bad_unit = $4, note = $5,
                updated_at = NOW()
            WHERE id = $6
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report_date)
        .bind(dead_unit)
        .bind(good_unit)
        .bind(bad_unit)
        .bind(&note)
        .bind(report_id)
        .fetch_one(&self.db)
        .await?;

        Ok(report)
    }

    /// Soft delete. Consumption reports attached to it are left as they are.
    pub async fn delete_report(&self, report_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE daily_reports SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(report_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Daily report".to_string()));
        }

        tracing::info!(daily_report_id = %report_id, "Daily report deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults_counts_to_zero() {
        let circle = Uuid::new_v4();
        let input: CreateDailyReportInput =
            serde_json::from_str(&format!(r#"{{"livestock_circle_id": "{circle}", "dead_unit": 2}}"#))
                .unwrap();
        assert_eq!(input.dead_unit, 2);
        assert_eq!(input.good_unit, 0);
        assert_eq!(input.bad_unit, 0);
        assert!(input.report_date.is_none());
    }

    #[test]
    fn test_note_length_validated() {
        let input = UpdateDailyReportInput {
            report_date: None,
            dead_unit: None,
            good_unit: None,
            bad_unit: None,
            note: Some("x".repeat(2001)),
        };
        assert!(input.validate().is_err());
    }
}
