//! Barn plan service
//!
//! A barn plan schedules care for a livestock circle over a time window.
//! Daily plans always span one whole calendar day, see `PlanWindow::resolve`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ListQuery, PaginatedResponse, PlanWindow};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BarnPlanService {
    db: PgPool,
}

/// Barn plan information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BarnPlan {
    pub id: Uuid,
    pub livestock_circle_id: Uuid,
    pub note: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_daily_plan: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BarnPlanFilter {
    pub livestock_circle_id: Option<Uuid>,
    /// Only plans whose window contains this instant
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBarnPlanInput {
    pub livestock_circle_id: Uuid,
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_daily_plan: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBarnPlanInput {
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_daily_plan: Option<bool>,
}

const PLAN_COLUMNS: &str = "id, livestock_circle_id, note, start_date, end_date, is_daily_plan, \
     is_active, created_at, updated_at";

impl BarnPlanService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_plans(
        &self,
        filter: &BarnPlanFilter,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<BarnPlan>> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM barn_plans
            WHERE is_active = TRUE
              AND ($1::UUID IS NULL OR livestock_circle_id = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR (start_date <= $2 AND end_date >= $2))
            "#,
        )
        .bind(filter.livestock_circle_id)
        .bind(filter.at)
        .fetch_one(&self.db)
        .await?;

        let plans = sqlx::query_as::<_, BarnPlan>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM barn_plans
            WHERE is_active = TRUE
              AND ($1::UUID IS NULL OR livestock_circle_id = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR (start_date <= $2 AND end_date >= $2))
            ORDER BY start_date DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.livestock_circle_id)
        .bind(filter.at)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(plans, query, total))
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> AppResult<BarnPlan> {
        sqlx::query_as::<_, BarnPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM barn_plans WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(plan_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Barn plan".to_string()))
    }

    pub async fn create_plan(&self, input: CreateBarnPlanInput) -> AppResult<BarnPlan> {
        input.validate()?;
        let window = resolve_window(input.is_daily_plan, input.start_date, input.end_date)?;

        let circle_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM livestock_circles WHERE id = $1 AND is_active = TRUE)",
        )
        .bind(input.livestock_circle_id)
        .fetch_one(&self.db)
        .await?;

        if !circle_exists {
            return Err(AppError::NotFound("Livestock circle".to_string()));
        }

        let plan = sqlx::query_as::<_, BarnPlan>(&format!(
            r#"
            INSERT INTO barn_plans (livestock_circle_id, note, start_date, end_date, is_daily_plan)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(input.livestock_circle_id)
        .bind(&input.note)
        .bind(window.start_date)
        .bind(window.end_date)
        .bind(input.is_daily_plan)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            plan_id = %plan.id,
            circle_id = %plan.livestock_circle_id,
            daily = plan.is_daily_plan,
            "Barn plan created"
        );

        Ok(plan)
    }

    /// Update a plan; the window is re-resolved from the merged values
    pub async fn update_plan(&self, plan_id: Uuid, input: UpdateBarnPlanInput) -> AppResult<BarnPlan> {
        input.validate()?;
        let existing = self.get_plan(plan_id).await?;

        let is_daily_plan = input.is_daily_plan.unwrap_or(existing.is_daily_plan);
        let start_date = input.start_date.unwrap_or(existing.start_date);
        let end_date = input.end_date.unwrap_or(existing.end_date);
        let note = input.note.or(existing.note);

        let window = resolve_window(is_daily_plan, Some(start_date), Some(end_date))?;

        let plan = sqlx::query_as::<_, BarnPlan>(&format!(
            r#"
            UPDATE barn_plans
            SET note = $1, start_date = $2, end_date = $3, is_daily_plan = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(&note)
        .bind(window.start_date)
        .bind(window.end_date)
        .bind(is_daily_plan)
        .bind(plan_id)
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    pub async fn delete_plan(&self, plan_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE barn_plans SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(plan_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Barn plan".to_string()));
        }

        tracing::info!(%plan_id, "Barn plan deleted");

        Ok(())
    }
}

fn resolve_window(
    is_daily_plan: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> AppResult<PlanWindow> {
    PlanWindow::resolve(is_daily_plan, start_date, end_date, Utc::now().date_naive())
        .map_err(|msg| AppError::validation("start_date", msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_daily_plan_without_dates_covers_today() {
        let window = resolve_window(true, None, None).unwrap();
        let today = Utc::now().date_naive();
        assert_eq!(window.start_date.date_naive(), today);
        assert_eq!(window.end_date.date_naive(), today);
        assert_eq!(window.start_date.hour(), 0);
        assert_eq!(window.end_date.hour(), 23);
    }

    #[test]
    fn test_ranged_plan_missing_end_is_validation_error() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        match resolve_window(false, Some(start), None) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "start_date"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_create_input_defaults_to_ranged_plan() {
        let circle = Uuid::new_v4();
        let input: CreateBarnPlanInput =
            serde_json::from_str(&format!(r#"{{"livestock_circle_id": "{circle}"}}"#)).unwrap();
        assert!(!input.is_daily_plan);
        assert!(input.start_date.is_none());
    }
}
