//! Livestock circle service: cohorts of animals raised together in a barn,
//! and the food and medicine stock each circle is provisioned with

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    numeric_limit, validate_average_weight, validate_circle_units, validate_name,
    validate_stock_quantity, CircleStatus, ConsumableKind, ListQuery, PaginatedResponse,
    STOCK_PRECISION, STOCK_SCALE,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{tables, StockLedgerEntry};

#[derive(Clone)]
pub struct CircleService {
    db: PgPool,
}

/// Livestock circle information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LivestockCircle {
    pub id: Uuid,
    pub livestock_circle_name: String,
    pub barn_id: Uuid,
    pub breed_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub total_unit: i32,
    pub dead_unit: i32,
    pub average_weight: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LivestockCircle {
    pub fn status(&self) -> Option<CircleStatus> {
        CircleStatus::from_str(&self.status)
    }
}

/// Filters for listing circles
#[derive(Debug, Default, Deserialize)]
pub struct CircleFilter {
    pub barn_id: Option<Uuid>,
    pub status: Option<CircleStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCircleInput {
    #[validate(length(min = 1, max = 100, message = "Circle name must be 1-100 characters"))]
    pub livestock_circle_name: String,
    pub barn_id: Uuid,
    pub breed_id: Uuid,
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Total unit cannot be negative"))]
    pub total_unit: i32,
    pub average_weight: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCircleInput {
    #[validate(length(min = 1, max = 100, message = "Circle name must be 1-100 characters"))]
    pub livestock_circle_name: Option<String>,
    pub breed_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "Total unit cannot be negative"))]
    pub total_unit: Option<i32>,
    #[validate(range(min = 0, message = "Dead unit cannot be negative"))]
    pub dead_unit: Option<i32>,
    pub average_weight: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusInput {
    pub status: CircleStatus,
}

/// Input for provisioning a circle with food or medicine stock
#[derive(Debug, Deserialize)]
pub struct ProvisionStockInput {
    #[serde(alias = "food_id", alias = "medicine_id")]
    pub item_id: Uuid,
    pub quantity: Decimal,
}

const CIRCLE_COLUMNS: &str = "id, livestock_circle_name, barn_id, breed_id, status, start_date, \
     end_date, total_unit, dead_unit, average_weight, is_active, created_at, updated_at";

impl CircleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active circles
    pub async fn list_circles(
        &self,
        filter: &CircleFilter,
        query: &ListQuery,
    ) -> AppResult<PaginatedResponse<LivestockCircle>> {
        let pattern = query.search_pattern();
        let status = filter.status.map(|s| s.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM livestock_circles
            WHERE is_active = TRUE AND livestock_circle_name ILIKE $1
              AND ($2::UUID IS NULL OR barn_id = $2)
              AND ($3::VARCHAR IS NULL OR status = $3)
            "#,
        )
        .bind(&pattern)
        .bind(filter.barn_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let circles = sqlx::query_as::<_, LivestockCircle>(&format!(
            r#"
            SELECT {CIRCLE_COLUMNS}
            FROM livestock_circles
            WHERE is_active = TRUE AND livestock_circle_name ILIKE $1
              AND ($2::UUID IS NULL OR barn_id = $2)
              AND ($3::VARCHAR IS NULL OR status = $3)
            ORDER BY start_date DESC, livestock_circle_name
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(&pattern)
        .bind(filter.barn_id)
        .bind(status)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(circles, query, total))
    }

    pub async fn get_circle(&self, circle_id: Uuid) -> AppResult<LivestockCircle> {
        sqlx::query_as::<_, LivestockCircle>(&format!(
            "SELECT {CIRCLE_COLUMNS} FROM livestock_circles WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(circle_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Livestock circle".to_string()))
    }

    /// Create a circle in a barn. New circles start out pending.
    pub async fn create_circle(&self, input: CreateCircleInput) -> AppResult<LivestockCircle> {
        input.validate()?;
        let name = input.livestock_circle_name.trim().to_string();
        validate_name(&name).map_err(|msg| AppError::validation("livestock_circle_name", msg))?;
        let average_weight = input.average_weight.unwrap_or(Decimal::ZERO);
        validate_average_weight(average_weight)
            .map_err(|msg| AppError::validation("average_weight", msg))?;

        self.ensure_active("barns", input.barn_id, "Barn").await?;
        self.ensure_active("breeds", input.breed_id, "Breed").await?;
        self.ensure_unique_name(input.barn_id, &name, None).await?;

        let start_date = input.start_date.unwrap_or_else(|| Utc::now().date_naive());

        let circle = sqlx::query_as::<_, LivestockCircle>(&format!(
            r#"
            INSERT INTO livestock_circles
                (livestock_circle_name, barn_id, breed_id, status, start_date, total_unit, average_weight)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CIRCLE_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(input.barn_id)
        .bind(input.breed_id)
        .bind(CircleStatus::Pending.as_str())
        .bind(start_date)
        .bind(input.total_unit)
        .bind(average_weight)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(circle_id = %circle.id, barn_id = %circle.barn_id, "Livestock circle created");

        Ok(circle)
    }

    pub async fn update_circle(&self, circle_id: Uuid, input: UpdateCircleInput) -> AppResult<LivestockCircle> {
        input.validate()?;
        let existing = self.get_circle(circle_id).await?;

        let name = input
            .livestock_circle_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.livestock_circle_name);
        validate_name(&name).map_err(|msg| AppError::validation("livestock_circle_name", msg))?;
        let breed_id = input.breed_id.unwrap_or(existing.breed_id);
        let start_date = input.start_date.unwrap_or(existing.start_date);
        let total_unit = input.total_unit.unwrap_or(existing.total_unit);
        let dead_unit = input.dead_unit.unwrap_or(existing.dead_unit);
        let average_weight = input.average_weight.unwrap_or(existing.average_weight);

        validate_circle_units(total_unit, dead_unit)
            .map_err(|msg| AppError::validation("dead_unit", msg))?;
        validate_average_weight(average_weight)
            .map_err(|msg| AppError::validation("average_weight", msg))?;

        if breed_id != existing.breed_id {
            self.ensure_active("breeds", breed_id, "Breed").await?;
        }
        self.ensure_unique_name(existing.barn_id, &name, Some(circle_id)).await?;

        let circle = sqlx::query_as::<_, LivestockCircle>(&format!(
            r#"
            UPDATE livestock_circles
            SET livestock_circle_name = $1, breed_id = $2, start_date = $3, total_unit = $4,
                dead_unit = $5, average_weight = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {CIRCLE_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(breed_id)
        .bind(start_date)
        .bind(total_unit)
        .bind(dead_unit)
        .bind(average_weight)
        .bind(circle_id)
        .fetch_one(&self.db)
        .await?;

        Ok(circle)
    }

    /// Move a circle along its lifecycle; finishing or cancelling sets the end date
    pub async fn change_status(&self, circle_id: Uuid, next: CircleStatus) -> AppResult<LivestockCircle> {
        let existing = self.get_circle(circle_id).await?;
        let current = existing.status().ok_or_else(|| {
            AppError::Internal(format!("Unknown circle status: {}", existing.status))
        })?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move circle from {} to {}",
                current.as_str(),
                next.as_str()
            )));
        }

        let end_date = next.is_terminal().then(|| Utc::now().date_naive());

        let circle = sqlx::query_as::<_, LivestockCircle>(&format!(
            r#"
            UPDATE livestock_circles
            SET status = $1, end_date = COALESCE($2, end_date), updated_at = NOW()
            WHERE id = $3
            RETURNING {CIRCLE_COLUMNS}
            "#
        ))
        .bind(next.as_str())
        .bind(end_date)
        .bind(circle_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%circle_id, from = current.as_str(), to = next.as_str(), "Circle status changed");

        Ok(circle)
    }

    pub async fn delete_circle(&self, circle_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE livestock_circles SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(circle_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Livestock circle".to_string()));
        }

        tracing::info!(%circle_id, "Livestock circle deleted");

        Ok(())
    }

    /// Add stock of a food or medicine to a circle. The first allotment
    /// creates the ledger row, later ones top it up.
    pub async fn provision_stock(
        &self,
        circle_id: Uuid,
        kind: ConsumableKind,
        input: ProvisionStockInput,
    ) -> AppResult<StockLedgerEntry> {
        validate_stock_quantity(input.quantity)
            .map_err(|msg| AppError::validation("quantity", msg))?;

        let circle = self.get_circle(circle_id).await?;
        if circle.status().map_or(true, |s| s.is_terminal()) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot provision a circle that is {}",
                circle.status
            )));
        }

        let t = tables(kind);
        self.ensure_active(t.item, input.item_id, kind.label()).await?;

        let entry = sqlx::query_as::<_, StockLedgerEntry>(&format!(
            r#"
            INSERT INTO {ledger} (livestock_circle_id, {item_column}, remaining)
            VALUES ($1, $2, $3)
            ON CONFLICT (livestock_circle_id, {item_column}) WHERE is_active
            DO UPDATE SET remaining = {ledger}.remaining + EXCLUDED.remaining, updated_at = NOW()
            WHERE {ledger}.remaining + EXCLUDED.remaining < $4
            RETURNING id, livestock_circle_id, {item_column} AS item_id, remaining, is_active,
                      created_at, updated_at
            "#,
            ledger = t.ledger,
            item_column = t.item_column,
        ))
        .bind(circle_id)
        .bind(input.item_id)
        .bind(input.quantity)
        .bind(numeric_limit(STOCK_PRECISION, STOCK_SCALE))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::validation("quantity", "Stock would exceed the largest storable amount")
        })?;

        tracing::info!(
            %circle_id,
            kind = %kind,
            ledger_id = %entry.id,
            added = %input.quantity,
            remaining = %entry.remaining,
            "Circle stock provisioned"
        );

        Ok(entry)
    }

    /// Active ledger rows of a circle
    pub async fn list_stock(&self, circle_id: Uuid, kind: ConsumableKind) -> AppResult<Vec<StockLedgerEntry>> {
        self.get_circle(circle_id).await?;

        let t = tables(kind);
        let entries = sqlx::query_as::<_, StockLedgerEntry>(&format!(
            r#"
            SELECT id, livestock_circle_id, {item_column} AS item_id, remaining, is_active,
                   created_at, updated_at
            FROM {ledger}
            WHERE livestock_circle_id = $1 AND is_active = TRUE
            ORDER BY created_at
            "#,
            ledger = t.ledger,
            item_column = t.item_column,
        ))
        .bind(circle_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn ensure_active(&self, table: &'static str, id: Uuid, label: &str) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1 AND is_active = TRUE)"
        ))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound(label.to_string()));
        }

        Ok(())
    }

    async fn ensure_unique_name(&self, barn_id: Uuid, name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM livestock_circles
                WHERE barn_id = $1 AND LOWER(livestock_circle_name) = LOWER($2) AND is_active = TRUE
                  AND ($3::UUID IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(barn_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("livestock_circle_name".to_string()));
        }

        Ok(())
    }
}
