//! Food and medicine catalog service
//!
//! Foods and medicines share one shape and live in their own tables; the
//! consumable kind picks the table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{validate_name, validate_weight_per_unit, ConsumableKind, ListQuery, PaginatedResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::tables;

/// Catalog service for one consumable kind
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
    kind: ConsumableKind,
}

/// A food or medicine
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CatalogItem {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Kilograms per unit; required for foods
    pub weight_per_unit: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCatalogItemInput {
    #[serde(alias = "food_name", alias = "medicine_name")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(alias = "food_category", alias = "medicine_category")]
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub weight_per_unit: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCatalogItemInput {
    #[serde(alias = "food_name", alias = "medicine_name")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(alias = "food_category", alias = "medicine_category")]
    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
    pub description: Option<String>,
    pub weight_per_unit: Option<Decimal>,
}

const ITEM_COLUMNS: &str =
    "id, name, category, description, weight_per_unit, is_active, created_at, updated_at";

impl CatalogService {
    pub fn new(db: PgPool, kind: ConsumableKind) -> Self {
        Self { db, kind }
    }

    pub fn kind(&self) -> ConsumableKind {
        self.kind
    }

    fn table(&self) -> &'static str {
        tables(self.kind).item
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(self.kind.label().to_string())
    }

    /// List active items
    pub async fn list_items(&self, query: &ListQuery) -> AppResult<PaginatedResponse<CatalogItem>> {
        let pattern = query.search_pattern();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {} WHERE is_active = TRUE AND name ILIKE $1",
            self.table()
        ))
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM {}
            WHERE is_active = TRUE AND name ILIKE $1
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
            self.table()
        ))
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(items, query, total))
    }

    pub async fn get_item(&self, item_id: Uuid) -> AppResult<CatalogItem> {
        sqlx::query_as::<_, CatalogItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM {} WHERE id = $1 AND is_active = TRUE",
            self.table()
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| self.not_found())
    }

    pub async fn create_item(&self, input: CreateCatalogItemInput) -> AppResult<CatalogItem> {
        input.validate()?;
        let name = input.name.trim().to_string();
        validate_name(&name).map_err(|msg| AppError::validation("name", msg))?;
        self.check_weight(input.weight_per_unit)?;

        self.ensure_unique_name(&name, None).await?;

        let item = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            INSERT INTO {} (name, category, description, weight_per_unit)
            VALUES ($1, $2, $3, $4)
            RETURNING {ITEM_COLUMNS}
            "#,
            self.table()
        ))
        .bind(&name)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.weight_per_unit)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(kind = %self.kind, item_id = %item.id, "Catalog item created: {}", item.name);

        Ok(item)
    }

    pub async fn update_item(&self, item_id: Uuid, input: UpdateCatalogItemInput) -> AppResult<CatalogItem> {
        input.validate()?;
        let existing = self.get_item(item_id).await?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        validate_name(&name).map_err(|msg| AppError::validation("name", msg))?;
        let category = input.category.or(existing.category);
        let description = input.description.or(existing.description);
        let weight_per_unit = input.weight_per_unit.or(existing.weight_per_unit);
        self.check_weight(weight_per_unit)?;

        self.ensure_unique_name(&name, Some(item_id)).await?;

        let item = sqlx::query_as::<_, CatalogItem>(&format!(
            r#"
            UPDATE {}
            SET name = $1, category = $2, description = $3, weight_per_unit = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING {ITEM_COLUMNS}
            "#,
            self.table()
        ))
        .bind(&name)
        .bind(&category)
        .bind(&description)
        .bind(weight_per_unit)
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    pub async fn delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
            self.table()
        ))
        .bind(item_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.not_found());
        }

        tracing::info!(kind = %self.kind, %item_id, "Catalog item deleted");

        Ok(())
    }

    /// Foods need a positive weight per unit; medicines may omit it
    fn check_weight(&self, weight_per_unit: Option<Decimal>) -> AppResult<()> {
        match (self.kind, weight_per_unit) {
            (ConsumableKind::Food, None) => Err(AppError::validation(
                "weight_per_unit",
                "Weight per unit is required for food",
            )),
            (_, Some(weight)) => validate_weight_per_unit(weight)
                .map_err(|msg| AppError::validation("weight_per_unit", msg)),
            (ConsumableKind::Medicine, None) => Ok(()),
        }
    }

    async fn ensure_unique_name(&self, name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(&format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM {}
                WHERE LOWER(name) = LOWER($1) AND is_active = TRUE
                  AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
            self.table()
        ))
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry(format!("{} name", self.kind.as_str())));
        }

        Ok(())
    }
}
