//! Barn management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{validate_name, ListQuery, PaginatedResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Barn service for managing barns
#[derive(Clone)]
pub struct BarnService {
    db: PgPool,
}

/// Barn information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Barn {
    pub id: Uuid,
    pub barn_name: String,
    pub address: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a barn
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBarnInput {
    #[validate(length(min = 1, max = 100, message = "Barn name must be 1-100 characters"))]
    pub barn_name: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

/// Input for updating a barn
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBarnInput {
    #[validate(length(min = 1, max = 100, message = "Barn name must be 1-100 characters"))]
    pub barn_name: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
}

const BARN_COLUMNS: &str = "id, barn_name, address, image_url, is_active, created_at, updated_at";

impl BarnService {
    /// Create a new BarnService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List active barns
    pub async fn list_barns(&self, query: &ListQuery) -> AppResult<PaginatedResponse<Barn>> {
        let pattern = query.search_pattern();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM barns WHERE is_active = TRUE AND barn_name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let barns = sqlx::query_as::<_, Barn>(&format!(
            r#"
            SELECT {BARN_COLUMNS}
            FROM barns
            WHERE is_active = TRUE AND barn_name ILIKE $1
            ORDER BY barn_name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(barns, query, total))
    }

    /// Get a barn by ID
    pub async fn get_barn(&self, barn_id: Uuid) -> AppResult<Barn> {
        sqlx::query_as::<_, Barn>(&format!(
            "SELECT {BARN_COLUMNS} FROM barns WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(barn_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Barn".to_string()))
    }

    /// Create a new barn
    pub async fn create_barn(&self, input: CreateBarnInput) -> AppResult<Barn> {
        input.validate()?;
        let barn_name = input.barn_name.trim().to_string();
        validate_name(&barn_name).map_err(|msg| AppError::validation("barn_name", msg))?;

        self.ensure_unique_name(&barn_name, None).await?;

        let barn = sqlx::query_as::<_, Barn>(&format!(
            r#"
            INSERT INTO barns (barn_name, address, image_url)
            VALUES ($1, $2, $3)
            RETURNING {BARN_COLUMNS}
            "#
        ))
        .bind(&barn_name)
        .bind(input.address.trim())
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(barn_id = %barn.id, "Barn created: {}", barn.barn_name);

        Ok(barn)
    }

    /// Update a barn
    pub async fn update_barn(&self, barn_id: Uuid, input: UpdateBarnInput) -> AppResult<Barn> {
        input.validate()?;
        let existing = self.get_barn(barn_id).await?;

        let barn_name = input
            .barn_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.barn_name);
        validate_name(&barn_name).map_err(|msg| AppError::validation("barn_name", msg))?;
        let address = input.address.unwrap_or(existing.address);
        let image_url = input.image_url.or(existing.image_url);

        self.ensure_unique_name(&barn_name, Some(barn_id)).await?;

        let barn = sqlx::query_as::<_, Barn>(&format!(
            r#"
            UPDATE barns
            SET barn_name = $1, address = $2, image_url = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {BARN_COLUMNS}
            "#
        ))
        .bind(&barn_name)
        .bind(&address)
        .bind(&image_url)
        .bind(barn_id)
        .fetch_one(&self.db)
        .await?;

        Ok(barn)
    }

    /// Soft delete a barn. Barns still housing an active circle are kept.
    pub async fn delete_barn(&self, barn_id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM livestock_circles
                WHERE barn_id = $1 AND is_active = TRUE AND status IN ('pending', 'growing')
            )
            "#,
        )
        .bind(barn_id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::validation(
                "barn_id",
                "Barn still houses an active livestock circle",
            ));
        }

        let result = sqlx::query(
            "UPDATE barns SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(barn_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Barn".to_string()));
        }

        tracing::info!(%barn_id, "Barn deleted");

        Ok(())
    }

    async fn ensure_unique_name(&self, barn_name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM barns
                WHERE LOWER(barn_name) = LOWER($1) AND is_active = TRUE
                  AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(barn_name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("barn_name".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_validation() {
        let valid = CreateBarnInput {
            barn_name: "North Barn".to_string(),
            address: "Lot 4, Hill Road".to_string(),
            image_url: Some("https://cdn.example.com/barn.png".to_string()),
        };
        assert!(valid.validate().is_ok());

        let missing_address = CreateBarnInput {
            barn_name: "North Barn".to_string(),
            address: String::new(),
            image_url: None,
        };
        assert!(missing_address.validate().is_err());

        let bad_url = CreateBarnInput {
            barn_name: "North Barn".to_string(),
            address: "Lot 4".to_string(),
            image_url: Some("not a url".to_string()),
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_update_input_allows_partial() {
        let input = UpdateBarnInput {
            barn_name: None,
            address: Some("New address".to_string()),
            image_url: None,
        };
        assert!(input.validate().is_ok());
    }
}
