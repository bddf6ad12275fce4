//! Breed management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{validate_name, ListQuery, PaginatedResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BreedService {
    db: PgPool,
}

/// Breed information
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Breed {
    pub id: Uuid,
    pub breed_name: String,
    pub breed_category: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBreedInput {
    #[validate(length(min = 1, max = 100, message = "Breed name must be 1-100 characters"))]
    pub breed_name: String,
    #[validate(length(max = 100, message = "Breed category must be at most 100 characters"))]
    pub breed_category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBreedInput {
    #[validate(length(min = 1, max = 100, message = "Breed name must be 1-100 characters"))]
    pub breed_name: Option<String>,
    #[validate(length(max = 100, message = "Breed category must be at most 100 characters"))]
    pub breed_category: Option<String>,
    pub description: Option<String>,
}

const BREED_COLUMNS: &str =
    "id, breed_name, breed_category, description, is_active, created_at, updated_at";

impl BreedService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_breeds(&self, query: &ListQuery) -> AppResult<PaginatedResponse<Breed>> {
        let pattern = query.search_pattern();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM breeds WHERE is_active = TRUE AND breed_name ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let breeds = sqlx::query_as::<_, Breed>(&format!(
            r#"
            SELECT {BREED_COLUMNS}
            FROM breeds
            WHERE is_active = TRUE AND breed_name ILIKE $1
            ORDER BY breed_name
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse::new(breeds, query, total))
    }

    pub async fn get_breed(&self, breed_id: Uuid) -> AppResult<Breed> {
        sqlx::query_as::<_, Breed>(&format!(
            "SELECT {BREED_COLUMNS} FROM breeds WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(breed_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Breed".to_string()))
    }

    pub async fn create_breed(&self, input: CreateBreedInput) -> AppResult<Breed> {
        input.validate()?;
        let breed_name = input.breed_name.trim().to_string();
        validate_name(&breed_name).map_err(|msg| AppError::validation("breed_name", msg))?;

        self.ensure_unique_name(&breed_name, None).await?;

        let breed = sqlx::query_as::<_, Breed>(&format!(
            r#"
            INSERT INTO breeds (breed_name, breed_category, description)
            VALUES ($1, $2, $3)
            RETURNING {BREED_COLUMNS}
            "#
        ))
        .bind(&breed_name)
        .bind(&input.breed_category)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(breed_id = %breed.id, "Breed created: {}", breed.breed_name);

        Ok(breed)
    }

    pub async fn update_breed(&self, breed_id: Uuid, input: UpdateBreedInput) -> AppResult<Breed> {
        input.validate()?;
        let existing = self.get_breed(breed_id).await?;

        let breed_name = input
            .breed_name
            .map(|n| n.trim().to_string())
            .unwrap_or(existing.breed_name);
        validate_name(&breed_name).map_err(|msg| AppError::validation("breed_name", msg))?;
        let breed_category = input.breed_category.or(existing.breed_category);
        let description = input.description.or(existing.description);

        self.ensure_unique_name(&breed_name, Some(breed_id)).await?;

        let breed = sqlx::query_as::<_, Breed>(&format!(
            r#"
            UPDATE breeds
            SET breed_name = $1, breed_category = $2, description = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {BREED_COLUMNS}
            "#
        ))
        .bind(&breed_name)
        .bind(&breed_category)
        .bind(&description)
        .bind(breed_id)
        .fetch_one(&self.db)
        .await?;

        Ok(breed)
    }

    pub async fn delete_breed(&self, breed_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE breeds SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
        .bind(breed_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Breed".to_string()));
        }

        tracing::info!(%breed_id, "Breed deleted");

        Ok(())
    }

    async fn ensure_unique_name(&self, breed_name: &str, exclude_id: Option<Uuid>) -> AppResult<()> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM breeds
                WHERE LOWER(breed_name) = LOWER($1) AND is_active = TRUE
                  AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(breed_name)
        .bind(exclude_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("breed_name".to_string()));
        }

        Ok(())
    }
}
