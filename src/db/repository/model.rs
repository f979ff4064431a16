//! Repository for model database operations

use sqlx::PgPool;

use crate::db::DbError;
use crate::db::models::{ModelRow, Pagination, contains_pattern};
use crate::model::{ModelCreate, ModelRecord};

/// Repository for model operations
#[derive(Clone)]
pub struct ModelRepository {
    pool: PgPool,
}

impl ModelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new model. A duplicate name surfaces as [`DbError::UniqueViolation`].
    pub async fn insert(&self, model: &ModelCreate) -> Result<ModelRecord, DbError> {
        let row: ModelRow = sqlx::query_as(
            r#"
            INSERT INTO models (
                name, display_name, organization, release_date,
                description, license, metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&model.name)
        .bind(&model.display_name)
        .bind(&model.organization)
        .bind(model.release_date)
        .bind(&model.description)
        .bind(&model.license)
        .bind(&model.metadata)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, name = %row.name, "Inserted model");
        Ok(row.into_domain())
    }

    /// Get a model by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ModelRecord>, DbError> {
        let row: Option<ModelRow> = sqlx::query_as("SELECT * FROM models WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ModelRow::into_domain))
    }

    /// Get a model by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ModelRecord>, DbError> {
        let row: Option<ModelRow> = sqlx::query_as("SELECT * FROM models WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ModelRow::into_domain))
    }

    /// Check if a model exists by ID
    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM models WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result.is_some())
    }

    /// List models ordered by ID
    pub async fn list(&self, page: Pagination) -> Result<Vec<ModelRecord>, DbError> {
        let rows: Vec<ModelRow> =
            sqlx::query_as("SELECT * FROM models ORDER BY id LIMIT $1 OFFSET $2")
                .bind(page.limit)
                .bind(page.skip)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(ModelRow::into_domain).collect())
    }

    /// Case-insensitive substring search on name, display name and organization
    pub async fn search(&self, query: &str, page: Pagination) -> Result<Vec<ModelRecord>, DbError> {
        let rows: Vec<ModelRow> = sqlx::query_as(
            r#"
            SELECT * FROM models
            WHERE name ILIKE $1 OR display_name ILIKE $1 OR organization ILIKE $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(contains_pattern(query))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModelRow::into_domain).collect())
    }

    /// Models from one organization, newest release first
    pub async fn list_by_organization(
        &self,
        organization: &str,
        page: Pagination,
    ) -> Result<Vec<ModelRecord>, DbError> {
        let rows: Vec<ModelRow> = sqlx::query_as(
            r#"
            SELECT * FROM models
            WHERE organization = $1
            ORDER BY release_date DESC NULLS LAST, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(organization)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ModelRow::into_domain).collect())
    }

    /// Whether another model already uses `name`
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> Result<bool, DbError> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM models WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)")
                .bind(name)
                .bind(exclude_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(result.is_some())
    }

    /// Persist every writable field of `model` and refresh `updated_at`
    pub async fn update(&self, model: &ModelRecord) -> Result<ModelRecord, DbError> {
        let row: ModelRow = sqlx::query_as(
            r#"
            UPDATE models SET
                name = $2,
                display_name = $3,
                organization = $4,
                release_date = $5,
                description = $6,
                license = $7,
                metadata = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(model.id)
        .bind(&model.name)
        .bind(&model.display_name)
        .bind(&model.organization)
        .bind(model.release_date)
        .bind(&model.description)
        .bind(&model.license)
        .bind(&model.metadata)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("model {}", model.id)))?;

        tracing::debug!(id = row.id, "Updated model");
        Ok(row.into_domain())
    }

    /// Delete a model and, by cascade, its results, opinions and use cases.
    /// Returns true if the model was deleted, false if it didn't exist
    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM models WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(id = id, "Deleted model");
        }

        Ok(deleted)
    }
}
