//! Repository for use case database operations

use sqlx::PgPool;

use crate::db::DbError;
use crate::db::models::{Pagination, UseCaseRow};
use crate::model::{UseCase, UseCaseCreate};

#[derive(Clone)]
pub struct UseCaseRepository {
    pool: PgPool,
}

impl UseCaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, use_case: &UseCaseCreate) -> Result<UseCase, DbError> {
        let row: UseCaseRow = sqlx::query_as(
            r#"
            INSERT INTO use_cases (model_id, use_case, description, mentioned_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(use_case.model_id)
        .bind(&use_case.use_case)
        .bind(&use_case.description)
        .bind(&use_case.mentioned_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, model_id = row.model_id, "Inserted use case");
        Ok(row.into_domain())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<UseCase>, DbError> {
        let row: Option<UseCaseRow> = sqlx::query_as("SELECT * FROM use_cases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UseCaseRow::into_domain))
    }

    pub async fn list(
        &self,
        model_id: Option<i64>,
        page: Pagination,
    ) -> Result<Vec<UseCase>, DbError> {
        let rows: Vec<UseCaseRow> = sqlx::query_as(
            r#"
            SELECT * FROM use_cases
            WHERE ($1::BIGINT IS NULL OR model_id = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(model_id)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UseCaseRow::into_domain).collect())
    }

    pub async fn update(&self, use_case: &UseCase) -> Result<UseCase, DbError> {
        let row: UseCaseRow = sqlx::query_as(
            r#"
            UPDATE use_cases SET
                use_case = $2,
                description = $3,
                mentioned_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(use_case.id)
        .bind(&use_case.use_case)
        .bind(&use_case.description)
        .bind(&use_case.mentioned_by)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("use case {}", use_case.id)))?;

        Ok(row.into_domain())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM use_cases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
