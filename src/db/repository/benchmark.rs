//! Repository for benchmark database operations

use sqlx::PgPool;

use crate::db::DbError;
use crate::db::models::{BenchmarkRow, Pagination};
use crate::model::{Benchmark, BenchmarkCreate};

#[derive(Clone)]
pub struct BenchmarkRepository {
    pool: PgPool,
}

impl BenchmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, benchmark: &BenchmarkCreate) -> Result<Benchmark, DbError> {
        let row: BenchmarkRow = sqlx::query_as(
            r#"
            INSERT INTO benchmarks (name, category, description, url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&benchmark.name)
        .bind(&benchmark.category)
        .bind(&benchmark.description)
        .bind(&benchmark.url)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, name = %row.name, "Inserted benchmark");
        Ok(row.into_domain())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Benchmark>, DbError> {
        let row: Option<BenchmarkRow> = sqlx::query_as("SELECT * FROM benchmarks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BenchmarkRow::into_domain))
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbError> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM benchmarks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result.is_some())
    }

    /// List benchmarks, optionally restricted to one category
    pub async fn list(
        &self,
        category: Option<&str>,
        page: Pagination,
    ) -> Result<Vec<Benchmark>, DbError> {
        let rows: Vec<BenchmarkRow> = sqlx::query_as(
            r#"
            SELECT * FROM benchmarks
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BenchmarkRow::into_domain).collect())
    }

    /// Distinct non-null categories in alphabetical order
    pub async fn categories(&self) -> Result<Vec<String>, DbError> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM benchmarks WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> Result<bool, DbError> {
        let result: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM benchmarks WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.is_some())
    }

    pub async fn update(&self, benchmark: &Benchmark) -> Result<Benchmark, DbError> {
        let row: BenchmarkRow = sqlx::query_as(
            r#"
            UPDATE benchmarks SET
                name = $2,
                category = $3,
                description = $4,
                url = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(benchmark.id)
        .bind(&benchmark.name)
        .bind(&benchmark.category)
        .bind(&benchmark.description)
        .bind(&benchmark.url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("benchmark {}", benchmark.id)))?;

        Ok(row.into_domain())
    }

    /// Delete a benchmark and its results
    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM benchmarks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
