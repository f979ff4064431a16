//! Repository for benchmark result database operations

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::db::DbError;
use crate::db::models::{BenchmarkResultRow, Pagination};
use crate::model::{BenchmarkResult, BenchmarkResultCreate};

/// Optional filters for listing results
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkResultFilter {
    pub model_id: Option<i64>,
    pub benchmark_id: Option<i64>,
}

#[derive(Clone)]
pub struct BenchmarkResultRepository {
    pool: PgPool,
}

impl BenchmarkResultRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a result. A second result for the same model, benchmark and
    /// date surfaces as [`DbError::UniqueViolation`].
    pub async fn insert(&self, result: &BenchmarkResultCreate) -> Result<BenchmarkResult, DbError> {
        let row: BenchmarkResultRow = sqlx::query_as(
            r#"
            INSERT INTO benchmark_results (model_id, benchmark_id, score, date_tested, source)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(result.model_id)
        .bind(result.benchmark_id)
        .bind(result.score)
        .bind(result.date_tested)
        .bind(&result.source)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            id = row.id,
            model_id = row.model_id,
            benchmark_id = row.benchmark_id,
            "Inserted benchmark result"
        );
        Ok(row.into_domain())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<BenchmarkResult>, DbError> {
        let row: Option<BenchmarkResultRow> =
            sqlx::query_as("SELECT * FROM benchmark_results WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(BenchmarkResultRow::into_domain))
    }

    /// Whether a result exists for this model, benchmark and test date.
    /// A missing date only matches other missing dates.
    pub async fn result_exists(
        &self,
        model_id: i64,
        benchmark_id: i64,
        date_tested: Option<NaiveDate>,
    ) -> Result<bool, DbError> {
        let result: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM benchmark_results
            WHERE model_id = $1 AND benchmark_id = $2
              AND date_tested IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(model_id)
        .bind(benchmark_id)
        .bind(date_tested)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.is_some())
    }

    /// List results. Listing by benchmark alone ranks by score, highest first.
    pub async fn list(
        &self,
        filter: BenchmarkResultFilter,
        page: Pagination,
    ) -> Result<Vec<BenchmarkResult>, DbError> {
        let order_by = if filter.benchmark_id.is_some() && filter.model_id.is_none() {
            "score DESC, id"
        } else {
            "id"
        };

        let query = format!(
            r#"
            SELECT * FROM benchmark_results
            WHERE ($1::BIGINT IS NULL OR model_id = $1)
              AND ($2::BIGINT IS NULL OR benchmark_id = $2)
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            order_by
        );

        let rows: Vec<BenchmarkResultRow> = sqlx::query_as(&query)
            .bind(filter.model_id)
            .bind(filter.benchmark_id)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(BenchmarkResultRow::into_domain).collect())
    }

    /// Persist score, date and source; model and benchmark never change
    pub async fn update(&self, result: &BenchmarkResult) -> Result<BenchmarkResult, DbError> {
        let row: BenchmarkResultRow = sqlx::query_as(
            r#"
            UPDATE benchmark_results SET
                score = $2,
                date_tested = $3,
                source = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(result.id)
        .bind(result.score)
        .bind(result.date_tested)
        .bind(&result.source)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("benchmark result {}", result.id)))?;

        Ok(row.into_domain())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM benchmark_results WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
