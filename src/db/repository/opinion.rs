//! Repository for opinion database operations

use sqlx::PgPool;

use crate::db::DbError;
use crate::db::models::{OpinionRow, Pagination, contains_pattern};
use crate::model::{Opinion, OpinionCreate};

/// Optional filters for listing opinions
#[derive(Debug, Clone, Default)]
pub struct OpinionFilter {
    pub model_id: Option<i64>,
    pub sentiment: Option<String>,
}

#[derive(Clone)]
pub struct OpinionRepository {
    pool: PgPool,
}

impl OpinionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, opinion: &OpinionCreate) -> Result<Opinion, DbError> {
        let row: OpinionRow = sqlx::query_as(
            r#"
            INSERT INTO opinions (
                model_id, content, sentiment, source, author, date_published, tags
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(opinion.model_id)
        .bind(&opinion.content)
        .bind(&opinion.sentiment)
        .bind(&opinion.source)
        .bind(&opinion.author)
        .bind(opinion.date_published)
        .bind(&opinion.tags)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, model_id = row.model_id, "Inserted opinion");
        Ok(row.into_domain())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Opinion>, DbError> {
        let row: Option<OpinionRow> = sqlx::query_as("SELECT * FROM opinions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OpinionRow::into_domain))
    }

    /// List opinions, most recently published first
    pub async fn list(
        &self,
        filter: &OpinionFilter,
        page: Pagination,
    ) -> Result<Vec<Opinion>, DbError> {
        let rows: Vec<OpinionRow> = sqlx::query_as(
            r#"
            SELECT * FROM opinions
            WHERE ($1::BIGINT IS NULL OR model_id = $1)
              AND ($2::TEXT IS NULL OR LOWER(sentiment) = LOWER($2))
            ORDER BY date_published DESC NULLS LAST, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.model_id)
        .bind(&filter.sentiment)
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OpinionRow::into_domain).collect())
    }

    /// Case-insensitive substring search over opinion content
    pub async fn search_content(
        &self,
        query: &str,
        page: Pagination,
    ) -> Result<Vec<Opinion>, DbError> {
        let rows: Vec<OpinionRow> = sqlx::query_as(
            r#"
            SELECT * FROM opinions
            WHERE content ILIKE $1
            ORDER BY date_published DESC NULLS LAST, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(contains_pattern(query))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OpinionRow::into_domain).collect())
    }

    pub async fn update(&self, opinion: &Opinion) -> Result<Opinion, DbError> {
        let row: OpinionRow = sqlx::query_as(
            r#"
            UPDATE opinions SET
                content = $2,
                sentiment = $3,
                source = $4,
                author = $5,
                date_published = $6,
                tags = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(opinion.id)
        .bind(&opinion.content)
        .bind(&opinion.sentiment)
        .bind(&opinion.source)
        .bind(&opinion.author)
        .bind(opinion.date_published)
        .bind(&opinion.tags)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("opinion {}", opinion.id)))?;

        Ok(row.into_domain())
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM opinions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
