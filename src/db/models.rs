//! Database row types for catalogue entities

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::model::{Benchmark, BenchmarkResult, ModelRecord, Opinion, UseCase};

/// Database representation of a model
#[derive(Debug, Clone, FromRow)]
pub struct ModelRow {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub organization: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ModelRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> ModelRecord {
        ModelRecord {
            id: self.id,
            name: self.name,
            display_name: self.display_name,
            organization: self.organization,
            release_date: self.release_date,
            description: self.description,
            license: self.license,
            metadata: self.metadata.filter(|m| !m.is_null()),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BenchmarkRow {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BenchmarkRow {
    pub fn into_domain(self) -> Benchmark {
        Benchmark {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            url: self.url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BenchmarkResultRow {
    pub id: i64,
    pub model_id: i64,
    pub benchmark_id: i64,
    pub score: f64,
    pub date_tested: Option<NaiveDate>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BenchmarkResultRow {
    pub fn into_domain(self) -> BenchmarkResult {
        BenchmarkResult {
            id: self.id,
            model_id: self.model_id,
            benchmark_id: self.benchmark_id,
            score: self.score,
            date_tested: self.date_tested,
            source: self.source,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OpinionRow {
    pub id: i64,
    pub model_id: i64,
    pub content: String,
    pub sentiment: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub date_published: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OpinionRow {
    pub fn into_domain(self) -> Opinion {
        Opinion {
            id: self.id,
            model_id: self.model_id,
            content: self.content,
            sentiment: self.sentiment,
            source: self.source,
            author: self.author,
            date_published: self.date_published,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UseCaseRow {
    pub id: i64,
    pub model_id: i64,
    pub use_case: String,
    pub description: Option<String>,
    pub mentioned_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UseCaseRow {
    pub fn into_domain(self) -> UseCase {
        UseCase {
            id: self.id,
            model_id: self.model_id,
            use_case: self.use_case,
            description: self.description,
            mentioned_by: self.mentioned_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Offset pagination shared by every list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.max(1),
        }
    }
}

/// Build an `ILIKE` substring pattern, escaping the LIKE wildcards in `term`
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_term() {
        assert_eq!(contains_pattern("openai"), "%openai%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("100%_ok"), "%100\\%\\_ok%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_pagination_clamps_negative_values() {
        assert_eq!(Pagination::new(-5, 0), Pagination { skip: 0, limit: 1 });
        assert_eq!(Pagination::new(20, 50), Pagination { skip: 20, limit: 50 });
    }

    #[test]
    fn test_json_null_metadata_becomes_none() {
        let row = ModelRow {
            id: 1,
            name: "llama-2".to_string(),
            display_name: "Llama 2".to_string(),
            organization: Some("Meta".to_string()),
            release_date: None,
            description: None,
            license: None,
            metadata: Some(serde_json::Value::Null),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(row.into_domain().metadata.is_none());
    }
}
