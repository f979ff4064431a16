//! Catalogue entities: models, benchmarks, benchmark results, opinions and use cases
//!
//! Each entity comes with a `*Create` shape for inserts and a `*Update` shape
//! for partial updates. Nullable fields in update shapes use `Option<Option<T>>`:
//! an absent key leaves the column untouched, an explicit `null` clears it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Distinguish an explicit `null` from a missing key in partial updates
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

// ============================================================================
// Models
// ============================================================================

/// A persisted AI model entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelRecord {
    pub id: i64,
    /// Unique technical identifier (e.g. "gpt-4")
    pub name: String,
    pub display_name: String,
    pub organization: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub license: Option<String>,
    /// Free-form metadata (pricing, context window, capabilities, ...)
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request to create a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelCreate {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Partial update of a model
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ModelUpdate {
    pub name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub organization: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub license: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub metadata: Option<Option<serde_json::Value>>,
}

impl ModelUpdate {
    /// Apply the provided fields onto an existing record
    pub fn apply_to(self, record: &mut ModelRecord) {
        merge(&mut record.name, self.name);
        merge(&mut record.display_name, self.display_name);
        merge(&mut record.organization, self.organization);
        merge(&mut record.release_date, self.release_date);
        merge(&mut record.description, self.description);
        merge(&mut record.license, self.license);
        merge(&mut record.metadata, self.metadata);
    }
}

// ============================================================================
// Benchmarks
// ============================================================================

/// An evaluation benchmark (e.g. MMLU, HumanEval)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Benchmark {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BenchmarkCreate {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BenchmarkUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub url: Option<Option<String>>,
}

impl BenchmarkUpdate {
    pub fn apply_to(self, record: &mut Benchmark) {
        merge(&mut record.name, self.name);
        merge(&mut record.category, self.category);
        merge(&mut record.description, self.description);
        merge(&mut record.url, self.url);
    }
}

// ============================================================================
// Benchmark results
// ============================================================================

/// A model's score on a benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BenchmarkResult {
    pub id: i64,
    pub model_id: i64,
    pub benchmark_id: i64,
    pub score: f64,
    pub date_tested: Option<NaiveDate>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BenchmarkResultCreate {
    pub model_id: i64,
    pub benchmark_id: i64,
    pub score: f64,
    #[serde(default)]
    pub date_tested: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Partial update of a benchmark result; model and benchmark are fixed
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BenchmarkResultUpdate {
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_tested: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub source: Option<Option<String>>,
}

impl BenchmarkResultUpdate {
    pub fn apply_to(self, record: &mut BenchmarkResult) {
        merge(&mut record.score, self.score);
        merge(&mut record.date_tested, self.date_tested);
        merge(&mut record.source, self.source);
    }
}

// ============================================================================
// Opinions
// ============================================================================

/// Public opinion about a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Opinion {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpinionCreate {
    pub model_id: i64,
    pub content: String,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date_published: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OpinionUpdate {
    pub content: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sentiment: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub source: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub date_published: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub tags: Option<Option<Vec<String>>>,
}

impl OpinionUpdate {
    pub fn apply_to(self, record: &mut Opinion) {
        merge(&mut record.content, self.content);
        merge(&mut record.sentiment, self.sentiment);
        merge(&mut record.source, self.source);
        merge(&mut record.author, self.author);
        merge(&mut record.date_published, self.date_published);
        merge(&mut record.tags, self.tags);
    }
}

// ============================================================================
// Use cases
// ============================================================================

/// A use case mentioned for a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UseCase {
    pub id: i64,
    pub model_id: i64,
    pub use_case: String,
    pub description: Option<String>,
    pub mentioned_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UseCaseCreate {
    pub model_id: i64,
    pub use_case: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mentioned_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UseCaseUpdate {
    pub use_case: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub mentioned_by: Option<Option<String>>,
}

impl UseCaseUpdate {
    pub fn apply_to(self, record: &mut UseCase) {
        merge(&mut record.use_case, self.use_case);
        merge(&mut record.description, self.description);
        merge(&mut record.mentioned_by, self.mentioned_by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> ModelRecord {
        ModelRecord {
            id: 1,
            name: "gpt-4".to_string(),
            display_name: "GPT-4".to_string(),
            organization: Some("OpenAI".to_string()),
            release_date: NaiveDate::from_ymd_opt(2023, 3, 14),
            description: Some("A large multimodal model".to_string()),
            license: Some("Proprietary".to_string()),
            metadata: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_update_missing_keys_leave_fields_untouched() {
        let update: ModelUpdate = serde_json::from_str(r#"{"display_name":"GPT 4"}"#).unwrap();
        let mut record = sample_model();
        update.apply_to(&mut record);

        assert_eq!(record.display_name, "GPT 4");
        assert_eq!(record.organization.as_deref(), Some("OpenAI"));
        assert_eq!(record.license.as_deref(), Some("Proprietary"));
    }

    #[test]
    fn test_update_explicit_null_clears_field() {
        let update: ModelUpdate =
            serde_json::from_str(r#"{"license":null,"release_date":"2023-03-15"}"#).unwrap();
        assert_eq!(update.license, Some(None));

        let mut record = sample_model();
        update.apply_to(&mut record);

        assert!(record.license.is_none());
        assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2023, 3, 15));
        assert_eq!(record.name, "gpt-4");
    }

    #[test]
    fn test_benchmark_result_update_keeps_foreign_keys() {
        let mut result = BenchmarkResult {
            id: 7,
            model_id: 1,
            benchmark_id: 2,
            score: 86.4,
            date_tested: None,
            source: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let update: BenchmarkResultUpdate =
            serde_json::from_str(r#"{"score":88.0,"source":"paper"}"#).unwrap();
        update.apply_to(&mut result);

        assert_eq!(result.score, 88.0);
        assert_eq!(result.source.as_deref(), Some("paper"));
        assert_eq!(result.model_id, 1);
        assert_eq!(result.benchmark_id, 2);
    }

    #[test]
    fn test_opinion_create_defaults_optional_fields() {
        let create: OpinionCreate =
            serde_json::from_str(r#"{"model_id":3,"content":"Great at coding"}"#).unwrap();
        assert_eq!(create.model_id, 3);
        assert!(create.tags.is_none());
        assert!(create.sentiment.is_none());
    }
}
