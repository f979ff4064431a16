//! Request validation performed before any service call
//!
//! Problems are collected rather than reported one at a time, then joined
//! into a single 400 response.

use url::Url;

use crate::api::error::ApiError;
use crate::db::models::Pagination;
use crate::model::{
    BenchmarkCreate, BenchmarkResultCreate, BenchmarkResultUpdate, BenchmarkUpdate, ModelCreate,
    ModelUpdate, OpinionCreate, OpinionUpdate, UseCaseCreate, UseCaseUpdate,
};

const NAME_MAX: usize = 255;
const CATEGORY_MAX: usize = 100;
const URL_MAX: usize = 500;
const SENTIMENT_MAX: usize = 50;

/// Minimum length of a search term
pub const MIN_SEARCH_LEN: usize = 2;

/// Collected validation problems for one request
#[derive(Debug, Default)]
pub struct RequestValidation {
    errors: Vec<String>,
}

impl RequestValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    /// Required text: non-blank and at most `max` characters
    pub fn required(&mut self, field: &str, value: &str, max: Option<usize>) -> &mut Self {
        if value.trim().is_empty() {
            self.add_error(format!("{} must not be empty", field));
        } else if let Some(max) = max {
            self.max_len(field, Some(value), max);
        }
        self
    }

    /// Optional text: at most `max` characters when present
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value
            && v.chars().count() > max
        {
            self.add_error(format!("{} must be at most {} characters", field, max));
        }
        self
    }

    /// Optional absolute URL of at most `max` characters
    pub fn url(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            if let Err(e) = Url::parse(v) {
                self.add_error(format!("{} is not a valid URL: {}", field, e));
            }
            self.max_len(field, Some(v), max);
        }
        self
    }

    pub fn finite(&mut self, field: &str, value: Option<f64>) -> &mut Self {
        if let Some(v) = value
            && !v.is_finite()
        {
            self.add_error(format!("{} must be a finite number", field));
        }
        self
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(self.errors.join("; ")))
        }
    }
}

/// Validate `skip`/`limit` query parameters against an inclusive limit range
pub fn pagination(
    skip: Option<i64>,
    limit: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> Result<Pagination, ApiError> {
    let skip = skip.unwrap_or(0);
    let limit = limit.unwrap_or(default_limit);

    let mut v = RequestValidation::new();
    if skip < 0 {
        v.add_error("skip must be greater than or equal to 0".to_string());
    }
    if !(1..=max_limit).contains(&limit) {
        v.add_error(format!("limit must be between 1 and {}", max_limit));
    }
    v.into_result()?;

    Ok(Pagination::new(skip, limit))
}

/// Search terms must carry at least [`MIN_SEARCH_LEN`] non-blank characters
pub fn search_term(q: &str) -> Result<&str, ApiError> {
    let term = q.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
        return Err(ApiError::BadRequest(format!(
            "q must be at least {} characters",
            MIN_SEARCH_LEN
        )));
    }
    Ok(term)
}

pub fn model_create(m: &ModelCreate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.required("name", &m.name, Some(NAME_MAX))
        .required("display_name", &m.display_name, Some(NAME_MAX))
        .max_len("organization", m.organization.as_deref(), NAME_MAX)
        .max_len("license", m.license.as_deref(), NAME_MAX);
    v.into_result()
}

pub fn model_update(m: &ModelUpdate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    if let Some(name) = &m.name {
        v.required("name", name, Some(NAME_MAX));
    }
    if let Some(display_name) = &m.display_name {
        v.required("display_name", display_name, Some(NAME_MAX));
    }
    v.max_len("organization", m.organization.clone().flatten().as_deref(), NAME_MAX)
        .max_len("license", m.license.clone().flatten().as_deref(), NAME_MAX);
    v.into_result()
}

pub fn benchmark_create(b: &BenchmarkCreate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.required("name", &b.name, Some(NAME_MAX))
        .max_len("category", b.category.as_deref(), CATEGORY_MAX)
        .url("url", b.url.as_deref(), URL_MAX);
    v.into_result()
}

pub fn benchmark_update(b: &BenchmarkUpdate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    if let Some(name) = &b.name {
        v.required("name", name, Some(NAME_MAX));
    }
    v.max_len("category", b.category.clone().flatten().as_deref(), CATEGORY_MAX)
        .url("url", b.url.clone().flatten().as_deref(), URL_MAX);
    v.into_result()
}

pub fn benchmark_result_create(r: &BenchmarkResultCreate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.finite("score", Some(r.score))
        .max_len("source", r.source.as_deref(), NAME_MAX);
    v.into_result()
}

pub fn benchmark_result_update(r: &BenchmarkResultUpdate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.finite("score", r.score)
        .max_len("source", r.source.clone().flatten().as_deref(), NAME_MAX);
    v.into_result()
}

pub fn opinion_create(o: &OpinionCreate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.required("content", &o.content, None)
        .max_len("sentiment", o.sentiment.as_deref(), SENTIMENT_MAX)
        .max_len("author", o.author.as_deref(), NAME_MAX);
    v.into_result()
}

pub fn opinion_update(o: &OpinionUpdate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    if let Some(content) = &o.content {
        v.required("content", content, None);
    }
    v.max_len("sentiment", o.sentiment.clone().flatten().as_deref(), SENTIMENT_MAX)
        .max_len("author", o.author.clone().flatten().as_deref(), NAME_MAX);
    v.into_result()
}

pub fn use_case_create(u: &UseCaseCreate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    v.required("use_case", &u.use_case, Some(NAME_MAX))
        .max_len("mentioned_by", u.mentioned_by.as_deref(), NAME_MAX);
    v.into_result()
}

pub fn use_case_update(u: &UseCaseUpdate) -> Result<(), ApiError> {
    let mut v = RequestValidation::new();
    if let Some(use_case) = &u.use_case {
        v.required("use_case", use_case, Some(NAME_MAX));
    }
    v.max_len("mentioned_by", u.mentioned_by.clone().flatten().as_deref(), NAME_MAX);
    v.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request_message(result: Result<(), ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(msg)) => msg,
            other => panic!("expected bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_pagination_defaults_and_bounds() {
        assert_eq!(
            pagination(None, None, 10, 1000).unwrap(),
            Pagination { skip: 0, limit: 10 }
        );
        assert!(pagination(Some(-1), None, 10, 1000).is_err());
        assert!(pagination(None, Some(0), 10, 1000).is_err());
        assert!(pagination(None, Some(1001), 10, 1000).is_err());
        assert!(pagination(None, Some(1000), 10, 1000).is_ok());
    }

    #[test]
    fn test_search_term_minimum_length() {
        assert!(search_term("a").is_err());
        assert!(search_term("  a  ").is_err());
        assert_eq!(search_term(" gp ").unwrap(), "gp");
    }

    #[test]
    fn test_errors_are_joined() {
        let create = ModelCreate {
            name: " ".to_string(),
            display_name: "x".repeat(256),
            organization: None,
            release_date: None,
            description: None,
            license: None,
            metadata: None,
        };
        let msg = bad_request_message(model_create(&create));
        assert_eq!(
            msg,
            "name must not be empty; display_name must be at most 255 characters"
        );
    }

    #[test]
    fn test_benchmark_url_must_parse() {
        let create = BenchmarkCreate {
            name: "MMLU".to_string(),
            category: Some("Knowledge".to_string()),
            description: None,
            url: Some("not a url".to_string()),
        };
        let msg = bad_request_message(benchmark_create(&create));
        assert!(msg.starts_with("url is not a valid URL"));

        let ok = BenchmarkCreate {
            url: Some("https://github.com/hendrycks/test".to_string()),
            ..create
        };
        assert!(benchmark_create(&ok).is_ok());
    }

    #[test]
    fn test_update_null_passes_and_blank_name_fails() {
        let update: BenchmarkUpdate = serde_json::from_str(r#"{"url":null}"#).unwrap();
        assert!(benchmark_update(&update).is_ok());

        let update: ModelUpdate = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(model_update(&update).is_err());
    }

    #[test]
    fn test_opinion_content_required() {
        let create: OpinionCreate =
            serde_json::from_str(r#"{"model_id":1,"content":"   "}"#).unwrap();
        assert!(opinion_create(&create).is_err());
    }
}
