//! Catalogue service: business rules over the five catalogue repositories

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::models::Pagination;
use crate::db::repository::{BenchmarkResultFilter, OpinionFilter};
use crate::db::{
    BenchmarkRepository, BenchmarkResultRepository, DbError, ModelRepository, OpinionRepository,
    UseCaseRepository,
};
use crate::model::{
    Benchmark, BenchmarkCreate, BenchmarkResult, BenchmarkResultCreate, BenchmarkResultUpdate,
    BenchmarkUpdate, ModelCreate, ModelRecord, ModelUpdate, Opinion, OpinionCreate, OpinionUpdate,
    UseCase, UseCaseCreate, UseCaseUpdate,
};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogueError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Translate a unique-index violation into a conflict carrying `message`.
/// The index is the final arbiter when two writers race past the existence check.
fn conflict_on_unique(e: DbError, message: impl FnOnce() -> String) -> CatalogueError {
    match e {
        DbError::UniqueViolation(detail) => {
            tracing::debug!(detail = %detail, "Unique constraint rejected write");
            CatalogueError::Conflict(message())
        }
        other => CatalogueError::Database(other),
    }
}

fn model_not_found(id: i64) -> CatalogueError {
    CatalogueError::NotFound(format!("Model with ID {} not found", id))
}

fn benchmark_not_found(id: i64) -> CatalogueError {
    CatalogueError::NotFound(format!("Benchmark with ID {} not found", id))
}

/// Write access to the model table, as needed by the extraction endpoint
#[async_trait]
pub trait ModelCatalogue: Send + Sync {
    /// Insert a model; a name already in the catalogue is a [`CatalogueError::Conflict`]
    async fn create_model(&self, model: ModelCreate) -> Result<ModelRecord, CatalogueError>;
}

/// Service for catalogue reads and writes
pub struct CatalogueService {
    models: ModelRepository,
    benchmarks: BenchmarkRepository,
    results: BenchmarkResultRepository,
    opinions: OpinionRepository,
    use_cases: UseCaseRepository,
}

impl CatalogueService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            models: ModelRepository::new(pool.clone()),
            benchmarks: BenchmarkRepository::new(pool.clone()),
            results: BenchmarkResultRepository::new(pool.clone()),
            opinions: OpinionRepository::new(pool.clone()),
            use_cases: UseCaseRepository::new(pool),
        }
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    pub async fn get_model(&self, id: i64) -> Result<ModelRecord, CatalogueError> {
        self.models
            .find_by_id(id)
            .await?
            .ok_or_else(|| model_not_found(id))
    }

    pub async fn get_model_by_name(&self, name: &str) -> Result<ModelRecord, CatalogueError> {
        self.models
            .find_by_name(name)
            .await?
            .ok_or_else(|| CatalogueError::NotFound(format!("Model '{}' not found", name)))
    }

    pub async fn list_models(&self, page: Pagination) -> Result<Vec<ModelRecord>, CatalogueError> {
        Ok(self.models.list(page).await?)
    }

    pub async fn search_models(
        &self,
        query: &str,
        page: Pagination,
    ) -> Result<Vec<ModelRecord>, CatalogueError> {
        Ok(self.models.search(query, page).await?)
    }

    pub async fn list_models_by_organization(
        &self,
        organization: &str,
        page: Pagination,
    ) -> Result<Vec<ModelRecord>, CatalogueError> {
        Ok(self.models.list_by_organization(organization, page).await?)
    }

    /// Apply a partial update. Renaming onto another model's name is a conflict.
    pub async fn update_model(
        &self,
        id: i64,
        update: ModelUpdate,
    ) -> Result<ModelRecord, CatalogueError> {
        let mut record = self.get_model(id).await?;

        if let Some(name) = update.name.as_deref()
            && name != record.name
            && self.models.name_exists(name, Some(id)).await?
        {
            return Err(CatalogueError::Conflict(format!(
                "Model with name '{}' already exists",
                name
            )));
        }

        update.apply_to(&mut record);
        let name = record.name.clone();
        let updated = self.models.update(&record).await.map_err(|e| {
            conflict_on_unique(e, || format!("Model with name '{}' already exists", name))
        })?;

        tracing::info!(id = id, name = %updated.name, "Model updated");
        Ok(updated)
    }

    pub async fn delete_model(&self, id: i64) -> Result<(), CatalogueError> {
        if !self.models.delete(id).await? {
            return Err(model_not_found(id));
        }
        tracing::info!(id = id, "Model deleted");
        Ok(())
    }

    async fn ensure_model(&self, id: i64) -> Result<(), CatalogueError> {
        if self.models.exists(id).await? {
            Ok(())
        } else {
            Err(model_not_found(id))
        }
    }

    pub async fn model_benchmark_results(
        &self,
        model_id: i64,
        page: Pagination,
    ) -> Result<Vec<BenchmarkResult>, CatalogueError> {
        self.ensure_model(model_id).await?;
        let filter = BenchmarkResultFilter {
            model_id: Some(model_id),
            benchmark_id: None,
        };
        Ok(self.results.list(filter, page).await?)
    }

    pub async fn model_opinions(
        &self,
        model_id: i64,
        page: Pagination,
    ) -> Result<Vec<Opinion>, CatalogueError> {
        self.ensure_model(model_id).await?;
        let filter = OpinionFilter {
            model_id: Some(model_id),
            sentiment: None,
        };
        Ok(self.opinions.list(&filter, page).await?)
    }

    pub async fn model_use_cases(
        &self,
        model_id: i64,
        page: Pagination,
    ) -> Result<Vec<UseCase>, CatalogueError> {
        self.ensure_model(model_id).await?;
        Ok(self.use_cases.list(Some(model_id), page).await?)
    }

    // ------------------------------------------------------------------
    // Benchmarks
    // ------------------------------------------------------------------

    pub async fn create_benchmark(
        &self,
        benchmark: BenchmarkCreate,
    ) -> Result<Benchmark, CatalogueError> {
        if self.benchmarks.name_exists(&benchmark.name, None).await? {
            return Err(CatalogueError::Conflict(format!(
                "Benchmark '{}' already exists",
                benchmark.name
            )));
        }

        let created = self.benchmarks.insert(&benchmark).await.map_err(|e| {
            conflict_on_unique(e, || {
                format!("Benchmark '{}' already exists", benchmark.name)
            })
        })?;

        tracing::info!(id = created.id, name = %created.name, "Benchmark created");
        Ok(created)
    }

    pub async fn get_benchmark(&self, id: i64) -> Result<Benchmark, CatalogueError> {
        self.benchmarks
            .find_by_id(id)
            .await?
            .ok_or_else(|| benchmark_not_found(id))
    }

    pub async fn list_benchmarks(
        &self,
        category: Option<&str>,
        page: Pagination,
    ) -> Result<Vec<Benchmark>, CatalogueError> {
        Ok(self.benchmarks.list(category, page).await?)
    }

    pub async fn benchmark_categories(&self) -> Result<Vec<String>, CatalogueError> {
        Ok(self.benchmarks.categories().await?)
    }

    pub async fn update_benchmark(
        &self,
        id: i64,
        update: BenchmarkUpdate,
    ) -> Result<Benchmark, CatalogueError> {
        let mut record = self.get_benchmark(id).await?;

        if let Some(name) = update.name.as_deref()
            && name != record.name
            && self.benchmarks.name_exists(name, Some(id)).await?
        {
            return Err(CatalogueError::Conflict(format!(
                "Benchmark '{}' already exists",
                name
            )));
        }

        update.apply_to(&mut record);
        let name = record.name.clone();
        let updated = self
            .benchmarks
            .update(&record)
            .await
            .map_err(|e| conflict_on_unique(e, || format!("Benchmark '{}' already exists", name)))?;

        tracing::info!(id = id, "Benchmark updated");
        Ok(updated)
    }

    pub async fn delete_benchmark(&self, id: i64) -> Result<(), CatalogueError> {
        if !self.benchmarks.delete(id).await? {
            return Err(benchmark_not_found(id));
        }
        tracing::info!(id = id, "Benchmark deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Benchmark results
    // ------------------------------------------------------------------

    pub async fn create_benchmark_result(
        &self,
        result: BenchmarkResultCreate,
    ) -> Result<BenchmarkResult, CatalogueError> {
        self.ensure_model(result.model_id).await?;
        if !self.benchmarks.exists(result.benchmark_id).await? {
            return Err(benchmark_not_found(result.benchmark_id));
        }

        let duplicate_message = || {
            format!(
                "Result for model {} on benchmark {} already recorded for this date",
                result.model_id, result.benchmark_id
            )
        };

        if self
            .results
            .result_exists(result.model_id, result.benchmark_id, result.date_tested)
            .await?
        {
            return Err(CatalogueError::Conflict(duplicate_message()));
        }

        let created = self
            .results
            .insert(&result)
            .await
            .map_err(|e| conflict_on_unique(e, duplicate_message))?;

        tracing::info!(
            id = created.id,
            model_id = created.model_id,
            benchmark_id = created.benchmark_id,
            score = created.score,
            "Benchmark result created"
        );
        Ok(created)
    }

    pub async fn get_benchmark_result(&self, id: i64) -> Result<BenchmarkResult, CatalogueError> {
        self.results.find_by_id(id).await?.ok_or_else(|| {
            CatalogueError::NotFound(format!("Benchmark result with ID {} not found", id))
        })
    }

    pub async fn list_benchmark_results(
        &self,
        filter: BenchmarkResultFilter,
        page: Pagination,
    ) -> Result<Vec<BenchmarkResult>, CatalogueError> {
        Ok(self.results.list(filter, page).await?)
    }

    pub async fn update_benchmark_result(
        &self,
        id: i64,
        update: BenchmarkResultUpdate,
    ) -> Result<BenchmarkResult, CatalogueError> {
        let mut record = self.get_benchmark_result(id).await?;
        update.apply_to(&mut record);

        let (model_id, benchmark_id) = (record.model_id, record.benchmark_id);
        let updated = self.results.update(&record).await.map_err(|e| {
            conflict_on_unique(e, || {
                format!(
                    "Result for model {} on benchmark {} already recorded for this date",
                    model_id, benchmark_id
                )
            })
        })?;

        tracing::info!(id = id, "Benchmark result updated");
        Ok(updated)
    }

    pub async fn delete_benchmark_result(&self, id: i64) -> Result<(), CatalogueError> {
        if !self.results.delete(id).await? {
            return Err(CatalogueError::NotFound(format!(
                "Benchmark result with ID {} not found",
                id
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Opinions
    // ------------------------------------------------------------------

    pub async fn create_opinion(&self, opinion: OpinionCreate) -> Result<Opinion, CatalogueError> {
        self.ensure_model(opinion.model_id).await?;
        let created = self.opinions.insert(&opinion).await?;
        tracing::info!(id = created.id, model_id = created.model_id, "Opinion created");
        Ok(created)
    }

    pub async fn get_opinion(&self, id: i64) -> Result<Opinion, CatalogueError> {
        self.opinions
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogueError::NotFound(format!("Opinion with ID {} not found", id)))
    }

    pub async fn list_opinions(
        &self,
        filter: &OpinionFilter,
        page: Pagination,
    ) -> Result<Vec<Opinion>, CatalogueError> {
        Ok(self.opinions.list(filter, page).await?)
    }

    pub async fn search_opinions(
        &self,
        query: &str,
        page: Pagination,
    ) -> Result<Vec<Opinion>, CatalogueError> {
        Ok(self.opinions.search_content(query, page).await?)
    }

    pub async fn update_opinion(
        &self,
        id: i64,
        update: OpinionUpdate,
    ) -> Result<Opinion, CatalogueError> {
        let mut record = self.get_opinion(id).await?;
        update.apply_to(&mut record);
        Ok(self.opinions.update(&record).await?)
    }

    pub async fn delete_opinion(&self, id: i64) -> Result<(), CatalogueError> {
        if !self.opinions.delete(id).await? {
            return Err(CatalogueError::NotFound(format!(
                "Opinion with ID {} not found",
                id
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Use cases
    // ------------------------------------------------------------------

    pub async fn create_use_case(&self, use_case: UseCaseCreate) -> Result<UseCase, CatalogueError> {
        self.ensure_model(use_case.model_id).await?;
        let created = self.use_cases.insert(&use_case).await?;
        tracing::info!(id = created.id, model_id = created.model_id, "Use case created");
        Ok(created)
    }

    pub async fn get_use_case(&self, id: i64) -> Result<UseCase, CatalogueError> {
        self.use_cases
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogueError::NotFound(format!("Use case with ID {} not found", id)))
    }

    pub async fn list_use_cases(
        &self,
        model_id: Option<i64>,
        page: Pagination,
    ) -> Result<Vec<UseCase>, CatalogueError> {
        Ok(self.use_cases.list(model_id, page).await?)
    }

    pub async fn update_use_case(
        &self,
        id: i64,
        update: UseCaseUpdate,
    ) -> Result<UseCase, CatalogueError> {
        let mut record = self.get_use_case(id).await?;
        update.apply_to(&mut record);
        Ok(self.use_cases.update(&record).await?)
    }

    pub async fn delete_use_case(&self, id: i64) -> Result<(), CatalogueError> {
        if !self.use_cases.delete(id).await? {
            return Err(CatalogueError::NotFound(format!(
                "Use case with ID {} not found",
                id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelCatalogue for CatalogueService {
    async fn create_model(&self, model: ModelCreate) -> Result<ModelRecord, CatalogueError> {
        if let Some(existing) = self.models.find_by_name(&model.name).await? {
            return Err(CatalogueError::Conflict(format!(
                "Model '{}' already exists in the database (ID: {})",
                model.name, existing.id
            )));
        }

        let created = self.models.insert(&model).await.map_err(|e| {
            conflict_on_unique(e, || {
                format!("Model '{}' already exists in the database", model.name)
            })
        })?;

        tracing::info!(id = created.id, name = %created.name, "Model created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err = conflict_on_unique(
            DbError::UniqueViolation("duplicate key value violates unique constraint".to_string()),
            || "Model 'gpt-4' already exists in the database".to_string(),
        );
        match err {
            CatalogueError::Conflict(msg) => assert!(msg.contains("gpt-4")),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_other_db_errors_pass_through() {
        let err = conflict_on_unique(DbError::NotFound("model 3".to_string()), || {
            unreachable!("message is only built for conflicts")
        });
        assert!(matches!(err, CatalogueError::Database(DbError::NotFound(_))));
    }

    #[test]
    fn test_not_found_messages_name_the_id() {
        assert_eq!(model_not_found(42).to_string(), "Model with ID 42 not found");
        assert_eq!(
            benchmark_not_found(7).to_string(),
            "Benchmark with ID 7 not found"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_create_model_twice_conflicts() {
        let pool = crate::db::create_pool().await.unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        let service = CatalogueService::new(pool);

        let name = format!("test-model-{}", uuid::Uuid::new_v4());
        let create = ModelCreate {
            name: name.clone(),
            display_name: name.clone(),
            organization: None,
            release_date: None,
            description: Some("A test model.".to_string()),
            license: None,
            metadata: None,
        };

        let created = service.create_model(create.clone()).await.unwrap();
        let second = service.create_model(create).await;
        assert!(matches!(second, Err(CatalogueError::Conflict(_))));

        service.delete_model(created.id).await.unwrap();
        assert!(matches!(
            service.get_model(created.id).await,
            Err(CatalogueError::NotFound(_))
        ));
    }
}
