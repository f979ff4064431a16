//! Database module for PostgreSQL persistence

pub mod models;
pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

pub use repository::{
    BenchmarkRepository, BenchmarkResultRepository, ModelRepository, OpinionRepository,
    UseCaseRepository,
};

// Environment variable names
const ENV_POSTGRES_HOST: &str = "CATALOGUE_POSTGRES_HOST";
const ENV_POSTGRES_PORT: &str = "CATALOGUE_POSTGRES_PORT";
const ENV_POSTGRES_USER: &str = "CATALOGUE_POSTGRES_USER";
const ENV_POSTGRES_PASSWORD: &str = "CATALOGUE_POSTGRES_PASSWORD";
const ENV_POSTGRES_DB: &str = "CATALOGUE_POSTGRES_DB";

// Default values
const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_PORT: &str = "5432";
const DEFAULT_POSTGRES_USER: &str = "catalogue";
const DEFAULT_POSTGRES_PASSWORD: &str = "catalogue";
const DEFAULT_POSTGRES_DB: &str = "model_catalogue";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    /// SQLSTATE 23505
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return DbError::UniqueViolation(db_err.message().to_string());
        }
        DbError::Connection(e)
    }
}

/// Build the connection URL from the CATALOGUE_POSTGRES_* variables
fn database_url() -> (String, String, String) {
    let host = env::var(ENV_POSTGRES_HOST).unwrap_or_else(|_| DEFAULT_POSTGRES_HOST.to_string());
    let port = env::var(ENV_POSTGRES_PORT).unwrap_or_else(|_| DEFAULT_POSTGRES_PORT.to_string());
    let user = env::var(ENV_POSTGRES_USER).unwrap_or_else(|_| DEFAULT_POSTGRES_USER.to_string());
    let password =
        env::var(ENV_POSTGRES_PASSWORD).unwrap_or_else(|_| DEFAULT_POSTGRES_PASSWORD.to_string());
    let database = env::var(ENV_POSTGRES_DB).unwrap_or_else(|_| DEFAULT_POSTGRES_DB.to_string());

    let url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, host, port, database
    );
    (url, host, port)
}

/// Create a new database connection pool
pub async fn create_pool() -> Result<PgPool, DbError> {
    let (database_url, host, port) = database_url();

    tracing::debug!(host = %host, port = %port, "Connecting to PostgreSQL");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!(host = %host, port = %port, "PostgreSQL connection established");

    Ok(pool)
}

/// Cheap liveness query used by the readiness probe
pub async fn ping(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS models (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL UNIQUE,
        display_name VARCHAR(255) NOT NULL,
        organization VARCHAR(255),
        release_date DATE,
        description TEXT,
        license VARCHAR(255),
        metadata JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_models_organization ON models(organization)",
    r#"
    CREATE TABLE IF NOT EXISTS benchmarks (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL UNIQUE,
        category VARCHAR(100),
        description TEXT,
        url VARCHAR(500),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_benchmarks_category ON benchmarks(category)",
    r#"
    CREATE TABLE IF NOT EXISTS benchmark_results (
        id BIGSERIAL PRIMARY KEY,
        model_id BIGINT NOT NULL REFERENCES models(id) ON DELETE CASCADE,
        benchmark_id BIGINT NOT NULL REFERENCES benchmarks(id) ON DELETE CASCADE,
        score DOUBLE PRECISION NOT NULL,
        date_tested DATE,
        source VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT uq_benchmark_results_model_benchmark_date
            UNIQUE (model_id, benchmark_id, date_tested)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_benchmark_results_model_id ON benchmark_results(model_id)",
    "CREATE INDEX IF NOT EXISTS idx_benchmark_results_benchmark_id ON benchmark_results(benchmark_id)",
    r#"
    CREATE TABLE IF NOT EXISTS opinions (
        id BIGSERIAL PRIMARY KEY,
        model_id BIGINT NOT NULL REFERENCES models(id) ON DELETE CASCADE,
        content TEXT NOT NULL,
        sentiment VARCHAR(50),
        source TEXT,
        author VARCHAR(255),
        date_published DATE,
        tags TEXT[],
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_opinions_model_id ON opinions(model_id)",
    "CREATE INDEX IF NOT EXISTS idx_opinions_date_published ON opinions(date_published)",
    r#"
    CREATE TABLE IF NOT EXISTS use_cases (
        id BIGSERIAL PRIMARY KEY,
        model_id BIGINT NOT NULL REFERENCES models(id) ON DELETE CASCADE,
        use_case VARCHAR(255) NOT NULL,
        description TEXT,
        mentioned_by VARCHAR(255),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_use_cases_model_id ON use_cases(model_id)",
];

/// Initialize database schema
pub async fn init_schema(pool: &PgPool) -> Result<(), DbError> {
    // Tables before the indexes and foreign keys that reference them
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(statements = SCHEMA_STATEMENTS.len(), "Database schema initialized");

    Ok(())
}
