pub mod benchmark_results;
pub mod benchmarks;
pub mod error;
pub mod extraction;
pub mod health;
pub mod models;
pub mod openapi;
pub mod opinions;
pub mod use_cases;
pub mod validation;
