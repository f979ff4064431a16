//! Repositories for catalogue entities, one per table

mod benchmark;
mod benchmark_result;
mod model;
mod opinion;
mod use_case;

pub use benchmark::BenchmarkRepository;
pub use benchmark_result::{BenchmarkResultFilter, BenchmarkResultRepository};
pub use model::ModelRepository;
pub use opinion::{OpinionFilter, OpinionRepository};
pub use use_case::UseCaseRepository;
