pub mod catalogue;
pub mod config;
pub mod extraction;

pub use catalogue::*;
pub use config::{Config, CorsConfig, ExtractionSettings};
pub use extraction::{ExtractedModelData, ExtractedModelPayload, ExtractionOutcome};
