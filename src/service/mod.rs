pub mod catalogue;
pub mod extraction;
pub mod llm;
