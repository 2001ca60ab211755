//! Core traits for pluggable external collaborators

pub mod llm;
pub mod persistence;

pub use llm::{CompletionModel, CompletionOutput};
pub use persistence::LeadSink;
