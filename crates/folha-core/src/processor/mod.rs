//! Classification, parser dispatch and fallback strategies.

mod orchestrator;
mod state;

pub use orchestrator::DocumentProcessor;
pub use state::{FallbackPolicy, ProcessOptions, ProcessedDocument, ProcessingState, Strategy};
