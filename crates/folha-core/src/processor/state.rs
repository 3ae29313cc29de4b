//! States, options and output of the processing state machine.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::models::{DocumentType, ExtractedDocument, TextOrigin};
use crate::trace::ProcessingTrace;

/// Where the orchestrator is while processing one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    Start,
    Classify,
    Dispatch(DocumentType),
    OcrFallback,
    /// Permissive policy only: try each parser on unclassified text.
    Guess,
    Done,
    Failed,
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingState::Start => write!(f, "Start"),
            ProcessingState::Classify => write!(f, "Classify"),
            ProcessingState::Dispatch(document_type) => write!(f, "Dispatch({})", document_type),
            ProcessingState::OcrFallback => write!(f, "OcrFallback"),
            ProcessingState::Guess => write!(f, "Guess"),
            ProcessingState::Done => write!(f, "Done"),
            ProcessingState::Failed => write!(f, "Failed"),
        }
    }
}

/// What happens when neither direct text nor OCR is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Fail with an unsupported document error.
    #[default]
    Strict,
    /// Try pay slip, then time card, and keep the first with content.
    Permissive,
}

/// Options for one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    pub policy: FallbackPolicy,
    /// Parse OCR text of every image even when the direct text classifies.
    pub force_ocr: bool,
}

impl ProcessOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn permissive() -> Self {
        Self {
            policy: FallbackPolicy::Permissive,
            ..Self::default()
        }
    }

    pub fn with_force_ocr(mut self, force_ocr: bool) -> Self {
        self.force_ocr = force_ocr;
        self
    }
}

/// How the record was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Classified from the text layer.
    DirectText,
    /// Classified from the OCR text of one image.
    OcrFallback,
    /// Unclassified; accepted because a parser found content.
    Guessed,
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub path: PathBuf,
    pub document_type: DocumentType,
    pub origin: TextOrigin,
    pub strategy: Strategy,
    pub document: ExtractedDocument,
    pub trace: ProcessingTrace,
    pub processing_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ProcessingState::Dispatch(DocumentType::Payroll).to_string(), "Dispatch(payroll)");
        assert_eq!(ProcessingState::OcrFallback.to_string(), "OcrFallback");
    }

    #[test]
    fn test_options() {
        let options = ProcessOptions::permissive().with_force_ocr(true);
        assert_eq!(options.policy, FallbackPolicy::Permissive);
        assert!(options.force_ocr);
        assert_eq!(ProcessOptions::strict().policy, FallbackPolicy::Strict);
    }
}
