//! Structured record of the decisions taken while processing one document.

use serde::{Deserialize, Serialize};

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Transition,
    Extraction,
    Classification,
    OcrFallback,
    TimeCard,
    Payroll,
    Guess,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub stage: TraceStage,
    pub severity: TraceSeverity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTrace {
    pub trace_schema_version: String,
    pub events: Vec<TraceEvent>,
}

impl Default for ProcessingTrace {
    fn default() -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            events: Vec::new(),
        }
    }
}

impl ProcessingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: TraceStage, severity: TraceSeverity, message: impl Into<String>) {
        self.events.push(TraceEvent {
            stage,
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, stage: TraceStage, message: impl Into<String>) {
        self.record(stage, TraceSeverity::Info, message);
    }

    pub fn warning(&mut self, stage: TraceStage, message: impl Into<String>) {
        self.record(stage, TraceSeverity::Warning, message);
    }

    /// Record parser warnings under one stage.
    pub fn extend_warnings(&mut self, stage: TraceStage, warnings: &[String]) {
        for warning in warnings {
            self.warning(stage, warning.clone());
        }
    }

    /// Events recorded for a stage, in order.
    pub fn stage(&self, stage: TraceStage) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.stage == stage)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events
            .iter()
            .filter(|e| e.severity != TraceSeverity::Info)
    }

    /// Whether any event message of `stage` contains `needle`.
    pub fn contains(&self, stage: TraceStage, needle: &str) -> bool {
        self.stage(stage).any(|e| e.message.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
