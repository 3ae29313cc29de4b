//! Parser trait and result wrapper shared by the record parsers.

use serde::Serialize;

use crate::error::ExtractionError;
use crate::models::TextOrigin;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A parsed record plus what the parser noticed along the way.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction<T> {
    /// Populated record.
    pub record: T,
    /// Where the parsed text came from.
    pub origin: TextOrigin,
    /// Non-fatal recoveries (missing metadata, zero-filled numbers, skipped lines).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// A parser turning one block of text into one record.
pub trait DocumentParser {
    type Output;

    /// Parse a record from text.
    fn parse(&self, text: &str) -> Result<Extraction<Self::Output>>;
}
