//! Document-level types shared by the classifier and the processor.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::payroll::PayrollData;
use super::timecard::TimeCardData;

/// Kind of document a block of text represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Time card ("cartão de ponto").
    TimeCard,
    /// Pay slip ("holerite").
    Payroll,
    /// Neither keyword threshold was reached.
    Unknown,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::TimeCard => write!(f, "time card"),
            DocumentType::Payroll => write!(f, "payroll"),
            DocumentType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where a block of text came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// Machine-extracted text layer.
    #[default]
    Direct,
    /// Text recognized from a raster image.
    Ocr,
}

/// A populated record handed to report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ExtractedDocument {
    TimeCard(TimeCardData),
    Payroll(PayrollData),
}

impl ExtractedDocument {
    pub fn document_type(&self) -> DocumentType {
        match self {
            ExtractedDocument::TimeCard(_) => DocumentType::TimeCard,
            ExtractedDocument::Payroll(_) => DocumentType::Payroll,
        }
    }

    pub fn as_time_card(&self) -> Option<&TimeCardData> {
        match self {
            ExtractedDocument::TimeCard(data) => Some(data),
            ExtractedDocument::Payroll(_) => None,
        }
    }

    pub fn as_payroll(&self) -> Option<&PayrollData> {
        match self {
            ExtractedDocument::Payroll(data) => Some(data),
            ExtractedDocument::TimeCard(_) => None,
        }
    }
}
