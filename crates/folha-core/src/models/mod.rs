//! Data models for extracted records and configuration.

pub mod config;
pub mod document;
pub mod payroll;
pub mod timecard;

pub use config::{ExtractionConfig, FolhaConfig, ModelConfig, NumberPolicy, OcrConfig, PdfConfig};
pub use document::{DocumentType, ExtractedDocument, TextOrigin};
pub use payroll::{PayrollData, PayrollItem, TotalsSource};
pub use timecard::{MonthData, TimeCardData, TimeCardTotals, WorkDay, REST_SITUATION};
