//! Core library for Brazilian time card and pay slip extraction.
//!
//! This crate provides:
//! - PDF and image sources (page text, embedded images, page rendering)
//! - OCR fallback using PaddleOCR models through `pure-onnx-ocr`
//! - Keyword classification of time cards ("cartão de ponto") and pay slips ("holerite")
//! - Grammar-driven parsers for both document types
//! - A processing state machine that records every decision in a trace

pub mod classify;
pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod payroll;
pub mod processor;
pub mod rules;
pub mod source;
pub mod timecard;
pub mod trace;

pub use classify::{Classification, DocumentClassifier};
pub use error::{ExtractionError, FolhaError, OcrError, PdfError, Result};
pub use extraction::{DocumentParser, Extraction};
pub use models::{
    DocumentType, ExtractedDocument, FolhaConfig, NumberPolicy, PayrollData, PayrollItem, TextOrigin,
    TimeCardData, TimeCardTotals, WorkDay,
};
pub use ocr::{DisabledOcr, OcrProvider, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use payroll::PayrollParser;
pub use processor::{DocumentProcessor, FallbackPolicy, ProcessOptions, ProcessedDocument, Strategy};
pub use source::{DocumentSource, FileSource, ImageFileSource, PageRasterizer, PdfExtractor, SourcePage};
pub use timecard::TimeCardParser;
pub use trace::{ProcessingTrace, TraceStage};
