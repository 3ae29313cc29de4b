//! Error types for the folha-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the folha library.
#[derive(Error, Debug)]
pub enum FolhaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The source document does not resolve to a readable file.
    #[error("input not found or unreadable: {}", path.display())]
    InputMissing { path: PathBuf },

    /// The text extraction collaborator could not open the document.
    #[error("failed to read {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: PdfError,
    },

    /// A classified document could not be parsed into its record.
    #[error("failed to extract {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },

    /// Neither direct text nor OCR identified a time card or pay slip.
    #[error(
        "unsupported document: {} is not a recognizable time card or pay slip",
        path.display()
    )]
    UnsupportedDocument { path: PathBuf },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The page renderer could not be started.
    #[error("page renderer not available: {0} (install poppler-utils)")]
    RendererUnavailable(String),

    /// The page renderer ran but did not produce pages.
    #[error("failed to render pages: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Failed to parse a value.
    #[error("failed to parse {field}: {value:?}")]
    Parse { field: String, value: String },

    /// Text is too short to be worth matching against.
    #[error("insufficient text: {length} characters, at least {minimum} required")]
    InsufficientText { length: usize, minimum: usize },

    /// No record data could be extracted.
    #[error("no data found")]
    NoData,
}

/// Result type for the folha library.
pub type Result<T> = std::result::Result<T, FolhaError>;
