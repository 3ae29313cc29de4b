//! Document sources: per-page text and embedded images.

mod image_file;
mod pdf;

pub use image_file::ImageFileSource;
pub use pdf::{DEFAULT_RENDERER, PdfExtractor};

use std::path::Path;

use crate::error::PdfError;

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Content of one page.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Text in page reading order. Empty for scanned pages.
    pub text: String,
    /// Embedded raster images as PNG/JPEG bytes.
    pub images: Vec<Vec<u8>>,
}

impl SourcePage {
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

/// Yields per-page text and images for a document path.
pub trait DocumentSource {
    fn load(&self, path: &Path) -> Result<Vec<SourcePage>>;
}

/// Renders one raster image per page at a fixed DPI.
pub trait PageRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>>;
}

/// Kind of input file, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Some(SourceKind::Image),
            _ => None,
        }
    }
}

/// Dispatches to the PDF or image source by file extension.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    pdf: PdfExtractor,
    image: ImageFileSource,
}

impl FileSource {
    pub fn new(pdf: PdfExtractor) -> Self {
        Self {
            pdf,
            image: ImageFileSource,
        }
    }
}

impl DocumentSource for FileSource {
    fn load(&self, path: &Path) -> Result<Vec<SourcePage>> {
        match SourceKind::from_path(path) {
            Some(SourceKind::Image) => self.image.load(path),
            // Unknown extensions are tried as PDF
            Some(SourceKind::Pdf) | None => self.pdf.load(path),
        }
    }
}

impl PageRasterizer for FileSource {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>> {
        match SourceKind::from_path(path) {
            Some(SourceKind::Image) => Ok(Vec::new()),
            Some(SourceKind::Pdf) | None => self.pdf.rasterize(path, dpi),
        }
    }
}
