//! Raster image files as single-page documents.

use std::path::Path;

use tracing::debug;

use crate::error::PdfError;

use super::{DocumentSource, Result, SourcePage};

/// Wraps a PNG/JPEG/TIFF scan as one page with no text layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileSource;

impl DocumentSource for ImageFileSource {
    fn load(&self, path: &Path) -> Result<Vec<SourcePage>> {
        let data = std::fs::read(path)?;
        let format = image::guess_format(&data)
            .map_err(|e| PdfError::ImageExtraction(format!("{}: {}", path.display(), e)))?;

        debug!("Loaded {:?} image of {} bytes from {}", format, data.len(), path.display());

        Ok(vec![SourcePage {
            number: 1,
            text: String::new(),
            images: vec![data],
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_png_is_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        let pages = ImageFileSource.load(&path).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].text.is_empty());
        assert_eq!(pages[0].images.len(), 1);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::File::create(&path).unwrap().write_all(b"not an image").unwrap();

        assert!(matches!(ImageFileSource.load(&path), Err(PdfError::ImageExtraction(_))));
    }
}
