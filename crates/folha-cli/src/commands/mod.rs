//! CLI commands.

pub mod batch;
pub mod classify;
pub mod config;
pub mod output;
pub mod process;

use std::path::Path;

use tracing::{debug, warn};

use folha_core::models::config::FolhaConfig;
use folha_core::{DisabledOcr, FileSource, OcrProvider, PdfExtractor, PureOcrEngine};

/// Load the configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FolhaConfig> {
    if let Some(path) = config_path {
        return FolhaConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(FolhaConfig::from_file(&default_path)?)
    } else {
        Ok(FolhaConfig::default())
    }
}

/// Document source for PDFs and raster images.
pub fn file_source(config: &FolhaConfig) -> FileSource {
    FileSource::new(
        PdfExtractor::new()
            .with_max_pages(config.pdf.max_pages)
            .with_renderer(config.pdf.renderer.clone()),
    )
}

/// OCR provider for the configured models, or a disabled one when they are
/// unavailable.
pub fn ocr_provider(config: &FolhaConfig) -> Box<dyn OcrProvider> {
    if !config.ocr.enabled {
        debug!("OCR disabled in configuration");
        return Box::new(DisabledOcr);
    }

    if !config.models_available() {
        warn!(
            "OCR models not found in {}, scanned documents cannot be read",
            config.models.model_dir.display()
        );
        return Box::new(DisabledOcr);
    }

    match PureOcrEngine::from_config(config) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            warn!("{}, OCR fallback disabled", e);
            Box::new(DisabledOcr)
        }
    }
}
