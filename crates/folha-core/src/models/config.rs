//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the folha pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolhaConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR at all. When disabled the fallback sees empty text.
    pub enabled: bool,

    /// Recognition language profile.
    pub language: String,

    /// Keep `[UNK]` tokens emitted by the recognizer.
    pub keep_unk: bool,

    /// Maximum image dimension (longer side) for processing.
    pub max_image_size: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "por".to_string(),
            keep_unk: false,
            max_image_size: 2048,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rasterizing pages when no embedded images exist.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: usize,

    /// `pdftoppm`-compatible program used for rasterizing.
    pub renderer: PathBuf,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 0,
            renderer: PathBuf::from(crate::source::DEFAULT_RENDERER),
        }
    }
}

/// What parsers do with a numeric token that does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberPolicy {
    /// Substitute zero and record a warning.
    #[default]
    ZeroFill,
    /// Fail the parse with the offending field and token.
    Strict,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum text length to consider a text block usable.
    pub min_text_length: usize,

    /// Handling of malformed numeric tokens.
    pub number_policy: NumberPolicy,

    /// Reject guessed classifications that yield no items / work days.
    pub require_content_for_guess: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            number_policy: NumberPolicy::ZeroFill,
            require_content_for_guess: true,
        }
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl FolhaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }

    /// Check whether every OCR model file is present.
    pub fn models_available(&self) -> bool {
        [
            &self.models.detection_model,
            &self.models.recognition_model,
            &self.models.dictionary,
        ]
        .iter()
        .all(|name| self.model_path(name).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FolhaConfig =
            serde_json::from_str(r#"{"extraction": {"number_policy": "strict"}}"#).unwrap();

        assert_eq!(config.extraction.number_policy, NumberPolicy::Strict);
        assert_eq!(config.extraction.min_text_length, 50);
        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.ocr.language, "por");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = FolhaConfig::default();
        config.pdf.max_pages = 3;
        config.save(&path).unwrap();

        let loaded = FolhaConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pdf.max_pages, 3);
    }
}
