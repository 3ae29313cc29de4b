//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::{FolhaConfig, OcrConfig};

use super::{reading_order_text, OcrProvider, TextBox};

/// Language profiles served by the latin recognition model.
pub const SUPPORTED_LANGUAGES: &[&str] = &["por", "pt", "latin", "eng", "en", "spa", "es"];

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in the configuration.
    pub fn from_config(config: &FolhaConfig) -> Result<Self, OcrError> {
        let language = config.ocr.language.to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(OcrError::ModelLoad(format!(
                "language profile {:?} is not served by the latin recognition model",
                config.ocr.language
            )));
        }

        let det_path = config.model_path(&config.models.detection_model);
        let rec_path = config.model_path(&config.models.recognition_model);
        let dict_path = config.model_path(&config.models.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine from {} (language {})",
            config.models.model_dir.display(),
            language
        );

        Ok(Self {
            engine,
            config: config.ocr.clone(),
        })
    }

    /// Recognize text boxes in a decoded image.
    pub fn recognize_image(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let start = Instant::now();
        let image = self.limit_size(image);
        let (width, height) = image.dimensions();

        debug!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                TextBox {
                    bbox: polygon_to_bbox(&r.bounding_box),
                    text,
                    confidence: r.confidence,
                }
            })
            .collect();

        debug!(
            "OCR complete: {} text boxes in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );

        Ok(boxes)
    }

    fn limit_size(&self, image: &DynamicImage) -> DynamicImage {
        let max = self.config.max_image_size;
        let (width, height) = image.dimensions();
        if max == 0 || width.max(height) <= max {
            return image.clone();
        }
        debug!("Downscaling {}x{} to fit {}", width, height, max);
        image.resize(max, max, image::imageops::FilterType::Triangle)
    }
}

impl OcrProvider for PureOcrEngine {
    fn recognize(&self, image: &[u8]) -> String {
        let decoded = match image::load_from_memory(image) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("{}", OcrError::InvalidImage(e.to_string()));
                return String::new();
            }
        };

        match self.recognize_image(&decoded) {
            Ok(mut boxes) => reading_order_text(&mut boxes),
            Err(e) => {
                warn!("{}", e);
                String::new()
            }
        }
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_language_rejected() {
        let mut config = FolhaConfig::default();
        config.ocr.language = "jpn".to_string();

        match PureOcrEngine::from_config(&config) {
            Err(OcrError::ModelLoad(message)) => assert!(message.contains("jpn")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("engine built for an unsupported language"),
        }
    }

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FolhaConfig::default();
        config.models.model_dir = dir.path().to_path_buf();

        assert!(matches!(
            PureOcrEngine::from_config(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
