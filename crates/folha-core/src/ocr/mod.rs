//! OCR collaborator: image bytes in, best-effort text out.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::{PureOcrEngine, SUPPORTED_LANGUAGES};

use serde::{Deserialize, Serialize};

/// Turns a raster image into text.
///
/// Implementations never fail: a broken image or a recognizer error yields
/// an empty string and a log line.
pub trait OcrProvider {
    /// Recognize text in PNG/JPEG bytes.
    fn recognize(&self, image: &[u8]) -> String;
}

/// Provider used when OCR is turned off or no models are installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOcr;

impl OcrProvider for DisabledOcr {
    fn recognize(&self, _image: &[u8]) -> String {
        String::new()
    }
}

/// A recognized text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Height of a reading-order row in pixels.
const ROW_HEIGHT: f32 = 20.0;

/// Sort boxes top-to-bottom, left-to-right and join their text.
///
/// Boxes whose tops fall in the same row are joined with a space so a day
/// line or pay slip item stays on one line; rows are separated by newlines.
pub fn reading_order_text(boxes: &mut [TextBox]) -> String {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / ROW_HEIGHT) as i32;
        let row_b = (by / ROW_HEIGHT) as i32;
        row_a
            .cmp(&row_b)
            .then(ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<String> = Vec::new();
    let mut current_row = None;

    for text_box in boxes.iter().filter(|b| !b.text.trim().is_empty()) {
        let row = (text_box.rect().1 / ROW_HEIGHT) as i32;
        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(text_box.text.trim());
            }
            _ => lines.push(text_box.text.trim().to_string()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 15.0, x, y + 15.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order() {
        let mut boxes = vec![
            text_box(200.0, 42.0, "11,12"),
            text_box(10.0, 5.0, "HOLERITE"),
            text_box(10.0, 45.0, "0020 Horas Normais"),
            text_box(120.0, 41.0, "183,25"),
            text_box(300.0, 44.0, "  "),
        ];

        assert_eq!(
            reading_order_text(&mut boxes),
            "HOLERITE\n0020 Horas Normais 183,25 11,12"
        );
    }

    #[test]
    fn test_disabled_ocr_is_empty() {
        assert_eq!(DisabledOcr.recognize(b"not an image"), "");
    }
}
