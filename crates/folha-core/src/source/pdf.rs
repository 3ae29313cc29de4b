//! PDF text and image extraction using lopdf and pdf-extract, page
//! rendering using poppler's `pdftoppm`.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tempfile::TempDir;
use tracing::{debug, trace, warn};

use super::{DocumentSource, PageRasterizer, Result, SourcePage};
use crate::error::PdfError;

/// Renderer looked up on `PATH` unless another program is configured.
pub const DEFAULT_RENDERER: &str = "pdftoppm";

/// PDF content extractor using lopdf.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// Maximum pages to read (0 = unlimited).
    max_pages: usize,
    /// `pdftoppm`-compatible program used to render pages.
    renderer: PathBuf,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            max_pages: 0,
            renderer: PathBuf::from(DEFAULT_RENDERER),
        }
    }
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<PathBuf>) -> Self {
        self.renderer = renderer.into();
        self
    }

    /// Open a PDF, decrypting it when it uses the empty password.
    ///
    /// Returns the document and the bytes pdf-extract should read.
    fn open(&self, path: &Path) -> Result<(Document, Vec<u8>)> {
        let data = std::fs::read(path)?;
        let mut doc = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data
        };

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok((doc, raw_data))
    }

    /// Page numbers and ids to process, honoring `max_pages`.
    fn pages(&self, doc: &Document) -> Vec<(u32, ObjectId)> {
        let pages = doc.get_pages().into_iter();
        if self.max_pages > 0 {
            pages.take(self.max_pages).collect()
        } else {
            pages.collect()
        }
    }

    /// Images referenced by a page's XObject resources, as encoded bytes.
    fn page_images(&self, doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let mut images = Vec::new();

        let Some(Object::Dictionary(resources)) = inherited_attribute(doc, page_id, b"Resources") else {
            return images;
        };

        if let Ok(xobjects) = resources.get(b"XObject") {
            if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                for (_name, obj_ref) in xobj_dict.iter() {
                    if let Ok((_, obj)) = doc.dereference(obj_ref) {
                        if let Some(bytes) = self.encoded_image(doc, obj) {
                            images.push(bytes);
                        }
                    }
                }
            }
        }

        images
    }

    /// Image bytes for an XObject. JPEG streams are passed through as-is.
    fn encoded_image(&self, doc: &Document, obj: &Object) -> Option<Vec<u8>> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        if image_filter(&stream.dict) == Some(b"DCTDecode".as_slice()) && is_image(&stream.dict) {
            return Some(stream.content.clone());
        }
        let img = self.decode_image(doc, obj)?;
        encode_png(&img)
    }

    fn decode_image(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;
        if !is_image(dict) {
            return None;
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

        trace!("Found image object: {}x{}", width, height);

        match image_filter(dict) {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter");
                return None;
            }
            _ => {}
        }

        let data = match stream.decompressed_content() {
            Ok(d) => d,
            Err(_) => stream.content.clone(),
        };

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8) as u8;

        create_image_from_raw(&data, width, height, color_space, bits)
    }
}

impl DocumentSource for PdfExtractor {
    fn load(&self, path: &Path) -> Result<Vec<SourcePage>> {
        let (doc, raw_data) = self.open(path)?;
        let pages = self.pages(&doc);

        let texts = match pdf_extract::extract_text_from_mem_by_pages(&raw_data) {
            Ok(texts) => texts,
            Err(e) => {
                warn!("{}: {}", path.display(), PdfError::TextExtraction(e.to_string()));
                Vec::new()
            }
        };

        let result: Vec<SourcePage> = pages
            .iter()
            .enumerate()
            .map(|(index, &(number, page_id))| SourcePage {
                number,
                text: texts.get(index).cloned().unwrap_or_default(),
                images: self.page_images(&doc, page_id),
            })
            .collect();

        debug!(
            "Loaded {}: {} pages, {} chars text, {} images",
            path.display(),
            result.len(),
            result.iter().map(|p| p.text.len()).sum::<usize>(),
            result.iter().map(|p| p.images.len()).sum::<usize>()
        );

        Ok(result)
    }
}

impl PageRasterizer for PdfExtractor {
    /// One PNG per page, rendered by `pdftoppm` at `dpi`.
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<Vec<u8>>> {
        let dir = TempDir::new()?;
        let prefix = dir.path().join("page");

        let mut command = Command::new(&self.renderer);
        command.arg("-png").arg("-r").arg(dpi.to_string());
        if self.max_pages > 0 {
            command.arg("-l").arg(self.max_pages.to_string());
        }

        match command.arg(path).arg(&prefix).output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                return Err(PdfError::Render(format!(
                    "{} exited with {}: {}",
                    self.renderer.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PdfError::RendererUnavailable(self.renderer.display().to_string()));
            }
            Err(e) => return Err(PdfError::Io(e)),
        }

        // pdftoppm pads page numbers to a common width, so names sort in page order
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(PdfError::Render(format!("{} produced no pages", self.renderer.display())));
        }

        let rasters = files
            .iter()
            .map(std::fs::read)
            .collect::<std::io::Result<Vec<_>>>()?;

        debug!("Rasterized {} pages of {} at {} DPI", rasters.len(), path.display(), dpi);
        Ok(rasters)
    }
}

fn is_image(dict: &lopdf::Dictionary) -> bool {
    dict.get(b"Subtype")
        .ok()
        .and_then(|s| s.as_name().ok())
        .is_some_and(|name| name == b"Image")
}

fn image_filter(dict: &lopdf::Dictionary) -> Option<&[u8]> {
    match dict.get(b"Filter").ok()? {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    }
}

fn encode_png(img: &DynamicImage) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png).ok()?;
    Some(data)
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = (width as usize).checked_mul(height as usize)?;
    let expected_gray = pixels;
    let expected_rgb = pixels.checked_mul(3)?;

    let rgba_data: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= expected_rgb => data[..expected_rgb]
            .chunks(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= expected_gray => data[..expected_gray]
            .iter()
            .flat_map(|&gray| [gray, gray, gray, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: data_len={}, expected_rgb={}, expected_gray={}",
                data.len(),
                expected_rgb,
                expected_gray
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data).map(DynamicImage::ImageRgba8)
}

/// Look up a page attribute, walking up the page tree for inherited ones.
fn inherited_attribute(doc: &Document, node_id: ObjectId, key: &[u8]) -> Option<Object> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(value) = dict.get(key) {
        if let Ok((_, resolved)) = doc.dereference(value) {
            return Some(resolved.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => inherited_attribute(doc, *parent_id, key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    fn renderer_installed() -> bool {
        Command::new(DEFAULT_RENDERER).arg("-v").output().is_ok()
    }

    /// One A4 page with a line of Helvetica text.
    fn text_pdf(path: &Path, line: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![40.into(), 780.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_gray_image_from_raw() {
        let img = create_image_from_raw(&[0, 128, 255, 64], 2, 2, b"DeviceGray", 8).unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert_eq!(img.to_rgba8().get_pixel(1, 0).0, [128, 128, 128, 255]);

        assert!(create_image_from_raw(&[0, 1], 2, 2, b"DeviceGray", 8).is_none());
        assert!(create_image_from_raw(&[0; 4], 2, 2, b"DeviceGray", 1).is_none());
    }

    #[test]
    fn test_oversized_raw_image_is_rejected() {
        assert!(create_image_from_raw(&[0; 12], u32::MAX, u32::MAX, b"DeviceRGB", 8).is_none());
        assert!(create_image_from_raw(&[0; 12], u32::MAX, 2, b"DeviceGray", 8).is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PdfExtractor::new().load(Path::new("/nonexistent/cartao.pdf"));
        assert!(matches!(result, Err(PdfError::Io(_))));
    }

    #[test]
    fn test_missing_renderer_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cartao.pdf");
        text_pdf(&path, "CARTAO DE PONTO");

        let result = PdfExtractor::new()
            .with_renderer("folha-missing-renderer")
            .rasterize(&path, 72);

        match result {
            Err(PdfError::RendererUnavailable(program)) => assert_eq!(program, "folha-missing-renderer"),
            other => panic!("expected unavailable renderer, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_rasterize_renders_page_content() {
        if !renderer_installed() {
            eprintln!("skipping: {} not installed", DEFAULT_RENDERER);
            return;
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cartao.pdf");
        text_pdf(&path, "CARTAO DE PONTO");

        let rasters = PdfExtractor::new().rasterize(&path, 72).unwrap();
        assert_eq!(rasters.len(), 1);

        let page = image::load_from_memory(&rasters[0]).unwrap().to_luma8();
        assert_eq!((page.width(), page.height()), (595, 842));
        assert!(page.pixels().any(|p| p.0[0] < 128), "rendered page is blank");
    }

    #[test]
    fn test_rasterize_rejects_broken_pdf() {
        if !renderer_installed() {
            eprintln!("skipping: {} not installed", DEFAULT_RENDERER);
            return;
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not a pdf at all").unwrap();

        assert!(matches!(PdfExtractor::new().rasterize(&path, 72), Err(PdfError::Render(_))));
    }
}
