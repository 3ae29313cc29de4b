//! Document processing orchestrator.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::classify::{Classification, DocumentClassifier};
use crate::error::{ExtractionError, FolhaError, Result};
use crate::extraction::DocumentParser;
use crate::models::{DocumentType, ExtractedDocument, FolhaConfig, TextOrigin};
use crate::ocr::OcrProvider;
use crate::payroll::PayrollParser;
use crate::rules::normalize_text;
use crate::source::{DocumentSource, PageRasterizer, SourcePage};
use crate::timecard::TimeCardParser;
use crate::trace::{ProcessingTrace, TraceSeverity, TraceStage};

use super::state::{FallbackPolicy, ProcessOptions, ProcessedDocument, ProcessingState, Strategy};

/// An image queued for OCR, with its normalized text once recognized.
struct OcrImage {
    page: u32,
    index: usize,
    bytes: Vec<u8>,
    text: Option<String>,
}

struct Outcome {
    document: ExtractedDocument,
    origin: TextOrigin,
    strategy: Strategy,
}

/// Working state of one invocation.
struct Run<'p> {
    path: &'p Path,
    options: ProcessOptions,
    pages: Vec<SourcePage>,
    direct_text: String,
    images: Option<Vec<OcrImage>>,
    trace: ProcessingTrace,
    outcome: Option<Outcome>,
}

impl<'p> Run<'p> {
    fn new(path: &'p Path, options: ProcessOptions) -> Self {
        Self {
            path,
            options,
            pages: Vec::new(),
            direct_text: String::new(),
            images: None,
            trace: ProcessingTrace::new(),
            outcome: None,
        }
    }

    fn note(&mut self, stage: TraceStage, severity: TraceSeverity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            TraceSeverity::Info => debug!("{}: {}", self.path.display(), message),
            TraceSeverity::Warning => warn!("{}: {}", self.path.display(), message),
            TraceSeverity::Critical => error!("{}: {}", self.path.display(), message),
        }
        self.trace.record(stage, severity, message);
    }

    fn parse_failure(&self, source: ExtractionError) -> FolhaError {
        FolhaError::Parse {
            path: self.path.to_path_buf(),
            source,
        }
    }

    fn image_count(&self) -> usize {
        self.images.as_ref().map_or(0, Vec::len)
    }

    /// Normalized OCR text of image `i`, recognized at most once.
    fn recognize(&mut self, ocr: &dyn OcrProvider, i: usize) -> String {
        let Some(image) = self.images.as_mut().and_then(|images| images.get_mut(i)) else {
            return String::new();
        };
        if image.text.is_none() {
            image.text = Some(normalize_text(&ocr.recognize(&image.bytes)));
        }
        image.text.clone().unwrap_or_default()
    }
}

/// Drives classification, parser dispatch and the fallback strategies for
/// one document at a time.
///
/// The processor only borrows its collaborators and keeps no state between
/// calls, so one instance per thread (or one shared by reference) can serve
/// any number of documents.
pub struct DocumentProcessor<'a> {
    source: &'a dyn DocumentSource,
    ocr: &'a dyn OcrProvider,
    rasterizer: Option<&'a dyn PageRasterizer>,
    config: FolhaConfig,
    classifier: DocumentClassifier,
    ocr_classifier: DocumentClassifier,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(source: &'a dyn DocumentSource, ocr: &'a dyn OcrProvider) -> Self {
        Self {
            source,
            ocr,
            rasterizer: None,
            config: FolhaConfig::default(),
            classifier: DocumentClassifier::standard(),
            ocr_classifier: DocumentClassifier::ocr(),
        }
    }

    /// Render pages when the OCR fallback finds no embedded images.
    pub fn with_rasterizer(mut self, rasterizer: &'a dyn PageRasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn with_config(mut self, config: &FolhaConfig) -> Self {
        let min = config.extraction.min_text_length;
        self.config = config.clone();
        self.classifier = DocumentClassifier::standard().with_min_text_length(min);
        self.ocr_classifier = DocumentClassifier::ocr().with_min_text_length(min);
        self
    }

    /// Process a document, failing when no strategy classifies it.
    pub fn process_strict(&self, path: &Path) -> Result<ProcessedDocument> {
        self.process(path, &ProcessOptions::strict())
    }

    /// Process a document, guessing its type when no strategy classifies it.
    pub fn process_permissive(&self, path: &Path) -> Result<ProcessedDocument> {
        self.process(path, &ProcessOptions::permissive())
    }

    pub fn process(&self, path: &Path, options: &ProcessOptions) -> Result<ProcessedDocument> {
        let start = Instant::now();
        let mut run = Run::new(path, *options);
        let mut state = ProcessingState::Start;

        info!("Processing {}", path.display());

        loop {
            let next = match state {
                ProcessingState::Start => self.start(&mut run)?,
                ProcessingState::Classify => self.classify_direct(&mut run),
                ProcessingState::Dispatch(document_type) => self.dispatch(&mut run, document_type)?,
                ProcessingState::OcrFallback => self.ocr_fallback(&mut run)?,
                ProcessingState::Guess => self.guess(&mut run),
                ProcessingState::Done | ProcessingState::Failed => break,
            };
            run.note(TraceStage::Transition, TraceSeverity::Info, format!("{} -> {}", state, next));
            state = next;
        }

        let outcome = match (state, run.outcome.take()) {
            (ProcessingState::Done, Some(outcome)) => outcome,
            _ => {
                error!("{}: no strategy produced a record", path.display());
                return Err(FolhaError::UnsupportedDocument {
                    path: path.to_path_buf(),
                });
            }
        };

        let document_type = outcome.document.document_type();
        info!(
            "Processed {} as {} ({:?}, {:?})",
            path.display(),
            document_type,
            outcome.strategy,
            outcome.origin
        );

        Ok(ProcessedDocument {
            path: path.to_path_buf(),
            document_type,
            origin: outcome.origin,
            strategy: outcome.strategy,
            document: outcome.document,
            trace: run.trace,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Classify a document without parsing it.
    ///
    /// The direct text is tried first, then the OCR text of each image.
    pub fn classify(&self, path: &Path) -> Result<Classification> {
        let mut run = Run::new(path, ProcessOptions::default());
        self.start(&mut run)?;

        let direct = self.classifier.classify(&normalize_text(&run.direct_text));
        if direct.is_known() {
            return Ok(direct);
        }

        self.collect_images(&mut run);
        for i in 0..run.image_count() {
            let classification = self.ocr_classifier.classify(&run.recognize(self.ocr, i));
            if classification.is_known() {
                return Ok(classification);
            }
        }

        Ok(direct)
    }

    fn start(&self, run: &mut Run<'_>) -> Result<ProcessingState> {
        if !run.path.is_file() || std::fs::File::open(run.path).is_err() {
            error!("Input not found or unreadable: {}", run.path.display());
            return Err(FolhaError::InputMissing {
                path: run.path.to_path_buf(),
            });
        }

        let pages = self.source.load(run.path).map_err(|source| FolhaError::Source {
            path: run.path.to_path_buf(),
            source,
        })?;

        run.direct_text = pages
            .iter()
            .map(|page| page.text.as_str())
            .filter(|text| !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let image_count: usize = pages.iter().map(|page| page.images.len()).sum();
        let message = format!(
            "{} pages, {} chars of direct text, {} embedded images",
            pages.len(),
            run.direct_text.chars().count(),
            image_count
        );
        run.note(TraceStage::Extraction, TraceSeverity::Info, message);
        run.pages = pages;

        Ok(ProcessingState::Classify)
    }

    fn classify_direct(&self, run: &mut Run<'_>) -> ProcessingState {
        let classification = self.classifier.classify(&normalize_text(&run.direct_text));
        run.note(
            TraceStage::Classification,
            TraceSeverity::Info,
            format!("direct text: {}", classification.summary()),
        );

        if classification.is_known() {
            ProcessingState::Dispatch(classification.document_type)
        } else {
            ProcessingState::OcrFallback
        }
    }

    fn dispatch(&self, run: &mut Run<'_>, document_type: DocumentType) -> Result<ProcessingState> {
        if run.options.force_ocr {
            let text = self.all_ocr_text(run);
            if text.trim().is_empty() {
                run.note(
                    TraceStage::OcrFallback,
                    TraceSeverity::Warning,
                    "forced OCR produced no text, using direct text",
                );
            } else if document_type == DocumentType::Payroll && !self.is_usable(&text) {
                let message = format!(
                    "forced OCR text too short for pay slip parsing ({} < {} chars), using direct text",
                    text.trim().chars().count(),
                    self.config.extraction.min_text_length
                );
                run.note(TraceStage::OcrFallback, TraceSeverity::Warning, message);
            } else {
                run.note(
                    TraceStage::OcrFallback,
                    TraceSeverity::Info,
                    format!("forced OCR: parsing {} chars of OCR text", text.chars().count()),
                );
                let document = self.parse(run, document_type, &text, TextOrigin::Ocr)?;
                run.outcome = Some(Outcome {
                    document,
                    origin: TextOrigin::Ocr,
                    strategy: Strategy::DirectText,
                });
                return Ok(ProcessingState::Done);
            }
        }

        if document_type == DocumentType::Payroll && !self.is_usable(&run.direct_text) {
            let message = format!(
                "direct text too short for pay slip parsing ({} < {} chars)",
                run.direct_text.trim().chars().count(),
                self.config.extraction.min_text_length
            );
            run.note(TraceStage::Payroll, TraceSeverity::Warning, message);
            return Ok(ProcessingState::OcrFallback);
        }

        let text = run.direct_text.clone();
        let document = self.parse(run, document_type, &text, TextOrigin::Direct)?;
        run.outcome = Some(Outcome {
            document,
            origin: TextOrigin::Direct,
            strategy: Strategy::DirectText,
        });
        Ok(ProcessingState::Done)
    }

    fn ocr_fallback(&self, run: &mut Run<'_>) -> Result<ProcessingState> {
        self.collect_images(run);

        if run.image_count() == 0 {
            run.note(TraceStage::OcrFallback, TraceSeverity::Warning, "no images to recognize");
            return Ok(self.exhausted(run));
        }

        for i in 0..run.image_count() {
            let text = run.recognize(self.ocr, i);
            let (page, index) = match run.images.as_ref().and_then(|images| images.get(i)) {
                Some(image) => (image.page, image.index),
                None => continue,
            };

            let classification = self.ocr_classifier.classify(&text);
            run.note(
                TraceStage::OcrFallback,
                TraceSeverity::Info,
                format!("page {} image {}: {}", page, index, classification.summary()),
            );

            if !classification.is_known() {
                continue;
            }
            if classification.document_type == DocumentType::Payroll && !self.is_usable(&text) {
                run.note(
                    TraceStage::OcrFallback,
                    TraceSeverity::Warning,
                    format!("page {} image {}: OCR text too short for pay slip parsing", page, index),
                );
                continue;
            }

            let document = self.parse(run, classification.document_type, &text, TextOrigin::Ocr)?;
            run.outcome = Some(Outcome {
                document,
                origin: TextOrigin::Ocr,
                strategy: Strategy::OcrFallback,
            });
            return Ok(ProcessingState::Done);
        }

        Ok(self.exhausted(run))
    }

    /// Every strategy left the document unclassified.
    fn exhausted(&self, run: &mut Run<'_>) -> ProcessingState {
        match run.options.policy {
            FallbackPolicy::Strict => {
                run.note(
                    TraceStage::OcrFallback,
                    TraceSeverity::Critical,
                    "neither direct text nor OCR identified the document",
                );
                ProcessingState::Failed
            }
            FallbackPolicy::Permissive => ProcessingState::Guess,
        }
    }

    fn guess(&self, run: &mut Run<'_>) -> ProcessingState {
        let (text, origin) = if self.is_usable(&run.direct_text) {
            (run.direct_text.clone(), TextOrigin::Direct)
        } else {
            (self.all_ocr_text(run), TextOrigin::Ocr)
        };

        run.note(
            TraceStage::Guess,
            TraceSeverity::Info,
            format!("guessing on {} chars of {:?} text", text.chars().count(), origin),
        );

        for document_type in [DocumentType::Payroll, DocumentType::TimeCard] {
            if document_type == DocumentType::Payroll && !self.is_usable(&text) {
                run.note(
                    TraceStage::Guess,
                    TraceSeverity::Warning,
                    "payroll guess skipped: insufficient text",
                );
                continue;
            }

            match self.parse(run, document_type, &text, origin) {
                Ok(document) if self.has_content(&document) => {
                    run.note(TraceStage::Guess, TraceSeverity::Info, format!("accepted {} guess", document_type));
                    run.outcome = Some(Outcome {
                        document,
                        origin,
                        strategy: Strategy::Guessed,
                    });
                    return ProcessingState::Done;
                }
                Ok(_) => run.note(
                    TraceStage::Guess,
                    TraceSeverity::Warning,
                    format!("{} guess rejected: no content", document_type),
                ),
                Err(e) => run.note(
                    TraceStage::Guess,
                    TraceSeverity::Warning,
                    format!("{} guess failed: {}", document_type, e),
                ),
            }
        }

        run.note(TraceStage::Guess, TraceSeverity::Critical, "no guess produced a record");
        ProcessingState::Failed
    }

    fn parse(
        &self,
        run: &mut Run<'_>,
        document_type: DocumentType,
        text: &str,
        origin: TextOrigin,
    ) -> Result<ExtractedDocument> {
        let policy = self.config.extraction.number_policy;

        match document_type {
            DocumentType::TimeCard => {
                let result = TimeCardParser::new()
                    .with_origin(origin)
                    .with_number_policy(policy)
                    .parse(text)
                    .map_err(|e| run.parse_failure(e))?;
                for warning in &result.warnings {
                    run.note(TraceStage::TimeCard, TraceSeverity::Warning, warning.clone());
                }
                run.note(
                    TraceStage::TimeCard,
                    TraceSeverity::Info,
                    format!(
                        "{} work days in {} months",
                        result.record.work_days.len(),
                        result.record.months.len()
                    ),
                );
                Ok(ExtractedDocument::TimeCard(result.record))
            }
            DocumentType::Payroll => {
                let result = PayrollParser::new()
                    .with_origin(origin)
                    .with_number_policy(policy)
                    .parse(text)
                    .map_err(|e| run.parse_failure(e))?;
                for warning in &result.warnings {
                    run.note(TraceStage::Payroll, TraceSeverity::Warning, warning.clone());
                }
                run.note(
                    TraceStage::Payroll,
                    TraceSeverity::Info,
                    format!(
                        "{} earnings, {} deductions, totals from {:?}",
                        result.record.earnings.len(),
                        result.record.deductions.len(),
                        result.record.totals_source
                    ),
                );
                Ok(ExtractedDocument::Payroll(result.record))
            }
            DocumentType::Unknown => Err(run.parse_failure(ExtractionError::NoData)),
        }
    }

    /// Queue embedded images for OCR, or rendered pages when there are none.
    fn collect_images(&self, run: &mut Run<'_>) {
        if run.images.is_some() {
            return;
        }

        let mut images: Vec<OcrImage> = Vec::new();
        for page in &mut run.pages {
            for (i, bytes) in std::mem::take(&mut page.images).into_iter().enumerate() {
                images.push(OcrImage {
                    page: page.number,
                    index: i + 1,
                    bytes,
                    text: None,
                });
            }
        }

        if images.is_empty() {
            if let Some(rasterizer) = self.rasterizer {
                let dpi = self.config.pdf.render_dpi;
                match rasterizer.rasterize(run.path, dpi) {
                    Ok(rasters) => {
                        run.note(
                            TraceStage::OcrFallback,
                            TraceSeverity::Info,
                            format!("no embedded images, rasterized {} pages at {} DPI", rasters.len(), dpi),
                        );
                        images = rasters
                            .into_iter()
                            .enumerate()
                            .map(|(i, bytes)| OcrImage {
                                page: i as u32 + 1,
                                index: 1,
                                bytes,
                                text: None,
                            })
                            .collect();
                    }
                    Err(e) => run.note(
                        TraceStage::OcrFallback,
                        TraceSeverity::Warning,
                        format!("page rasterization failed: {}", e),
                    ),
                }
            }
        }

        run.images = Some(images);
    }

    /// Normalized OCR text of every image, in page order.
    fn all_ocr_text(&self, run: &mut Run<'_>) -> String {
        self.collect_images(run);
        (0..run.image_count())
            .map(|i| run.recognize(self.ocr, i))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_usable(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.config.extraction.min_text_length
    }

    fn has_content(&self, document: &ExtractedDocument) -> bool {
        if !self.config.extraction.require_content_for_guess {
            return true;
        }
        match document {
            ExtractedDocument::TimeCard(card) => !card.work_days.is_empty(),
            ExtractedDocument::Payroll(slip) => slip.item_count() > 0,
        }
    }
}
