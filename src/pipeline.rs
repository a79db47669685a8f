use crate::diagnostics::DiagnosticSink;
use crate::ocr::{EnhancementSearch, OcrEngine, OcrFallback, TesseractEngine};
use crate::raster::{PageRasterizer, PdftoppmRasterizer};
use crate::summary::{Summarizer, SummaryInput};
use crate::{text, Attachment, AttachmentExtractor, ExtractedFields, FieldExtractor, PipelineConfig, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

// ── FilingReport ─────────────────────────────────────────────────────────────

/// Everything produced for one filing.
#[derive(Debug, Clone, Serialize)]
pub struct FilingReport {
    /// Identifies this invocation; also the name of its output directory.
    pub run_id: Uuid,
    pub source: PathBuf,
    /// Directory the attachments were written to.
    pub output_dir: PathBuf,
    pub extracted_data: ExtractedFields,
    pub attachments: Vec<Attachment>,
    pub summary: Option<String>,
}

impl FilingReport {
    pub fn summary_input(&self) -> SummaryInput {
        SummaryInput::new(&self.extracted_data, &self.attachments)
    }
}

// ── FilingProcessor ──────────────────────────────────────────────────────────

/// Entry point: extracts fields and attachments from one filing PDF.
///
/// ```no_run
/// use filingextract::{DirectorySink, FilingProcessor, PipelineConfig};
///
/// let processor = FilingProcessor::new(PipelineConfig::default())
///     .with_diagnostics(Box::new(DirectorySink::new("debug_output")));
/// let report = processor.process("ADT-1.pdf", "temp/attachments").unwrap();
/// println!("{} attachment(s)", report.attachments.len());
/// ```
pub struct FilingProcessor {
    config: PipelineConfig,
    fields: Option<FieldExtractor>,
    rasterizer: Box<dyn PageRasterizer>,
    engine: Box<dyn OcrEngine>,
    sink: Option<Box<dyn DiagnosticSink>>,
    summarizer: Option<Box<dyn Summarizer>>,
}

impl FilingProcessor {
    /// Processor using `pdftoppm` and `tesseract` as configured in
    /// [`PipelineConfig::ocr`].
    pub fn new(config: PipelineConfig) -> Self {
        let rasterizer = PdftoppmRasterizer::new(config.ocr.pdftoppm_binary.clone());
        let engine = TesseractEngine::new(config.ocr.tesseract_binary.clone(), &config.ocr.language);
        Self {
            config,
            fields: None,
            rasterizer: Box::new(rasterizer),
            engine: Box::new(engine),
            sink: None,
            summarizer: None,
        }
    }

    /// Replace the rasterizer and OCR engine.
    pub fn with_ocr(mut self, rasterizer: Box<dyn PageRasterizer>, engine: Box<dyn OcrEngine>) -> Self {
        self.rasterizer = rasterizer;
        self.engine = engine;
        self
    }

    /// Use a field extractor compiled for a different layout.
    pub fn with_field_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.fields = Some(extractor);
        self
    }

    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Field extraction only.
    pub fn extract_fields<P: AsRef<Path>>(&self, pdf: P) -> Result<ExtractedFields> {
        let text = text::extract_text(pdf)?;
        match &self.fields {
            Some(extractor) => Ok(extractor.extract(&text)),
            None => Ok(FieldExtractor::with_default_layout()?.extract(&text)),
        }
    }

    /// Attachment extraction only, writing straight into `output_dir`.
    pub fn extract_attachments<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        pdf: P,
        output_dir: Q,
    ) -> Result<Vec<Attachment>> {
        let mut search = EnhancementSearch::new(self.engine.as_ref(), &self.config.ocr.thresholds);
        if let Some(sink) = self.sink.as_deref() {
            search = search.with_sink(sink);
        }
        let ocr = OcrFallback::new(self.rasterizer.as_ref(), search, self.config.ocr.dpi);
        AttachmentExtractor::new(&self.config, ocr).extract(pdf, output_dir)
    }

    /// Run the whole pipeline for `pdf`.
    ///
    /// Attachments go to `output_root/<run_id>/`, so concurrent invocations
    /// sharing one root never write to the same path. Fails only when `pdf`
    /// itself cannot be opened or the summarizer fails.
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(&self, pdf: P, output_root: Q) -> Result<FilingReport> {
        let pdf = pdf.as_ref();
        let run_id = Uuid::new_v4();
        let output_dir = output_root.as_ref().join(run_id.to_string());

        info!(%run_id, pdf = %pdf.display(), "processing filing");

        let extracted_data = self.extract_fields(pdf)?;
        let attachments = self.extract_attachments(pdf, &output_dir)?;

        let mut report = FilingReport {
            run_id,
            source: pdf.to_path_buf(),
            output_dir,
            extracted_data,
            attachments,
            summary: None,
        };

        if let Some(summarizer) = &self.summarizer {
            report.summary = Some(summarizer.summarize(&report.summary_input())?);
        }

        Ok(report)
    }
}
