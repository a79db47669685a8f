//! # filingextract
//!
//! Pulls structured data out of a fixed-layout regulatory filing PDF
//! (an auditor appointment notice) and out of every file embedded in it.
//!
//! ## What this crate does
//!
//! 1. **Read the text layer** — concatenates the text of every page.
//! 2. **Extract fields** — applies a table of context-anchored rules written
//!    against the form's layout and returns 13 named values.
//! 3. **Extract attachments** — walks the embedded-file name tree, writes each
//!    allowed file to disk and classifies it (`text_pdf`, `scanned_image_pdf`,
//!    `empty_pdf`, `invalid_pdf`, `text_txt`, `invalid_txt`, `unsupported`,
//!    `extraction_error`).
//! 4. **OCR fallback** — for embedded PDFs without a text layer, rasterizes
//!    each page and sweeps a few binarize + sharpen settings until the OCR
//!    engine returns text.
//!
//! ## Quick example
//!
//! ```no_run
//! use filingextract::{FilingProcessor, PipelineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let processor = FilingProcessor::new(PipelineConfig::default());
//! let report = processor.process("ADT-1.pdf", "temp/attachments")?;
//!
//! println!("Company : {}", report.extracted_data.company_name);
//! for attachment in &report.attachments {
//!     println!("  {} — {}", attachment.filename, attachment.kind);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

mod attachments;
mod diagnostics;
mod embedded;
mod fields;
mod file_discovery;
mod file_parsing;
mod ocr;
mod pdf_utils;
mod pipeline;
mod raster;
mod summary;
mod text;

pub use attachments::{Attachment, AttachmentExtractor, AttachmentType};
pub use diagnostics::{DiagnosticSink, DirectorySink};
pub use embedded::{EmbeddedFile, EmbeddedFileMetadata};
pub use fields::{extract_fields_from_pdf, ExtractedFields, Field, FieldExtractor, LayoutAnchors};
pub use ocr::{EnhancementSearch, OcrEngine, OcrFallback, PageSegMode, TesseractEngine};
pub use pipeline::{FilingProcessor, FilingReport};
pub use raster::{PageRasterizer, PdftoppmRasterizer};
pub use summary::{build_prompt, AttachmentSummary, Summarizer, SummaryInput};
pub use text::{extract_document_text, extract_text};

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`FilingProcessor`] and [`AttachmentExtractor`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Lowercase extensions (without the dot) of embedded files that get a
    /// record. Everything else is skipped silently.
    pub allowed_extensions: Vec<String>,

    /// Recovered attachment text is cut to this many characters.
    pub max_text_chars: usize,

    /// If set, an embedded file larger than this many bytes becomes an
    /// `extraction_error` record instead of being written to disk.
    pub max_embedded_file_size: Option<usize>,

    /// Settings for the rasterize + OCR fallback.
    pub ocr: OcrConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["pdf".into(), "txt".into()],
            max_text_chars: 1000,
            max_embedded_file_size: None,
            ocr: OcrConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Returns `true` when `ext` is on the allowlist (case-insensitive).
    pub fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Settings for page rasterization and the OCR enhancement search.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Resolution pages are rendered at before OCR.
    pub dpi: u32,

    /// Binarization thresholds tried in order; the first one that yields
    /// text wins.
    pub thresholds: Vec<u8>,

    /// Tesseract language code.
    pub language: String,

    /// Path or name of the `tesseract` executable.
    pub tesseract_binary: PathBuf,

    /// Path or name of the `pdftoppm` executable (poppler-utils).
    pub pdftoppm_binary: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: 400,
            thresholds: vec![127, 150, 160],
            language: "eng".into(),
            tesseract_binary: PathBuf::from("tesseract"),
            pdftoppm_binary: PathBuf::from("pdftoppm"),
        }
    }
}

// ── Error types ──────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A filesystem I/O error occurred (e.g. when writing an attachment).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The supplied path is not a readable PDF document.
    #[error("Cannot open PDF document: {0}")]
    DocumentOpen(String),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),

    /// One embedded file could not be read or decoded.
    #[error("Failed to extract embedded file '{0}': {1}")]
    ExtractionError(String, String),

    /// An embedded file exceeds the configured `max_embedded_file_size`.
    #[error("Embedded file is {size} bytes, limit is {limit}")]
    FileSizeExceeded { size: usize, limit: usize },

    /// A field extraction rule failed to compile.
    #[error("Invalid field pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The external summarizer failed.
    #[error("Summary generation failed: {0}")]
    Summary(String),

    /// A report or summary payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the rasterize + OCR path. The fallback engine turns these
/// into text, so they never reach the attachment classification.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Pages could not be rendered to bitmaps.
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// The OCR engine could not be run or exited with an error.
    #[error("OCR engine failed: {0}")]
    Engine(String),

    /// A rendered page could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Temporary file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
