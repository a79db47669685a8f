//! OCR fallback for PDFs without a text layer.
//!
//! [`OcrFallback`] rasterizes a document and hands each page to
//! [`EnhancementSearch`], which tries a few binarize + sharpen variants of the
//! page until the [`OcrEngine`] reads something from one of them.

use crate::diagnostics::DiagnosticSink;
use crate::raster::PageRasterizer;
use crate::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::filter3x3;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// 3×3 sharpening kernel applied after binarization.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

// ── Engine capability ────────────────────────────────────────────────────────

/// Tesseract page segmentation modes used by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    /// Fully automatic page segmentation (`--psm 3`).
    Auto,
    /// Assume a single uniform block of text (`--psm 6`).
    SingleBlock,
}

impl PageSegMode {
    pub fn as_arg(self) -> &'static str {
        match self {
            PageSegMode::Auto => "3",
            PageSegMode::SingleBlock => "6",
        }
    }
}

/// Recognizes text in a bitmap.
pub trait OcrEngine {
    fn recognize(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError>;
}

/// [`OcrEngine`] backed by the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new<P: Into<PathBuf>>(binary: P, language: &str) -> Self {
        Self {
            binary: binary.into(),
            language: language.to_string(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError> {
        let input = tempfile::Builder::new().suffix(".png").tempfile()?;
        image.save(input.path())?;

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(mode.as_arg())
            .output()
            .map_err(|e| OcrError::Engine(format!("failed to run {}: {e}", self.binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

// ── Image enhancement ────────────────────────────────────────────────────────

/// Binarize `gray`: pixels brighter than the effective level become white,
/// the rest black. The effective level is the larger of `threshold` and the
/// image's Otsu level, so a candidate never cuts below what the histogram
/// itself separates.
pub(crate) fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let level = threshold.max(otsu_level(gray));
    let mut out = gray.clone();
    for Luma([value]) in out.pixels_mut() {
        *value = if *value > level { 255 } else { 0 };
    }
    out
}

pub(crate) fn sharpen(image: &GrayImage) -> GrayImage {
    filter3x3::<_, f32, u8>(image, &SHARPEN_KERNEL)
}

// ── EnhancementSearch ────────────────────────────────────────────────────────

/// Searches enhancement settings for one page.
///
/// Thresholds are tried in the given order; the first candidate whose text is
/// non-blank is returned and the remaining thresholds are never evaluated. If
/// none yields text, the plain grayscale page is recognized once more with
/// automatic segmentation and that result is returned as-is.
pub struct EnhancementSearch<'a> {
    engine: &'a dyn OcrEngine,
    thresholds: &'a [u8],
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> EnhancementSearch<'a> {
    pub fn new(engine: &'a dyn OcrEngine, thresholds: &'a [u8]) -> Self {
        Self {
            engine,
            thresholds,
            sink: None,
        }
    }

    /// Offer every candidate image to `sink`.
    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn recognize_page(&self, page: usize, image: &DynamicImage) -> Result<String, OcrError> {
        let gray = image.to_luma8();

        for &threshold in self.thresholds {
            let candidate = sharpen(&binarize(&gray, threshold));
            if let Some(sink) = self.sink {
                sink.candidate_image(page, threshold, &candidate);
            }

            let text = self.engine.recognize(&candidate, PageSegMode::SingleBlock)?;
            if !text.trim().is_empty() {
                debug!(page, threshold, chars = text.len(), "candidate accepted");
                return Ok(text);
            }
            debug!(page, threshold, "candidate yielded no text");
        }

        debug!(page, "no candidate yielded text, recognizing plain grayscale");
        self.engine.recognize(&gray, PageSegMode::Auto)
    }
}

// ── OcrFallback ──────────────────────────────────────────────────────────────

/// Recovers text from every page of a PDF by rasterizing and recognizing it.
pub struct OcrFallback<'a> {
    rasterizer: &'a dyn PageRasterizer,
    search: EnhancementSearch<'a>,
    dpi: u32,
    sink: Option<&'a dyn DiagnosticSink>,
}

impl<'a> OcrFallback<'a> {
    pub fn new(rasterizer: &'a dyn PageRasterizer, search: EnhancementSearch<'a>, dpi: u32) -> Self {
        Self {
            rasterizer,
            sink: search.sink,
            search,
            dpi,
        }
    }

    /// Text of all pages concatenated in page order.
    ///
    /// Never fails: if rasterization or recognition breaks, the text read so
    /// far is kept and `"\n[OCR failed: <reason>]"` is appended.
    pub fn recover_text(&self, pdf: &Path) -> String {
        let mut text = String::new();

        if let Err(e) = self.recover_into(pdf, &mut text) {
            warn!(pdf = %pdf.display(), error = %e, "OCR failed");
            text.push_str(&format!("\n[OCR failed: {e}]"));
        }

        if let Some(sink) = self.sink {
            sink.ocr_text(pdf, &text);
        }
        text
    }

    fn recover_into(&self, pdf: &Path, text: &mut String) -> Result<(), OcrError> {
        let pages = self.rasterizer.rasterize(pdf, self.dpi)?;
        info!(pdf = %pdf.display(), pages = pages.len(), "running OCR");

        for (index, page) in pages.iter().enumerate() {
            text.push_str(&self.search.recognize_page(index, page)?);
        }
        Ok(())
    }
}
