//! Page rasterization.

use crate::OcrError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Renders every page of a PDF to a bitmap.
pub trait PageRasterizer {
    /// Render all pages of `pdf` at `dpi`, in page order.
    fn rasterize(&self, pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>, OcrError>;
}

/// [`PageRasterizer`] backed by poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf: &Path, dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        let temp_dir = tempfile::tempdir()?;
        let output_prefix = temp_dir.path().join("page");

        info!(pdf = %pdf.display(), dpi, "rasterizing pages");

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(pdf)
            .arg(&output_prefix)
            .output()
            .map_err(|e| OcrError::Rasterize(format!("failed to run {}: {e}", self.binary.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Rasterize(format!("pdftoppm failed: {}", stderr.trim())));
        }

        // pdftoppm pads page numbers to a common width, so name order is page order.
        let mut image_files: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        image_files.sort();

        if image_files.is_empty() {
            return Err(OcrError::Rasterize("pdftoppm produced no images".into()));
        }

        debug!(pages = image_files.len(), "pages rendered");

        image_files
            .iter()
            .map(|path| image::open(path).map_err(OcrError::from))
            .collect()
    }
}
