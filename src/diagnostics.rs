//! Optional diagnostic output of the OCR path.

use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Receives intermediate artifacts of the OCR fallback.
///
/// Nothing is written anywhere unless the caller attaches a sink. Both methods
/// have empty default bodies so a sink can listen to just one of them.
pub trait DiagnosticSink {
    /// Called with every enhanced candidate image, before it is recognized.
    fn candidate_image(&self, _page: usize, _threshold: u8, _image: &GrayImage) {}

    /// Called with the text recovered for a whole document.
    fn ocr_text(&self, _source: &Path, _text: &str) {}
}

/// [`DiagnosticSink`] that writes everything into one directory:
/// `page_<i>_thresh<t>.png` per candidate and `<stem>.txt` per document.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticSink for DirectorySink {
    fn candidate_image(&self, page: usize, threshold: u8, image: &GrayImage) {
        let path = self.dir.join(format!("page_{page}_thresh{threshold}.png"));
        let result = std::fs::create_dir_all(&self.dir)
            .map_err(image::ImageError::IoError)
            .and_then(|_| image.save(&path));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "could not write candidate image");
        }
    }

    fn ocr_text(&self, source: &Path, text: &str) {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".into());
        let path = self.dir.join(format!("{stem}.txt"));
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, text));
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "could not write OCR text");
        }
    }
}
