use crate::embedded::extension_of;
use crate::file_discovery::{FileSpecDiscovery, SpecRef};
use crate::file_parsing::FileSpecParser;
use crate::ocr::OcrFallback;
use crate::{text, EmbeddedFile, ExtractError, PipelineConfig, Result};
use lopdf::Document;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ── AttachmentType ───────────────────────────────────────────────────────────

/// Terminal classification of one embedded file. Exactly one per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    /// PDF with a usable text layer.
    TextPdf,
    /// PDF without a text layer whose pages OCR read text from.
    ScannedImagePdf,
    /// PDF with neither a text layer nor OCR-readable content.
    EmptyPdf,
    /// `.pdf` file that could not be parsed.
    InvalidPdf,
    /// Plain-text file.
    TextTxt,
    /// `.txt` file that could not be read.
    InvalidTxt,
    /// Allowlisted extension without a text extractor.
    Unsupported,
    /// Processing the file failed; `text` describes why.
    ExtractionError,
}

impl AttachmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentType::TextPdf => "text_pdf",
            AttachmentType::ScannedImagePdf => "scanned_image_pdf",
            AttachmentType::EmptyPdf => "empty_pdf",
            AttachmentType::InvalidPdf => "invalid_pdf",
            AttachmentType::TextTxt => "text_txt",
            AttachmentType::InvalidTxt => "invalid_txt",
            AttachmentType::Unsupported => "unsupported",
            AttachmentType::ExtractionError => "extraction_error",
        }
    }
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Attachment ───────────────────────────────────────────────────────────────

/// Result of processing one embedded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Filename as declared in the container.
    pub filename: String,

    /// Where the file was written; `None` when processing failed.
    pub output_path: Option<PathBuf>,

    /// Recovered text, cut to [`PipelineConfig::max_text_chars`] characters.
    pub text: String,

    #[serde(rename = "type")]
    pub kind: AttachmentType,
}

/// First `max_chars` characters of `text`.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

// ── AttachmentExtractor ──────────────────────────────────────────────────────

/// Extracts, stores and classifies every allowlisted embedded file of a PDF.
pub struct AttachmentExtractor<'a> {
    config: &'a PipelineConfig,
    ocr: OcrFallback<'a>,
}

impl<'a> AttachmentExtractor<'a> {
    pub fn new(config: &'a PipelineConfig, ocr: OcrFallback<'a>) -> Self {
        Self { config, ocr }
    }

    /// Process every embedded file of `pdf`, writing them into `output_dir`.
    ///
    /// Returns one record per embedded file whose extension is allowlisted,
    /// in name-tree order. Only a failure to open `pdf` itself is returned as
    /// an error; anything that goes wrong with a single attachment becomes an
    /// [`AttachmentType::ExtractionError`] record.
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(&self, pdf: P, output_dir: Q) -> Result<Vec<Attachment>> {
        let pdf = pdf.as_ref();
        let output_dir = output_dir.as_ref();
        let document = Document::load(pdf)
            .map_err(|e| ExtractError::DocumentOpen(format!("{}: {e}", pdf.display())))?;

        let specs = FileSpecDiscovery::new(&document).collect_file_specs();
        let parser = FileSpecParser::new(&document);
        let mut attachments = Vec::new();

        for (index, (key, spec)) in specs.into_iter().enumerate() {
            let filename = parser.resolve_filename(&key, spec, &format!("attachment_{index}"));

            let allowed = extension_of(&filename).is_some_and(|ext| self.config.allows_extension(&ext));
            if !allowed {
                debug!(%filename, "skipping attachment with disallowed extension");
                continue;
            }

            let attachment = match self.process_single_file(&parser, &filename, spec, output_dir) {
                Ok(attachment) => attachment,
                Err(e) => {
                    warn!(%filename, error = %e, "attachment extraction failed");
                    Attachment {
                        filename,
                        output_path: None,
                        text: format!("Could not extract attachment {index}: {e}"),
                        kind: AttachmentType::ExtractionError,
                    }
                }
            };
            attachments.push(attachment);
        }

        info!(pdf = %pdf.display(), count = attachments.len(), "attachments extracted");
        Ok(attachments)
    }

    /// Read, store, classify and truncate one embedded file.
    fn process_single_file<'d>(
        &self,
        parser: &FileSpecParser<'d>,
        filename: &str,
        spec: SpecRef<'d>,
        output_dir: &Path,
    ) -> Result<Attachment> {
        let file = parser.parse_file_spec(filename, spec)?;
        debug!(
            %filename,
            bytes = file.data.len(),
            declared_size = ?file.metadata.size,
            mime = ?file.metadata.mime_type,
            "embedded file read"
        );
        self.validate_file_size(&file)?;

        let output_path = file.save_to_disk(output_dir)?;
        let (kind, text) = self.classify(&file, &output_path);
        debug!(%filename, %kind, chars = text.chars().count(), "attachment classified");

        Ok(Attachment {
            filename: file.filename,
            text: truncate_chars(&text, self.config.max_text_chars),
            output_path: Some(output_path),
            kind,
        })
    }

    /// Validate that the file size doesn't exceed the configured maximum.
    fn validate_file_size(&self, file: &EmbeddedFile) -> Result<()> {
        if let Some(limit) = self.config.max_embedded_file_size {
            if file.data.len() > limit {
                return Err(ExtractError::FileSizeExceeded {
                    size: file.data.len(),
                    limit,
                });
            }
        }
        Ok(())
    }

    fn classify(&self, file: &EmbeddedFile, stored: &Path) -> (AttachmentType, String) {
        match file.extension().as_deref() {
            Some("pdf") => self.classify_pdf(stored),
            Some("txt") => match std::fs::read(stored) {
                Ok(bytes) => (AttachmentType::TextTxt, String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => {
                    debug!(path = %stored.display(), error = %e, "text attachment unreadable");
                    (AttachmentType::InvalidTxt, String::new())
                }
            },
            _ => (AttachmentType::Unsupported, String::new()),
        }
    }

    fn classify_pdf(&self, stored: &Path) -> (AttachmentType, String) {
        let direct = match text::extract_text(stored) {
            Ok(direct) => direct,
            Err(e) => {
                debug!(path = %stored.display(), error = %e, "embedded PDF did not parse");
                return (AttachmentType::InvalidPdf, String::new());
            }
        };

        if !direct.trim().is_empty() {
            return (AttachmentType::TextPdf, direct);
        }

        let recovered = self.ocr.recover_text(stored);
        if recovered.trim().is_empty() {
            (AttachmentType::EmptyPdf, recovered)
        } else {
            (AttachmentType::ScannedImagePdf, recovered)
        }
    }
}
