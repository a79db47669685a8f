//! Reads the text layer of a PDF.

use crate::{ExtractError, Result};
use lopdf::Document;
use std::path::Path;
use tracing::warn;

/// Load the PDF at `path` and return the text layer of every page,
/// concatenated in page order.
///
/// A document that cannot be loaded is reported as
/// [`ExtractError::DocumentOpen`]; the caller decides whether that is fatal.
/// A page whose text cannot be decoded contributes nothing.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let document = Document::load(path)
        .map_err(|e| ExtractError::DocumentOpen(format!("{}: {e}", path.display())))?;
    Ok(extract_document_text(&document))
}

/// Same as [`extract_text`] for a document that is already loaded.
pub fn extract_document_text(document: &Document) -> String {
    let mut text = String::new();

    // get_pages() is a BTreeMap keyed by page number, so this is page order.
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page = *page_number, error = %e, "skipping page with undecodable text"),
        }
    }

    text
}
