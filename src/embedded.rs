use std::path::{Path, PathBuf};

// ── EmbeddedFile ─────────────────────────────────────────────────────────────

/// A file that was embedded inside a PDF document.
#[derive(Debug, Clone)]
pub struct EmbeddedFile {
    /// The filename as declared in the PDF file specification object
    /// (Unicode name preferred over ASCII name when both are present).
    /// Not guaranteed to be unique or safe to use as a path.
    pub filename: String,

    /// The raw, decompressed file content.
    pub data: Vec<u8>,

    /// Optional metadata read from the PDF file specification and stream
    /// parameter dictionaries.
    pub metadata: EmbeddedFileMetadata,
}

impl EmbeddedFile {
    /// Write this file into `output_dir`, creating the directory if necessary,
    /// and return the path it was written to.
    ///
    /// Only the final component of the declared filename is used, so a name
    /// such as `../../etc/passwd.txt` lands in `output_dir/passwd.txt`. A file
    /// with the same name as an earlier one overwrites it.
    ///
    /// ```
    /// # use filingextract::{EmbeddedFile, EmbeddedFileMetadata};
    /// # let dir = tempfile::tempdir().unwrap();
    /// let file = EmbeddedFile { filename: "../notes.txt".into(), data: b"ok".to_vec(), metadata: Default::default() };
    /// let path = file.save_to_disk(dir.path()).unwrap();
    /// assert_eq!(path, dir.path().join("notes.txt"));
    /// ```
    pub fn save_to_disk<P: AsRef<Path>>(&self, output_dir: P) -> std::io::Result<PathBuf> {
        let dir = output_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let dest = dir.join(self.storage_name());
        std::fs::write(&dest, &self.data)?;
        Ok(dest)
    }

    /// The name used on disk: the last path component of the declared
    /// filename, or `"attachment"` when there is none.
    pub fn storage_name(&self) -> String {
        storage_name(&self.filename)
    }

    /// Returns the file extension (lowercase), or `None` if the filename has
    /// no extension.
    ///
    /// ```
    /// # use filingextract::{EmbeddedFile, EmbeddedFileMetadata};
    /// # let file = EmbeddedFile { filename: "Consent Letter.PDF".into(), data: vec![], metadata: Default::default() };
    /// assert_eq!(file.extension().as_deref(), Some("pdf"));
    /// ```
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.filename)
    }
}

/// Lowercase extension of a declared filename.
pub(crate) fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub(crate) fn storage_name(filename: &str) -> String {
    filename
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .unwrap_or("attachment")
        .to_string()
}

// ── EmbeddedFileMetadata ──────────────────────────────────────────────────────

/// Metadata associated with an [`EmbeddedFile`], sourced from the PDF file
/// specification dictionary and the embedded stream's `/Params` sub-dictionary.
///
/// All fields are optional: a conforming PDF need not populate them.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedFileMetadata {
    /// MIME type declared in the stream's `/Subtype` entry
    /// (e.g. `"application/pdf"`).
    pub mime_type: Option<String>,

    /// Human-readable description from the `/Desc` entry.
    pub description: Option<String>,

    /// Uncompressed file size in bytes, from `/Params/Size`.
    pub size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_name_strips_directories() {
        assert_eq!(storage_name("notes.txt"), "notes.txt");
        assert_eq!(storage_name("a/b/c.pdf"), "c.pdf");
        assert_eq!(storage_name("..\\evil.txt"), "evil.txt");
        assert_eq!(storage_name("dir/.."), "dir");
        assert_eq!(storage_name(".."), "attachment");
        assert_eq!(storage_name(""), "attachment");
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of("Board Resolution.PDF").as_deref(), Some("pdf"));
        assert_eq!(extension_of("readme"), None);
    }
}
