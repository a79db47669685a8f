use crate::file_discovery::SpecRef;
use crate::{pdf_utils, EmbeddedFile, EmbeddedFileMetadata, ExtractError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Reads file specifications and the embedded data streams they point to.
///
/// Filename resolution and data decoding are separate steps: the filename
/// decides whether a file is wanted at all, and only wanted files are
/// decoded.
pub struct FileSpecParser<'a> {
    document: &'a Document,
}

impl<'a> FileSpecParser<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Create an extraction error with consistent formatting.
    fn extraction_error(name: &str, message: &str) -> ExtractError {
        ExtractError::ExtractionError(name.into(), message.into())
    }

    /// Get object from document and convert to dictionary with error context.
    fn get_dict_object(&self, obj_id: ObjectId, name: &str, context: &str) -> Result<&'a Dictionary> {
        self.document
            .get_object(obj_id)?
            .as_dict()
            .map_err(|_| Self::extraction_error(name, context))
    }

    /// Return the best available filename for a file specification:
    /// Unicode (`/UF`) > ASCII (`/F`) > `key` > `fallback`.
    pub fn resolve_filename(&self, key: &str, spec: SpecRef<'a>, fallback: &str) -> String {
        let declared = self.spec_dictionary(spec, key).ok().and_then(|spec| {
            [b"UF" as &[u8], b"F"]
                .into_iter()
                .find_map(|k| pdf_utils::extract_string_from_dict(spec, k))
        });

        match declared {
            Some(name) => name,
            None if !key.is_empty() => key.to_string(),
            None => fallback.to_string(),
        }
    }

    /// Parse a file-specification object and return an [`EmbeddedFile`] with
    /// content and metadata.
    ///
    /// Layout of a file specification (PDF spec §7.11.3):
    ///
    /// ```text
    /// <<
    ///   /Type  /Filespec
    ///   /F     (ascii filename)
    ///   /UF    (unicode filename)          ← preferred
    ///   /Desc  (description)
    ///   /EF    <<
    ///              /F   <stream-ref>       ← the actual data stream
    ///              /UF  <stream-ref>       ← alternative key, same stream
    ///          >>
    /// >>
    /// ```
    pub fn parse_file_spec(&self, filename: &str, spec: SpecRef<'a>) -> Result<EmbeddedFile> {
        let spec_dict = self.spec_dictionary(spec, filename)?;
        let ef_dict = self.resolve_ef_dictionary(spec_dict, filename)?;
        let stream = self.extract_embedded_stream(ef_dict, filename)?;

        // Unfiltered streams report an error from decompressed_content();
        // their raw content is the file.
        let data = if stream.dict.get(b"Filter").is_ok() {
            stream
                .decompressed_content()
                .map_err(|e| Self::extraction_error(filename, &format!("cannot decode stream: {e}")))?
        } else {
            stream.content.clone()
        };

        Ok(EmbeddedFile {
            filename: filename.to_string(),
            data,
            metadata: Self::read_metadata(spec_dict, &stream.dict),
        })
    }

    /// The file specification dictionary, stored inline or as an object.
    fn spec_dictionary(&self, spec: SpecRef<'a>, name: &str) -> Result<&'a Dictionary> {
        match spec {
            SpecRef::Indirect(id) => self.get_dict_object(id, name, "file spec is not a dictionary"),
            SpecRef::Direct(dict) => Ok(dict),
            SpecRef::Invalid(object) => {
                Err(Self::extraction_error(name, &format!("file spec is not a dictionary: {object:?}")))
            }
        }
    }

    /// Resolve the /EF dictionary, handling both inline and reference cases.
    fn resolve_ef_dictionary(&self, spec_dict: &'a Dictionary, name: &str) -> Result<&'a Dictionary> {
        let ef_val = spec_dict
            .get(b"EF")
            .map_err(|_| Self::extraction_error(name, "missing /EF entry"))?;

        if let Ok(ef_id) = ef_val.as_reference() {
            // Some producers store /EF as a reference.
            self.get_dict_object(ef_id, name, "/EF reference is not a dict")
        } else {
            ef_val
                .as_dict()
                .map_err(|_| Self::extraction_error(name, "/EF is not a dictionary"))
        }
    }

    /// Extract the embedded file stream from the EF dictionary.
    fn extract_embedded_stream(&self, ef_dict: &Dictionary, name: &str) -> Result<&'a Stream> {
        // /UF preferred over /F (unicode vs. ASCII path)
        let stream_ref = ef_dict
            .get(b"UF")
            .or_else(|_| ef_dict.get(b"F"))
            .map_err(|_| Self::extraction_error(name, "/EF has neither /F nor /UF"))?;

        let stream_id = stream_ref
            .as_reference()
            .map_err(|_| Self::extraction_error(name, "/EF stream entry is not a reference"))?;

        self.document
            .get_object(stream_id)?
            .as_stream()
            .map_err(|_| Self::extraction_error(name, "embedded stream object is not a stream"))
    }

    /// Read optional metadata from the file specification dictionary and the
    /// embedded stream's dictionary.
    fn read_metadata(spec_dict: &Dictionary, stream_dict: &Dictionary) -> EmbeddedFileMetadata {
        let mime_type = stream_dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .ok()
            // PDF names escape '/' as '#2F'
            .map(|n| String::from_utf8_lossy(n).replace("#2F", "/").replace("#2f", "/"));

        let size = stream_dict
            .get(b"Params")
            .and_then(Object::as_dict)
            .and_then(|params| params.get(b"Size"))
            .and_then(Object::as_i64)
            .ok()
            .and_then(|n| usize::try_from(n).ok());

        EmbeddedFileMetadata {
            mime_type,
            description: pdf_utils::extract_string_from_dict(spec_dict, b"Desc"),
            size,
        }
    }
}
