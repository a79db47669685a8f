use crate::pdf_utils;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

/// Value of one embedded-file table entry.
///
/// Producers usually store the file specification as an indirect object, but
/// an inline dictionary is equally valid. Values that are neither are kept so
/// the caller can report them instead of losing the entry.
#[derive(Debug, Clone, Copy)]
pub enum SpecRef<'a> {
    Indirect(ObjectId),
    Direct(&'a Dictionary),
    Invalid(&'a Object),
}

/// Finds the entries of a document's embedded-file table.
///
/// The table is the `/Names/EmbeddedFiles` name tree in the document catalog.
/// Entries are returned in tree order as `(key, spec)` pairs; the key is the
/// name-tree string, which is usually (but not always) the filename, and is
/// empty when the tree stores something other than a string there.
pub struct FileSpecDiscovery<'a> {
    document: &'a Document,
}

impl<'a> FileSpecDiscovery<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Collect `(key, SpecRef)` pairs for every embedded-file specification.
    ///
    /// A malformed or missing name tree yields an empty list rather than an
    /// error: a document without attachments is the common case.
    pub fn collect_file_specs(&self) -> Vec<(String, SpecRef<'a>)> {
        let Some(ef_val) = self.embedded_files_root() else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        let specs = if let Ok(ef_id) = ef_val.as_reference() {
            self.walk_name_tree(ef_id, &mut visited)
        } else if let Ok(ef_dict) = ef_val.as_dict() {
            self.read_node(ef_dict, &mut visited)
        } else {
            Vec::new()
        };

        debug!(count = specs.len(), "embedded file specifications found");
        specs
    }

    /// Catalog → /Names → /EmbeddedFiles, with /Names inline or referenced.
    fn embedded_files_root(&self) -> Option<&'a Object> {
        let catalog = self.document.catalog().ok()?;
        let names_val = catalog.get(b"Names").ok()?;
        let names_dict = match names_val.as_reference() {
            Ok(id) => self.document.get_object(id).ok()?.as_dict().ok()?,
            Err(_) => names_val.as_dict().ok()?,
        };
        names_dict.get(b"EmbeddedFiles").ok()
    }

    /// Recursively walk a PDF name tree, collecting entries from leaf nodes.
    /// Every node is read at most once, so shared or cyclic `/Kids` are
    /// harmless.
    fn walk_name_tree(&self, node_id: ObjectId, visited: &mut HashSet<ObjectId>) -> Vec<(String, SpecRef<'a>)> {
        if !visited.insert(node_id) {
            debug!(?node_id, "name tree node already visited");
            return Vec::new();
        }

        match self.document.get_object(node_id).and_then(Object::as_dict) {
            Ok(node_dict) => self.read_node(node_dict, visited),
            Err(_) => Vec::new(),
        }
    }

    fn read_node(&self, node_dict: &'a Dictionary, visited: &mut HashSet<ObjectId>) -> Vec<(String, SpecRef<'a>)> {
        let mut out = Vec::new();

        // Leaf node: has a /Names array of [key, value, key, value, …]
        if let Ok(arr) = node_dict.get(b"Names").and_then(Object::as_array) {
            out.extend(Self::process_names_array(arr));
        }

        // Intermediate node: has a /Kids array of references
        if let Ok(kids) = node_dict.get(b"Kids").and_then(Object::as_array) {
            for kid in kids {
                if let Ok(kid_id) = kid.as_reference() {
                    out.extend(self.walk_name_tree(kid_id, visited));
                }
            }
        }

        out
    }

    /// Process a names array into `(key, SpecRef)` pairs. No pair is dropped.
    fn process_names_array(names_array: &'a [Object]) -> Vec<(String, SpecRef<'a>)> {
        names_array
            .chunks_exact(2)
            .map(|pair| {
                let key = pair[0]
                    .as_str()
                    .map(pdf_utils::decode_text_string)
                    .unwrap_or_default();
                let spec = match &pair[1] {
                    Object::Reference(id) => SpecRef::Indirect(*id),
                    Object::Dictionary(dict) => SpecRef::Direct(dict),
                    other => SpecRef::Invalid(other),
                };
                (key, spec)
            })
            .collect()
    }
}
