// Shared fixtures: in-memory PDF builder and OCR test doubles.

#![allow(dead_code)]

use filingextract::{DiagnosticSink, OcrEngine, OcrError, PageRasterizer, PageSegMode};
use image::{DynamicImage, GrayImage, Luma};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

// ── PDF builder ──────────────────────────────────────────────────────────────

/// One entry of the embedded-file table. `data: None` produces a file
/// specification without an `/EF` entry.
pub struct Embed<'a> {
    pub name: &'a str,
    pub data: Option<Vec<u8>>,
}

impl<'a> Embed<'a> {
    pub fn file(name: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            data: Some(data.into()),
        }
    }

    pub fn broken(name: &'a str) -> Self {
        Self { name, data: None }
    }
}

/// Single-page PDF whose text layer is `lines`, one text object per line.
/// With no lines the page has an empty content stream, like a scan.
pub fn build_pdf(lines: &[&str], embeds: &[Embed]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    builder.text_page(lines);
    let names = builder.name_entries(embeds);
    if !embeds.is_empty() {
        // Root node with one leaf kid, as most producers write it.
        let leaf_id = builder.doc.add_object(dictionary! { "Names" => names });
        let root_id = builder.doc.add_object(dictionary! { "Kids" => vec![leaf_id.into()] });
        builder.finish(Some(root_id.into()))
    } else {
        builder.finish(None)
    }
}

/// Filing whose embedded-file table stores the file specification inline
/// in the leaf instead of as an indirect object.
pub fn build_pdf_with_inline_spec(name: &str, data: &[u8]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    builder.text_page(&["Form ADT-1"]);
    let stream_id = builder.embedded_stream(data);
    let spec = dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal(name),
        "EF" => dictionary! { "F" => stream_id },
    };
    let names = vec![Object::string_literal(name), Object::Dictionary(spec)];
    builder.finish(Some(Object::Dictionary(dictionary! { "Names" => names })))
}

/// Filing whose name-tree root lists itself three times among its kids,
/// next to a leaf holding `embeds`.
pub fn build_pdf_with_cyclic_name_tree(embeds: &[Embed]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    builder.text_page(&["Form ADT-1"]);
    let names = builder.name_entries(embeds);
    let leaf_id = builder.doc.add_object(dictionary! { "Names" => names });
    let root_id = builder.doc.new_object_id();
    builder.doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Kids" => vec![root_id.into(), leaf_id.into(), root_id.into(), root_id.into()],
        }),
    );
    builder.finish(Some(root_id.into()))
}

/// Two-page PDF: `lines` on the first page, and a second page drawn with an
/// `Identity-H` font that has no `/ToUnicode` map, so its text cannot be
/// decoded.
pub fn build_pdf_with_undecodable_page(lines: &[&str]) -> Vec<u8> {
    let mut builder = PdfBuilder::new();
    builder.text_page(lines);
    builder.undecodable_page();
    builder.finish(None)
}

struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<Object>,
    resources_id: ObjectId,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            resources_id,
        }
    }

    fn text_page(&mut self, lines: &[&str]) {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new("Td", vec![40.into(), (800 - 12 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let resources_id = self.resources_id;
        self.add_page(operations, resources_id);
    }

    fn undecodable_page(&mut self) {
        let font_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "NotoSansCJK",
            "Encoding" => "Identity-H",
        });
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! { "F2" => font_id },
        });
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), 10.into()]),
            Operation::new("Td", vec![40.into(), 800.into()]),
            Operation::new("Tj", vec![Object::string_literal("\x00\x21")]),
            Operation::new("ET", vec![]),
        ];
        self.add_page(operations, resources_id);
    }

    fn add_page(&mut self, operations: Vec<Operation>, resources_id: ObjectId) {
        let content = Content { operations };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        self.page_ids.push(page_id.into());
    }

    fn embedded_stream(&mut self, data: &[u8]) -> ObjectId {
        self.doc
            .add_object(Stream::new(dictionary! { "Type" => "EmbeddedFile" }, data.to_vec()))
    }

    /// `[key, spec-ref, …]` for a leaf `/Names` array.
    fn name_entries(&mut self, embeds: &[Embed]) -> Vec<Object> {
        let mut names = Vec::new();
        for embed in embeds {
            let mut spec = dictionary! {
                "Type" => "Filespec",
                "F" => Object::string_literal(embed.name),
                "UF" => Object::string_literal(embed.name),
            };
            if let Some(data) = &embed.data {
                let stream_id = self.embedded_stream(data);
                spec.set("EF", dictionary! { "F" => stream_id });
            }
            let spec_id = self.doc.add_object(spec);
            names.push(Object::string_literal(embed.name));
            names.push(spec_id.into());
        }
        names
    }

    fn finish(mut self, embedded_files: Option<Object>) -> Vec<u8> {
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.page_ids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if let Some(root) = embedded_files {
            catalog.set("Names", dictionary! { "EmbeddedFiles" => root });
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

pub fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

// ── OCR doubles ──────────────────────────────────────────────────────────────

/// Returns `pages` blank bitmaps, or an error when `fail` is set.
pub struct FakeRasterizer {
    pub pages: usize,
    pub fail: bool,
}

impl FakeRasterizer {
    pub fn pages(pages: usize) -> Self {
        Self { pages, fail: false }
    }

    pub fn failing() -> Self {
        Self { pages: 0, fail: true }
    }
}

impl PageRasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf: &Path, _dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        if self.fail {
            return Err(OcrError::Rasterize("pdftoppm not installed".into()));
        }
        Ok((0..self.pages)
            .map(|_| DynamicImage::ImageLuma8(GrayImage::from_pixel(24, 24, Luma([210]))))
            .collect())
    }
}

/// Answers call *n* with `replies[n]` (empty string once exhausted) and
/// records the segmentation mode of every call.
#[derive(Clone, Default)]
pub struct ScriptedEngine {
    replies: Vec<String>,
    pub calls: Rc<Cell<usize>>,
    pub modes: Rc<RefCell<Vec<PageSegMode>>>,
}

impl ScriptedEngine {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.get()
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize(&self, _image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        self.modes.borrow_mut().push(mode);
        Ok(self.replies.get(n).cloned().unwrap_or_default())
    }
}

/// Fails every call.
pub struct BrokenEngine;

impl OcrEngine for BrokenEngine {
    fn recognize(&self, _image: &GrayImage, _mode: PageSegMode) -> Result<String, OcrError> {
        Err(OcrError::Engine("tesseract exited with status 1".into()))
    }
}

/// Records which `(page, threshold)` candidates were produced.
#[derive(Default)]
pub struct RecordingSink {
    pub candidates: RefCell<Vec<(usize, u8)>>,
    pub texts: RefCell<Vec<String>>,
}

impl DiagnosticSink for RecordingSink {
    fn candidate_image(&self, page: usize, threshold: u8, _image: &GrayImage) {
        self.candidates.borrow_mut().push((page, threshold));
    }

    fn ocr_text(&self, _source: &Path, text: &str) {
        self.texts.borrow_mut().push(text.to_string());
    }
}
