// Enhancement search and OCR fallback behaviour, driven by test doubles.

mod common;

use common::{BrokenEngine, FakeRasterizer, RecordingSink, ScriptedEngine};
use filingextract::{EnhancementSearch, OcrFallback, PageSegMode};
use image::{DynamicImage, GrayImage, Luma};
use std::path::Path;

const THRESHOLDS: [u8; 3] = [127, 150, 160];

fn page() -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(40, 40, |x, y| Luma([((x + y) * 3) as u8])))
}

#[test]
fn first_non_empty_candidate_wins_and_later_thresholds_are_skipped() {
    let engine = ScriptedEngine::new(&["", "text at 150", "text at 160"]);
    let sink = RecordingSink::default();
    let search = EnhancementSearch::new(&engine, &THRESHOLDS).with_sink(&sink);

    let text = search.recognize_page(0, &page()).unwrap();

    assert_eq!(text, "text at 150");
    assert_eq!(engine.call_count(), 2);
    assert_eq!(*sink.candidates.borrow(), vec![(0, 127), (0, 150)]);
    assert!(engine
        .modes
        .borrow()
        .iter()
        .all(|m| *m == PageSegMode::SingleBlock));
}

#[test]
fn whitespace_only_candidates_count_as_empty() {
    let engine = ScriptedEngine::new(&["  \n", "\t", "found"]);
    let search = EnhancementSearch::new(&engine, &THRESHOLDS);

    assert_eq!(search.recognize_page(0, &page()).unwrap(), "found");
    assert_eq!(engine.call_count(), 3);
}

#[test]
fn plain_grayscale_pass_runs_last_with_automatic_segmentation() {
    let engine = ScriptedEngine::new(&["", "", "", "raw page text"]);
    let search = EnhancementSearch::new(&engine, &THRESHOLDS);

    assert_eq!(search.recognize_page(0, &page()).unwrap(), "raw page text");
    assert_eq!(engine.call_count(), 4);
    assert_eq!(engine.modes.borrow().last(), Some(&PageSegMode::Auto));
}

#[test]
fn last_resort_result_is_accepted_even_if_empty() {
    let engine = ScriptedEngine::new(&[]);
    let search = EnhancementSearch::new(&engine, &THRESHOLDS);

    assert_eq!(search.recognize_page(0, &page()).unwrap(), "");
    assert_eq!(engine.call_count(), THRESHOLDS.len() + 1);
}

#[test]
fn pages_are_concatenated_in_order_without_separator() {
    let rasterizer = FakeRasterizer::pages(2);
    let engine = ScriptedEngine::new(&["first page", "second page"]);
    let sink = RecordingSink::default();
    let search = EnhancementSearch::new(&engine, &THRESHOLDS).with_sink(&sink);
    let fallback = OcrFallback::new(&rasterizer, search, 400);

    let text = fallback.recover_text(Path::new("scan.pdf"));

    assert_eq!(text, "first pagesecond page");
    assert_eq!(*sink.candidates.borrow(), vec![(0, 127), (1, 127)]);
    assert_eq!(*sink.texts.borrow(), vec!["first pagesecond page".to_string()]);
}

#[test]
fn rasterizer_failure_becomes_text() {
    let rasterizer = FakeRasterizer::failing();
    let engine = ScriptedEngine::new(&["never"]);
    let search = EnhancementSearch::new(&engine, &THRESHOLDS);
    let fallback = OcrFallback::new(&rasterizer, search, 400);

    let text = fallback.recover_text(Path::new("scan.pdf"));

    assert_eq!(text, "\n[OCR failed: rasterization failed: pdftoppm not installed]");
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn engine_failure_becomes_text() {
    let rasterizer = FakeRasterizer::pages(1);
    let engine = BrokenEngine;
    let search = EnhancementSearch::new(&engine, &THRESHOLDS);
    let fallback = OcrFallback::new(&rasterizer, search, 400);

    let text = fallback.recover_text(Path::new("scan.pdf"));

    assert!(text.starts_with("\n[OCR failed: OCR engine failed:"), "{text:?}");
}
