//! CLI for extracting fields and attachments from a filing PDF.
//!
//! Prints a human-readable report by default, the full report as JSON with
//! `--json`, or the summarizer prompt with `--prompt`.

use clap::Parser;
use filingextract::{build_prompt, DirectorySink, FilingProcessor, FilingReport, PipelineConfig, Result};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "filingextract", version, about = "Extract fields and attachments from a filing PDF")]
struct Args {
    /// Path to the filing PDF
    pdf: PathBuf,

    /// Root directory for extracted attachments; each run gets its own subdirectory
    #[arg(short, long, default_value = "temp/attachments")]
    output_dir: PathBuf,

    /// Resolution used to rasterize pages for OCR
    #[arg(long, default_value_t = 400)]
    dpi: u32,

    /// Tesseract language code
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Write OCR candidate images and recovered text into this directory
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long, conflicts_with = "prompt")]
    json: bool,

    /// Print the prompt that would be sent to the summarizer
    #[arg(long)]
    prompt: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = PipelineConfig::default();
    config.ocr.dpi = args.dpi;
    config.ocr.language = args.lang.clone();

    let mut processor = FilingProcessor::new(config);
    if let Some(dir) = &args.debug_dir {
        processor = processor.with_diagnostics(Box::new(DirectorySink::new(dir)));
    }

    let report = processor.process(&args.pdf, &args.output_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.prompt {
        println!("{}", build_prompt(&report.summary_input())?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &FilingReport) {
    println!("🔍 Filing: {}", report.source.display());
    println!("📁 Attachments written to: {}", report.output_dir.display());
    println!("{}", "─".repeat(60));

    println!("📋 Extracted fields:");
    for (name, value) in report.extracted_data.iter() {
        let shown = if value.is_empty() { "—" } else { value };
        println!("   {name:<26} {shown}");
    }

    println!("\n📎 Attachments: {}", report.attachments.len());
    for (i, attachment) in report.attachments.iter().enumerate() {
        println!("\n📄 #{}: {}", i + 1, attachment.filename);
        println!("   🏷️  Type: {}", attachment.kind);
        if let Some(path) = &attachment.output_path {
            println!("   💾 Saved to: {}", path.display());
        }
        let preview: String = attachment.text.chars().take(120).collect();
        if !preview.trim().is_empty() {
            println!("   📝 {}", preview.replace('\n', " ").trim());
        }
    }

    if let Some(summary) = &report.summary {
        println!("\n{}\n{summary}", "─".repeat(60));
    }
}
