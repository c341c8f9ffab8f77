//! Batch processing command for multiple invoice text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::{stream, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use invex_core::{ExtractionOrchestrator, InvoiceExtractor, InvoiceRecord, SourceText, TextStatus};

use super::process::{format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Pattern library JSON file (default: built-in library)
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Write the pattern usage increments of this batch to a JSON file
    #[arg(long)]
    usage_out: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let library = super::load_library(args.patterns.as_ref(), &config)?;
    let orchestrator = ExtractionOrchestrator::new(library.clone(), config.extraction.clone());

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results: Vec<FileResult> = stream::iter(files)
        .map(|path| {
            let orchestrator = orchestrator.clone();
            let pb = overall_pb.clone();
            async move {
                let file_start = Instant::now();
                let worker_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || process_single_file(&worker_path, &orchestrator))
                    .await
                    .unwrap_or_else(|e| Err(anyhow::anyhow!("Worker failed: {}", e)));
                pb.inc(1);

                let processing_time_ms = file_start.elapsed().as_millis() as u64;
                match outcome {
                    Ok(record) => FileResult {
                        path,
                        record: Some(record),
                        error: None,
                        processing_time_ms,
                    },
                    Err(e) => FileResult {
                        path,
                        record: None,
                        error: Some(e.to_string()),
                        processing_time_ms,
                    },
                }
            }
        })
        .buffer_unordered(args.jobs.max(1))
        .collect()
        .await;

    overall_pb.finish_with_message("Complete");
    results.sort_by(|a, b| a.path.cmp(&b.path));

    for result in &results {
        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
    }

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(record) = &result.record {
                let output_name = result.path.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
                let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    if let Some(usage_path) = &args.usage_out {
        let deltas = library.drain_usage();
        fs::write(usage_path, serde_json::to_string_pretty(&deltas)?)?;
        println!(
            "{} Usage for {} patterns written to {}",
            style("✓").green(),
            deltas.len(),
            usage_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(path: &Path, orchestrator: &ExtractionOrchestrator) -> anyhow::Result<InvoiceRecord> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        anyhow::bail!("File contains no text");
    }

    let result = orchestrator.extract(&SourceText::new(text).with_status(TextStatus::Extracted));
    debug!(
        "{}: {} with confidence {:.3}",
        path.display(),
        result.status,
        result.overall_confidence
    );

    Ok(InvoiceRecord::from(&result))
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "invoice_date",
        "vendor_name",
        "total_amount",
        "currency",
        "confidence",
        "used_pattern_ids",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(record) = &result.record {
            wtr.write_record([
                filename,
                &record.status.to_string(),
                record.invoice_number.as_deref().unwrap_or(""),
                &record.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
                record.vendor_name.as_deref().unwrap_or(""),
                &record.total_amount.map(|a| a.to_string()).unwrap_or_default(),
                record.currency.as_deref().unwrap_or(""),
                &format!("{:.2}", record.confidence),
                &record.used_pattern_ids,
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "ERROR",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
