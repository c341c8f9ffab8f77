//! Process command - extract fields from a single invoice text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::{
    ExtractionOrchestrator, ExtractionStatus, InvoiceExtractionResult, InvoiceExtractor, InvoiceRecord,
    SourceText, TextStatus,
};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Pattern library JSON file (default: built-in library)
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Confidence reported by the text extractor that produced the input
    #[arg(long)]
    text_confidence: Option<f32>,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if let Some(confidence) = args.text_confidence {
        if !(0.0..=1.0).contains(&confidence) {
            anyhow::bail!("--text-confidence must be within [0, 1], got {}", confidence);
        }
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);

    pb.set_message("Loading patterns...");
    let library = super::load_library(args.patterns.as_ref(), &config)?;
    let orchestrator = ExtractionOrchestrator::new(library, config.extraction.clone());

    pb.set_message("Extracting invoice fields...");
    let text = fs::read_to_string(&args.input)?;
    let mut source = SourceText::new(text).with_status(TextStatus::Extracted);
    if let Some(confidence) = args.text_confidence {
        source = source.with_confidence(confidence);
    }
    let result = orchestrator.extract(&source);

    pb.finish_and_clear();

    let record = InvoiceRecord::from(&result);
    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        print_confidence(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn print_confidence(result: &InvoiceExtractionResult) {
    let status = match result.status {
        ExtractionStatus::Complete => style(result.status.to_string()).green(),
        ExtractionStatus::Partial => style(result.status.to_string()).yellow(),
        ExtractionStatus::Failed => style(result.status.to_string()).red(),
    };

    println!(
        "{} Extraction {}: confidence {:.1}%",
        style("ℹ").blue(),
        status,
        result.overall_confidence * 100.0
    );
    for entry in &result.confidence_breakdown {
        println!(
            "   {:<16} {:>6.1}%{}",
            entry.category.as_str(),
            entry.confidence * 100.0,
            if entry.required { " (required)" } else { "" }
        );
    }
    println!();
    for line in result.pattern_match_summary.lines() {
        println!("   {}", line);
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "invoice_date",
        "due_date",
        "vendor_name",
        "vendor_address",
        "subtotal_amount",
        "tax_amount",
        "total_amount",
        "currency",
        "status",
        "confidence",
        "used_pattern_ids",
    ])?;

    wtr.write_record([
        record.invoice_number.clone().unwrap_or_default(),
        record.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
        record.due_date.map(|d| d.to_string()).unwrap_or_default(),
        record.vendor_name.clone().unwrap_or_default(),
        record.vendor_address.clone().unwrap_or_default(),
        record.subtotal_amount.map(|a| a.to_string()).unwrap_or_default(),
        record.tax_amount.map(|a| a.to_string()).unwrap_or_default(),
        record.total_amount.map(|a| a.to_string()).unwrap_or_default(),
        record.currency.clone().unwrap_or_default(),
        record.status.to_string(),
        format!("{:.3}", record.confidence),
        record.used_pattern_ids.clone(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(record: &InvoiceRecord) -> String {
    fn or_dash<T: ToString>(value: &Option<T>) -> String {
        value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
    }

    let currency = record.currency.as_deref().unwrap_or("");
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", or_dash(&record.invoice_number)));
    output.push_str(&format!("Date: {}\n", or_dash(&record.invoice_date)));
    output.push('\n');

    output.push_str("Vendor:\n");
    output.push_str(&format!("  {}\n", or_dash(&record.vendor_name)));
    if let Some(address) = &record.vendor_address {
        output.push_str(&format!("  {}\n", address));
    }
    output.push('\n');

    output.push_str("Summary:\n");
    output.push_str(&format!("  Subtotal: {} {}\n", or_dash(&record.subtotal_amount), currency));
    output.push_str(&format!("  Tax:      {} {}\n", or_dash(&record.tax_amount), currency));
    output.push_str(&format!("  Total:    {} {}\n", or_dash(&record.total_amount), currency));

    if let Some(due_date) = record.due_date {
        output.push_str(&format!("\nPayment due: {}\n", due_date));
    }

    output.push_str(&format!(
        "\nStatus: {} (confidence {:.1}%)\n",
        record.status,
        record.confidence * 100.0
    ));
    let missing = record.missing_fields();
    if !missing.is_empty() {
        output.push_str(&format!("Missing: {}\n", missing.join(", ")));
    }

    output
}
