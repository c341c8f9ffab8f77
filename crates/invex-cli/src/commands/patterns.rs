//! Patterns command - inspect and check pattern libraries.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invex_core::library::default_patterns;
use invex_core::{FieldCategory, PatternDefinition, PatternLibrary};

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// List patterns in resolution order
    List(ListArgs),

    /// Compile every pattern and report the invalid ones
    Check {
        /// Pattern library JSON file (default: built-in library)
        file: Option<PathBuf>,
    },

    /// Show a single pattern definition
    Show {
        /// Pattern id
        id: u64,

        /// Pattern library JSON file (default: built-in library)
        #[arg(short, long)]
        patterns: Option<PathBuf>,
    },

    /// Write the built-in library to a JSON file as a starting point
    Export {
        /// Output path
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Pattern library JSON file (default: built-in library)
    #[arg(short, long)]
    patterns: Option<PathBuf>,

    /// Only list patterns of this category (e.g. AMOUNT, DUE_DATE)
    #[arg(long)]
    category: Option<String>,

    /// Include inactive patterns
    #[arg(long)]
    all: bool,
}

pub async fn run(args: PatternsArgs) -> anyhow::Result<()> {
    match args.command {
        PatternsCommand::List(list_args) => list_patterns(list_args),
        PatternsCommand::Check { file } => check_patterns(file),
        PatternsCommand::Show { id, patterns } => show_pattern(id, patterns),
        PatternsCommand::Export { output, force } => export_patterns(output, force),
    }
}

fn read_definitions(file: Option<&PathBuf>) -> anyhow::Result<Vec<PatternDefinition>> {
    match file {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Pattern file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(default_patterns()),
    }
}

fn list_patterns(args: ListArgs) -> anyhow::Result<()> {
    let categories: Vec<FieldCategory> = match &args.category {
        Some(name) => vec![FieldCategory::parse(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", name))?],
        None => FieldCategory::ALL.to_vec(),
    };

    let library = PatternLibrary::build(read_definitions(args.patterns.as_ref())?, args.all)?;

    println!(
        "{:>6}  {:<16} {:>8} {:>6} {:>6} {:>8}  {}",
        "ID", "CATEGORY", "PRIORITY", "WEIGHT", "ACTIVE", "USES", "NAME"
    );

    for category in categories {
        let inactive = library
            .inactive_patterns()
            .iter()
            .filter(|p| p.definition().category == category);

        for pattern in library.patterns_for(category).iter().chain(inactive) {
            let def = pattern.definition();
            println!(
                "{:>6}  {:<16} {:>8} {:>6.2} {:>6} {:>8}  {}",
                def.id,
                category.as_str(),
                def.priority,
                def.confidence_weight,
                if def.is_active { "yes" } else { "no" },
                def.usage_count,
                def.name
            );
        }
    }

    let invalid = library.invalid_patterns();
    if !invalid.is_empty() {
        println!();
        println!(
            "{} {} invalid patterns skipped; run 'invex patterns check' for details",
            style("⚠").yellow(),
            invalid.len()
        );
    }

    Ok(())
}

fn check_patterns(file: Option<PathBuf>) -> anyhow::Result<()> {
    let library = PatternLibrary::build(read_definitions(file.as_ref())?, true)?;
    let compiled = library.len() + library.inactive_patterns().len();

    if library.invalid_patterns().is_empty() {
        println!("{} All {} patterns compiled", style("✓").green(), compiled);
        return Ok(());
    }

    println!("{}", style("Invalid patterns:").red());
    for invalid in library.invalid_patterns() {
        println!(
            "  - {} ({}, {}): {}",
            invalid.pattern_id, invalid.pattern_name, invalid.category, invalid.reason
        );
    }

    anyhow::bail!(
        "{} of {} patterns are invalid",
        library.invalid_patterns().len(),
        compiled + library.invalid_patterns().len()
    );
}

fn show_pattern(id: u64, file: Option<PathBuf>) -> anyhow::Result<()> {
    let definition = read_definitions(file.as_ref())?
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| anyhow::anyhow!("Pattern not found: {}", id))?;

    println!("{}", serde_json::to_string_pretty(&definition)?);

    Ok(())
}

fn export_patterns(output: PathBuf, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "File already exists at {}. Use --force to overwrite.",
            output.display()
        );
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    let definitions = default_patterns();
    fs::write(&output, serde_json::to_string_pretty(&definitions)?)?;

    println!(
        "{} Wrote {} built-in patterns to {}",
        style("✓").green(),
        definitions.len(),
        output.display()
    );

    Ok(())
}
