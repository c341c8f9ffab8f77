//! Subcommands and the configuration/library loading they share.

pub mod batch;
pub mod config;
pub mod patterns;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use tracing::debug;

use invex_core::{InvexConfig, PatternLibrary};

/// Load the `--config` file, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        return Ok(InvexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(InvexConfig::from_file(&default_path)?)
    } else {
        Ok(InvexConfig::default())
    }
}

/// Load the pattern library named on the command line or in the config,
/// falling back to the built-in library.
pub fn load_library(patterns: Option<&PathBuf>, config: &InvexConfig) -> anyhow::Result<Arc<PatternLibrary>> {
    let library = match patterns.or(config.library.patterns_file.as_ref()) {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Pattern file not found: {}", path.display());
            }
            debug!("Loading patterns from {}", path.display());
            PatternLibrary::from_file(path)?
        }
        None => {
            debug!("Using built-in pattern library");
            PatternLibrary::builtin()
        }
    };

    for invalid in library.invalid_patterns() {
        eprintln!(
            "{} Skipping pattern {} ({}): {}",
            style("⚠").yellow(),
            invalid.pattern_id,
            invalid.pattern_name,
            invalid.reason
        );
    }

    Ok(Arc::new(library))
}
