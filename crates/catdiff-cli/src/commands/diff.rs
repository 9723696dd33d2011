//! Diff command
//!
//! Usage: catdiff <CATALOG>... [--config <FILE>] [--format html|csv]

use catdiff_core::logging_facility::{init, Profile};
use catdiff_core::render::{render_csv, render_html_sequence};
use catdiff_core::{compare_sequence, Config, PairDiff};
use catdiff_store::{load_catalog, stage_catalog};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogProfile {
    Dev,
    Prod,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Catalog files or zipped catalogs, oldest first
    #[arg(required = true, num_args = 2..)]
    pub catalogs: Vec<PathBuf>,

    /// TOML policy file (default: built-in policy)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,

    /// Where zipped catalogs are unpacked (default: system temp dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Log to stderr with this profile (default: no logging)
    #[arg(long, value_enum)]
    pub log_profile: Option<LogProfile>,
}

/// Execute the diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.log_profile {
        Some(LogProfile::Dev) => init(Profile::Development),
        Some(LogProfile::Prod) => init(Profile::Production),
        None => {}
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let cache_root = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("catdiff-cache"));

    tracing::info!(catalogs = args.catalogs.len(), "comparing catalog chain");

    // Loaded one at a time as the comparison advances
    let snapshots = args.catalogs.iter().map(|path| {
        let staged = stage_catalog(path, &cache_root)?;
        load_catalog(&staged, &config)
    });
    let pairs = compare_sequence(snapshots, &config)?;

    print!("{}", render(&pairs, args.format));
    Ok(())
}

fn render(pairs: &[PairDiff], format: OutputFormat) -> String {
    match format {
        OutputFormat::Html => render_html_sequence(pairs),
        OutputFormat::Csv => pairs
            .iter()
            .map(|pair| render_csv(&pair.report))
            .collect::<Vec<_>>()
            .join("\r\n"),
    }
}
