//! catdiff CLI
//!
//! Command-line interface for comparing successive catalog versions

use clap::Parser;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "catdiff")]
#[command(about = "catdiff - Report what changed between catalog versions", long_about = None)]
struct Cli {
    #[command(flatten)]
    diff: commands::diff::DiffArgs,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::diff::execute(cli.diff) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
