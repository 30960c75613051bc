//! gwas-rs: Genetic association analysis for the collaboration portal.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gwas",
    version,
    about = "GWAS-RS: single-dataset genetic association analysis",
    long_about = "Turns an uploaded sample-by-marker genotype table into QC metrics,\n\
                   per-marker association statistics (chi-square or regression),\n\
                   and Manhattan/QQ plot coordinates."
)]
struct Cli {
    /// Number of threads to use
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: QC, descriptive stats, association, plots
    Analyze(commands::analyze::AnalyzeArgs),

    /// Parse the upload and report quality-control metrics only
    Qc(commands::qc::QcArgs),

    /// Parse the upload and report per-marker descriptive stats only
    Stats(commands::stats::StatsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Set up thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .ok();

    tracing::info!("GWAS-RS v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} threads", cli.threads);

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Qc(args) => commands::qc::run(args),
        Commands::Stats(args) => commands::stats::run(args),
    }
}
