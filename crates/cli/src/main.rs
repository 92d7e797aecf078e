use clap::{Parser, Subcommand};

mod commands;

use commands::{AnalyzeArgs, CompareArgs, SettingsArgs, SummaryArgs};

#[derive(Parser)]
#[command(name = "n1")]
#[command(
    about = "Baseline vs. intervention analysis for N-of-1 self-experiments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare one metric before and after an intervention
    Analyze(AnalyzeArgs),
    /// Compare several metrics at once
    Compare(CompareArgs),
    /// Show or change the analysis thresholds
    Settings(SettingsArgs),
    /// List interventions, metrics and events over a period
    Summary(SummaryArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the report; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::run_analyze(args)?,
        Commands::Compare(args) => commands::run_compare(args)?,
        Commands::Settings(args) => commands::run_settings(args)?,
        Commands::Summary(args) => commands::run_summary(args)?,
    }

    Ok(())
}
