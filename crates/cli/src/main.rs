use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod paper;

use commands::{AssessArgs, RebalanceArgs, RunArgs, SizeArgs, ValidateArgs};

#[derive(Parser)]
#[command(name = "defi-agent")]
#[command(about = "Strategy execution core for a DeFi portfolio agent", long_about = None)]
struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the evaluation scheduler in paper mode
    Run(RunArgs),
    /// Assess portfolio concentration and leverage risk
    Assess(AssessArgs),
    /// Plan trades that bring an allocation back to target
    Rebalance(RebalanceArgs),
    /// Dry-run position size for a configured strategy
    Size(SizeArgs),
    /// Validate every configured strategy
    Validate(ValidateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    match cli.command {
        Commands::Run(args) => commands::run_agent(args).await?,
        Commands::Assess(args) => commands::run_assess(&args)?,
        Commands::Rebalance(args) => commands::run_rebalance(&args)?,
        Commands::Size(args) => commands::run_size(&args)?,
        Commands::Validate(args) => commands::run_validate(&args)?,
    }

    Ok(())
}
