//! `folha`: reads Brazilian time cards ("cartão de ponto") and pay slips
//! ("holerite") from PDFs and scans.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, classify, config, process};

#[derive(Parser)]
#[command(name = "folha", version)]
#[command(about = "Classify time cards and pay slips and extract their records")]
#[command(
    long_about = "Classify time cards (cartão de ponto) and pay slips (holerite) and extract \
                  their records. Text-layer PDFs are parsed directly. Scanned pages go \
                  through OCR. RUST_LOG overrides the -v log level."
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file (default: <config dir>/folha/config.json)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Log directives for the engine and the binary at the `-v` level.
    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,folha_core={level},folha={level}")))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one time card or pay slip as JSON, CSV or text
    Process(process::ProcessArgs),

    /// Extract every file matching a glob, writing one output per file
    Batch(batch::BatchArgs),

    /// Report whether a file is a time card or a pay slip, and why
    Classify(classify::ClassifyArgs),

    /// Show, create or edit the configuration file
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON and CSV, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Classify(args) => classify::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
