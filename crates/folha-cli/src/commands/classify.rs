//! Classify command - report the document type without extracting.

use std::path::PathBuf;

use clap::Args;
use console::style;

use folha_core::DocumentProcessor;

use super::{file_source, load_config, ocr_provider};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Print the classification as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let source = file_source(&config);
    let ocr = ocr_provider(&config);

    let classification = DocumentProcessor::new(&source, ocr.as_ref())
        .with_rasterizer(&source)
        .with_config(&config)
        .classify(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
        return Ok(());
    }

    let marker = if classification.is_known() {
        style("✓").green()
    } else {
        style("?").yellow()
    };
    println!("{} {}: {}", marker, args.input.display(), classification.summary());

    if !classification.payroll_matches.is_empty() {
        println!("  payroll keywords:   {}", classification.payroll_matches.join(", "));
    }
    if !classification.time_card_matches.is_empty() {
        println!("  time card keywords: {}", classification.time_card_matches.join(", "));
    }

    Ok(())
}
