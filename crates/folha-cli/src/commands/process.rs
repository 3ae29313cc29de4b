//! Process command - extract data from a single time card or pay slip.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use folha_core::{DocumentProcessor, FallbackPolicy, ProcessOptions};

use super::output::{OutputFormat, format_document, format_trace};
use super::{file_source, load_config, ocr_provider};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Guess the document type when classification fails
    #[arg(long)]
    permissive: bool,

    /// Parse OCR text even when the PDF has a text layer
    #[arg(long)]
    force_ocr: bool,

    /// Include the processing trace
    #[arg(long)]
    show_trace: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Processing {}", args.input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let options = ProcessOptions {
        policy: if args.permissive {
            FallbackPolicy::Permissive
        } else {
            FallbackPolicy::Strict
        },
        force_ocr: args.force_ocr,
    };

    let source = file_source(&config);
    let ocr = ocr_provider(&config);
    let processor = DocumentProcessor::new(&source, ocr.as_ref())
        .with_rasterizer(&source)
        .with_config(&config);

    let result = match processor.process(&args.input, &options) {
        Ok(result) => result,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    pb.finish_and_clear();

    let include_trace = args.show_trace && matches!(args.format, OutputFormat::Json);
    let output = format_document(&result, args.format, include_trace)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    // Non-JSON formats have no place for the trace, so it goes to stderr
    if args.show_trace && !include_trace {
        eprintln!();
        eprintln!("{}", style("Processing trace:").blue());
        eprintln!("{}", format_trace(&result.trace));
    }

    let warnings = result.trace.warnings().count();
    if warnings > 0 && !args.show_trace {
        eprintln!(
            "{} {} warnings recorded, rerun with --show-trace for details",
            style("ℹ").blue(),
            warnings
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
