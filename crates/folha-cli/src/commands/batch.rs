//! Batch processing command for multiple files.

use std::cell::OnceCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use folha_core::models::config::FolhaConfig;
use folha_core::{
    DocumentProcessor, ExtractedDocument, FallbackPolicy, OcrProvider, ProcessOptions, ProcessedDocument,
};

use super::output::{OutputFormat, format_document};
use super::{file_source, load_config, ocr_provider};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Guess the document type when classification fails
    #[arg(long)]
    permissive: bool,

    /// Parse OCR text even when the PDF has a text layer
    #[arg(long)]
    force_ocr: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    document: Option<ProcessedDocument>,
    error: Option<String>,
    processing_time_ms: u64,
}

thread_local! {
    // One engine per blocking worker thread, loaded on first use
    static OCR: OnceCell<Box<dyn OcrProvider>> = const { OnceCell::new() };
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Arc::new(load_config(config_path)?);

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "pdf" | "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let options = ProcessOptions {
        policy: if args.permissive {
            FallbackPolicy::Permissive
        } else {
            FallbackPolicy::Strict
        },
        force_ocr: args.force_ocr,
    };

    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let config = Arc::clone(&config);
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let result = process_file(&path, &config, &options);
            pb.inc(1);
            (path, result, file_start.elapsed().as_millis() as u64)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (path, result, processing_time_ms) = handle.await?;

        match result {
            Ok(document) => results.push(ProcessResult {
                path,
                document: Some(document),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        document: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.document.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let names = unique_stems(results.iter().map(|r| r.path.as_path()));
        for (result, output_name) in results.iter().zip(&names) {
            let Some(document) = &result.document else { continue };

            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));
            fs::write(&output_path, format_document(document, args.format, false)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Process one file on the current blocking thread.
fn process_file(
    path: &Path,
    config: &FolhaConfig,
    options: &ProcessOptions,
) -> folha_core::Result<ProcessedDocument> {
    let source = file_source(config);

    OCR.with(|cell| {
        let ocr = cell.get_or_init(|| ocr_provider(config));
        DocumentProcessor::new(&source, ocr.as_ref())
            .with_rasterizer(&source)
            .with_config(config)
            .process(path, options)
    })
}

/// Output file stems, made unique within the batch with a `-N` suffix.
fn unique_stems<'p>(paths: impl IntoIterator<Item = &'p Path>) -> Vec<String> {
    let mut used = HashSet::new();
    paths
        .into_iter()
        .map(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
            let mut name = stem.to_string();
            let mut n = 1;
            while !used.insert(name.clone()) {
                n += 1;
                name = format!("{stem}-{n}");
            }
            if n > 1 {
                warn!("{} shares its name with another input, writing {}", path.display(), name);
            }
            name
        })
        .collect()
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "strategy",
        "period",
        "employee",
        "entries",
        "total",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(processed) = &result.document {
            let (period, employee, entries, total) = match &processed.document {
                ExtractedDocument::TimeCard(card) => {
                    let totals = folha_core::TimeCardTotals::from_work_days(&card.work_days);
                    (
                        card.month_year.clone(),
                        String::new(),
                        card.work_days.len(),
                        totals.hours.to_string(),
                    )
                }
                ExtractedDocument::Payroll(slip) => (
                    slip.period.clone(),
                    slip.employee_name.clone(),
                    slip.item_count(),
                    slip.net_salary.to_string(),
                ),
            };

            wtr.write_record([
                filename,
                "success",
                &processed.document_type.to_string(),
                &format!("{:?}", processed.strategy),
                &period,
                &employee,
                &entries.to_string(),
                &total,
                &processed.trace.warnings().count().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_stems() {
        let paths = [
            Path::new("a/cartao.pdf"),
            Path::new("b/cartao.pdf"),
            Path::new("holerite.pdf"),
            Path::new("c/cartao.png"),
            Path::new("cartao-2.pdf"),
        ];

        assert_eq!(
            unique_stems(paths),
            vec!["cartao", "cartao-2", "holerite", "cartao-3", "cartao-2-2"]
        );
    }
}
