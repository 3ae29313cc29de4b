//! Output formats shared by `process` and `batch`.

use serde::Serialize;

use folha_core::models::{PayrollData, TimeCardData};
use folha_core::trace::TraceSeverity;
use folha_core::{ExtractedDocument, ProcessedDocument, ProcessingTrace};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per work day or line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// JSON view of a processed document; the trace is opt-in.
#[derive(Serialize)]
struct Report<'a> {
    path: String,
    document_type: String,
    origin: &'a folha_core::TextOrigin,
    strategy: &'a folha_core::Strategy,
    processing_time_ms: u64,
    #[serde(flatten)]
    document: &'a ExtractedDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a ProcessingTrace>,
}

pub fn format_document(
    result: &ProcessedDocument,
    format: OutputFormat,
    include_trace: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let report = Report {
                path: result.path.display().to_string(),
                document_type: result.document_type.to_string(),
                origin: &result.origin,
                strategy: &result.strategy,
                processing_time_ms: result.processing_time_ms,
                document: &result.document,
                trace: include_trace.then_some(&result.trace),
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Csv => match &result.document {
            ExtractedDocument::TimeCard(card) => time_card_csv(card),
            ExtractedDocument::Payroll(slip) => payroll_csv(slip),
        },
        OutputFormat::Text => Ok(match &result.document {
            ExtractedDocument::TimeCard(card) => time_card_text(card),
            ExtractedDocument::Payroll(slip) => payroll_text(slip),
        }),
    }
}

fn time_card_csv(card: &TimeCardData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "month_year",
        "day",
        "day_of_week",
        "check_in",
        "check_out",
        "interval1",
        "situation",
        "function",
        "atn",
        "overtime_day",
        "overtime_night",
    ])?;

    for day in &card.work_days {
        wtr.write_record([
            day.month_year.as_str(),
            &format!("{:02}", day.day),
            &day.day_of_week,
            day.check_in.as_deref().unwrap_or(""),
            day.check_out.as_deref().unwrap_or(""),
            day.interval1.as_deref().unwrap_or(""),
            &day.situation,
            &day.function,
            &day.atn.to_string(),
            &day.overtime_day.to_string(),
            &day.overtime_night.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn payroll_csv(slip: &PayrollData) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["kind", "code", "description", "quantity", "value", "total"])?;

    let items = slip
        .earnings
        .iter()
        .map(|item| ("earning", item))
        .chain(slip.deductions.iter().map(|item| ("deduction", item)));

    for (kind, item) in items {
        wtr.write_record([
            kind,
            &item.code,
            &item.description,
            &item.quantity.to_string(),
            &item.value.to_string(),
            &item.total().to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn time_card_text(card: &TimeCardData) -> String {
    let mut output = String::new();

    output.push_str(&format!("Time card: {}\n", card.month_year));

    for month in &card.months {
        output.push_str(&format!("\n{} ({} days)\n", month.month_year, month.work_days.len()));
        for day in &month.work_days {
            if day.is_rest() {
                output.push_str(&format!("  {:02} {}  {}\n", day.day, day.day_of_week, day.situation));
                continue;
            }
            output.push_str(&format!(
                "  {:02} {}  {} - {}  ATN {}  HE {} / {}\n",
                day.day,
                day.day_of_week,
                day.check_in.as_deref().unwrap_or("--:--"),
                day.check_out.as_deref().unwrap_or("--:--"),
                day.atn,
                day.overtime_day,
                day.overtime_night
            ));
        }
    }

    let totals = folha_core::TimeCardTotals::from_work_days(&card.work_days);
    output.push_str("\nTotals:\n");
    output.push_str(&format!("  Hours:          {}\n", totals.hours));
    output.push_str(&format!("  Overtime day:   {}\n", totals.overtime_day));
    output.push_str(&format!("  Overtime night: {}\n", totals.overtime_night));

    output
}

fn payroll_text(slip: &PayrollData) -> String {
    let mut output = String::new();

    output.push_str(&format!("Pay slip: {}\n", slip.period));
    output.push_str(&format!("Employee: {}\n", slip.employee_name));

    output.push_str("\nEarnings:\n");
    for item in &slip.earnings {
        output.push_str(&format!("  {:<5} {:<30} {}\n", item.code, item.description, item.total()));
    }

    output.push_str("\nDeductions:\n");
    for item in &slip.deductions {
        output.push_str(&format!("  {:<5} {:<30} {}\n", item.code, item.description, item.total()));
    }

    output.push_str("\nSummary:\n");
    output.push_str(&format!("  Earnings:   {}\n", slip.total_earnings));
    output.push_str(&format!("  Deductions: {}\n", slip.total_deductions));
    output.push_str(&format!("  Net:        {}\n", slip.net_salary));

    output
}

/// Human-readable trace, one event per line.
pub fn format_trace(trace: &ProcessingTrace) -> String {
    trace
        .events
        .iter()
        .map(|event| {
            let marker = match event.severity {
                TraceSeverity::Info => "  ",
                TraceSeverity::Warning => "! ",
                TraceSeverity::Critical => "!!",
            };
            format!("{} {:?}: {}", marker, event.stage, event.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
