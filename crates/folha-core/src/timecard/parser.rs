//! Time card parser: month segmentation, day line split, aggregation.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::extraction::{DocumentParser, Extraction, Result};
use crate::models::{NumberPolicy, TextOrigin, TimeCardData};
use crate::rules::{DAY_START, DAY_START_OCR, MONTH_YEAR};

use super::day_line::{parse_day_line, DayLine};

/// The text owned by one "Mês/Ano" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSegment<'a> {
    pub month_year: String,
    pub text: &'a str,
}

/// Split text at every month marker.
///
/// Segment `i` runs from marker `i` to marker `i + 1`, the last one to the end
/// of the text. A single marker owns the whole text, including whatever
/// precedes it. No marker, no segments.
pub fn segment_months(text: &str) -> Vec<MonthSegment<'_>> {
    let markers: Vec<_> = MONTH_YEAR.captures_iter(text).collect();

    if markers.len() == 1 {
        return vec![MonthSegment {
            month_year: markers[0][1].to_string(),
            text,
        }];
    }

    let starts: Vec<usize> = markers
        .iter()
        .filter_map(|caps| caps.get(0).map(|m| m.start()))
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let start = starts[i];
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            MonthSegment {
                month_year: caps[1].to_string(),
                text: &text[start..end],
            }
        })
        .collect()
}

/// Cut a segment into day lines.
///
/// Line `i` runs from day match `i` to day match `i + 1` (or the segment end)
/// and is trimmed. Day numbers outside 1-31 are dropped with a warning.
pub fn split_day_lines<'a>(
    segment: &'a str,
    origin: TextOrigin,
    warnings: &mut Vec<String>,
) -> Vec<DayLine<'a>> {
    let pattern = match origin {
        TextOrigin::Direct => &*DAY_START,
        TextOrigin::Ocr => &*DAY_START_OCR,
    };

    let matches: Vec<_> = pattern.captures_iter(segment).collect();
    let mut lines = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(segment.len());

        let day = match caps[1].parse::<u8>() {
            Ok(day) if (1..=31).contains(&day) => day,
            _ => {
                warnings.push(format!("skipped day line with invalid day number {:?}", &caps[1]));
                continue;
            }
        };

        let text = segment[whole.start()..end].trim();
        lines.push(DayLine {
            day,
            day_of_week: caps[2].to_uppercase(),
            text,
            prefix_len: whole.len(),
        });
    }

    lines
}

/// Time card parser.
#[derive(Debug, Clone, Default)]
pub struct TimeCardParser {
    origin: TextOrigin,
    number_policy: NumberPolicy,
}

impl TimeCardParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text that came from the given source.
    pub fn with_origin(mut self, origin: TextOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_number_policy(mut self, policy: NumberPolicy) -> Self {
        self.number_policy = policy;
        self
    }
}

impl DocumentParser for TimeCardParser {
    type Output = TimeCardData;

    fn parse(&self, text: &str) -> Result<Extraction<TimeCardData>> {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut record = TimeCardData::new();

        info!("Parsing time card from {} characters of text", text.len());

        let segments = segment_months(text);
        if segments.is_empty() {
            warn!("No month marker found in time card text");
            warnings.push("no month/year marker found".to_string());
        }

        for segment in &segments {
            let lines = split_day_lines(segment.text, self.origin, &mut warnings);
            debug!("Month {}: {} day lines", segment.month_year, lines.len());

            for line in &lines {
                let work_day = parse_day_line(line, &segment.month_year, self.number_policy, &mut warnings)?;
                record.push_work_day(work_day);
            }
        }

        if let Some(first) = segments.first() {
            record.month_year = first.month_year.clone();
        }

        debug!(
            "Extracted {} work days in {} months",
            record.work_days.len(),
            record.months.len()
        );

        Ok(Extraction {
            record,
            origin: self.origin,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
