//! Grammar rules for a single time card day line.
//!
//! A day line looks like `04 TER 08:00 - 17:00 12:00 - 13:00 610 8,00 1,50 0,00 S`:
//! day number, weekday, time intervals, function code, worked hours, daytime
//! and nighttime overtime, situation letter. Extraction is unreliable enough
//! that every column has its own rule, and the rules after interval matching
//! only look at the *tail*: the line with the day prefix and all intervals
//! blanked out.

use chrono::NaiveTime;
use rust_decimal::Decimal;

use crate::error::ExtractionError;
use crate::models::{NumberPolicy, WorkDay};
use crate::rules::{resolve_number, RuleMatch, FUNCTION_CODE, NUMERIC_TOKEN, REST_DAY, SITUATION_CODE, TIME_INTERVAL};

/// A "HH:MM - HH:MM" pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

impl TimeInterval {
    /// Stored form, "start - end".
    pub fn label(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }

    /// Whether the first time is before 12:00. Unreadable times are not.
    pub fn starts_before_noon(&self) -> bool {
        let noon = NaiveTime::from_hms_opt(12, 0, 0);
        match (NaiveTime::parse_from_str(&self.start, "%H:%M"), noon) {
            (Ok(start), Some(noon)) => start < noon,
            _ => false,
        }
    }
}

/// A day line cut out of a month segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLine<'a> {
    pub day: u8,
    pub day_of_week: String,
    /// Full trimmed line, starting with the day prefix.
    pub text: &'a str,
    /// Byte length of the "DD WWW" prefix at the start of `text`.
    pub prefix_len: usize,
}

/// Rest days and holidays carry no times or measures.
pub fn is_rest_day(line: &str) -> bool {
    REST_DAY.is_match(line)
}

/// Every time interval in the line, in order of appearance.
pub fn find_intervals(line: &str) -> Vec<RuleMatch<TimeInterval>> {
    TIME_INTERVAL
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let interval = TimeInterval {
                start: caps[1].to_string(),
                end: caps[2].to_string(),
            };
            Some(RuleMatch::new(interval, whole))
        })
        .collect()
}

/// The line with its day prefix and every interval replaced by spaces.
pub fn line_tail(line: &str, prefix_len: usize, intervals: &[RuleMatch<TimeInterval>]) -> String {
    let mut tail = String::with_capacity(line.len());
    for (i, c) in line.char_indices() {
        let removed = i < prefix_len || intervals.iter().any(|m| m.start() <= i && i < m.end());
        tail.push(if removed { ' ' } else { c });
    }
    tail
}

/// First run of three consecutive digits.
pub fn function_code(tail: &str) -> Option<String> {
    FUNCTION_CODE.find(tail).map(|m| m.as_str().to_string())
}

/// Integer and comma-decimal tokens that can be measures.
///
/// A leading integer token starting with the function code is the function
/// column itself and is skipped.
pub fn numeric_measures<'a>(tail: &'a str, function: Option<&str>) -> Vec<&'a str> {
    let mut tokens: Vec<&str> = NUMERIC_TOKEN.find_iter(tail).map(|m| m.as_str()).collect();

    if let (Some(first), Some(code)) = (tokens.first(), function) {
        if !first.contains(',') && first.starts_with(code) {
            tokens.remove(0);
        }
    }

    tokens
}

/// Trailing standalone `S` or `N`.
pub fn situation_code(tail: &str) -> Option<String> {
    SITUATION_CODE
        .captures(tail.trim_end())
        .map(|caps| caps[1].to_string())
}

/// Parse one day line into a work day.
///
/// Missing columns leave their fields empty or zero; the reason is pushed to
/// `warnings`. Only a number rejected under [`NumberPolicy::Strict`] fails.
pub fn parse_day_line(
    line: &DayLine<'_>,
    month_year: &str,
    policy: NumberPolicy,
    warnings: &mut Vec<String>,
) -> Result<WorkDay, ExtractionError> {
    if is_rest_day(line.text) {
        return Ok(WorkDay::rest(line.day, line.day_of_week.clone(), month_year));
    }

    let mut work_day = WorkDay::new(line.day, line.day_of_week.clone(), month_year);
    let intervals = find_intervals(line.text);

    match intervals.as_slice() {
        [] => {}
        [only] => {
            if only.value.starts_before_noon() {
                work_day.check_in = Some(only.value.start.clone());
                work_day.check_out = Some(only.value.end.clone());
            } else {
                work_day.interval1 = Some(only.value.label());
            }
        }
        [first, second, ..] => {
            work_day.check_in = Some(first.value.start.clone());
            work_day.check_out = Some(first.value.end.clone());
            work_day.interval1 = Some(second.value.label());
        }
    }

    let tail = line_tail(line.text, line.prefix_len, &intervals);
    let function = function_code(&tail);

    let measures = numeric_measures(&tail, function.as_deref());
    if measures.len() >= 3 {
        work_day.atn = measure(measures[0], "atn", line, policy, warnings)?;
        work_day.overtime_day = measure(measures[1], "overtime_day", line, policy, warnings)?;
        work_day.overtime_night = measure(measures[2], "overtime_night", line, policy, warnings)?;
    } else {
        warnings.push(format!(
            "day {:02} ({}): {} numeric tokens, measures left at zero",
            line.day,
            month_year,
            measures.len()
        ));
    }

    work_day.function = function.unwrap_or_default();
    work_day.situation = situation_code(&tail).unwrap_or_default();

    Ok(work_day)
}

fn measure(
    token: &str,
    field: &str,
    line: &DayLine<'_>,
    policy: NumberPolicy,
    warnings: &mut Vec<String>,
) -> Result<Decimal, ExtractionError> {
    let field = format!("day {:02} {}", line.day, field);
    resolve_number(token, &field, policy, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn day_line(text: &str) -> DayLine<'_> {
        let caps = crate::rules::DAY_START.captures(text).unwrap();
        DayLine {
            day: caps[1].parse().unwrap(),
            day_of_week: caps[2].to_string(),
            text,
            prefix_len: caps.get(0).unwrap().end(),
        }
    }

    fn parse(text: &str) -> (WorkDay, Vec<String>) {
        let mut warnings = Vec::new();
        let day = parse_day_line(&day_line(text), "01/2024", NumberPolicy::ZeroFill, &mut warnings).unwrap();
        (day, warnings)
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_glued_intervals() {
        let (day, _) = parse("03 SEG09:50 - 16:0613:45 - 14:00");

        assert_eq!(day.day, 3);
        assert_eq!(day.day_of_week, "SEG");
        assert_eq!(day.check_in.as_deref(), Some("09:50"));
        assert_eq!(day.check_out.as_deref(), Some("16:06"));
        assert_eq!(day.interval1.as_deref(), Some("13:45 - 14:00"));
        assert_eq!(day.interval2, None);
    }

    #[test]
    fn test_full_line_measures() {
        let (day, warnings) = parse("04 TER 08:00 - 17:00 12:00 - 13:00 610 8,00 1,50 0,00 S");

        assert_eq!(day.function, "610");
        assert_eq!(day.atn, dec("8.00"));
        assert_eq!(day.overtime_day, dec("1.50"));
        assert_eq!(day.overtime_night, Decimal::ZERO);
        assert_eq!(day.situation, "S");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_rest_day_ignores_numbers() {
        let (day, _) = parse("07 DOM Descanso Semanal 08:00 - 12:00 610 8,00 2,00 1,00 S");

        assert_eq!(day.situation, "Descanso");
        assert!(day.is_rest());
        assert!(day.is_consistent());
        assert!(day.atn.is_zero());
        assert_eq!(day.check_in, None);

        let (holiday, _) = parse("01 SEG FERIADO");
        assert!(holiday.is_rest());
    }

    #[test]
    fn test_single_interval_morning_heuristic() {
        let (morning, _) = parse("05 QUA 07:30 - 16:30");
        assert_eq!(morning.check_in.as_deref(), Some("07:30"));
        assert_eq!(morning.check_out.as_deref(), Some("16:30"));
        assert_eq!(morning.interval1, None);

        let (afternoon, _) = parse("05 QUA 12:00 - 13:00");
        assert_eq!(afternoon.check_in, None);
        assert_eq!(afternoon.interval1.as_deref(), Some("12:00 - 13:00"));
    }

    #[test]
    fn test_too_few_numbers_zero_fill() {
        let (day, warnings) = parse("06 QUI 08:00 - 17:00 610 8,00");

        assert_eq!(day.function, "610");
        assert!(day.atn.is_zero());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("1 numeric tokens"));
    }

    #[test]
    fn test_tail_excludes_times() {
        let line = "04 TER 08:00 - 17:00 610";
        let intervals = find_intervals(line);
        let tail = line_tail(line, 6, &intervals);

        assert_eq!(tail.trim(), "610");
        assert_eq!(function_code(&tail).as_deref(), Some("610"));
    }

    #[test]
    fn test_numeric_measures_skip_function_column() {
        assert_eq!(numeric_measures(" 610 8,00 1,50 0,00", Some("610")), vec!["8,00", "1,50", "0,00"]);
        assert_eq!(numeric_measures(" 8,00 1,50 0,00", None), vec!["8,00", "1,50", "0,00"]);
        assert_eq!(numeric_measures(" 6100 8,00", Some("610")), vec!["8,00"]);
    }

    #[test]
    fn test_situation_code() {
        assert_eq!(situation_code(" 610 8,00 N ").as_deref(), Some("N"));
        assert_eq!(situation_code(" 610 8,00").as_deref(), None);
        assert_eq!(situation_code(" FALTAS").as_deref(), None);
    }
}
