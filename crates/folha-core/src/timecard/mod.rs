//! Time card ("cartão de ponto") extraction.

pub mod day_line;
mod parser;

pub use day_line::{
    find_intervals, function_code, is_rest_day, line_tail, numeric_measures, parse_day_line,
    situation_code, DayLine, TimeInterval,
};
pub use parser::{segment_months, split_day_lines, MonthSegment, TimeCardParser};
