//! Pay slip ("holerite") extraction.

pub mod items;
mod parser;

pub use items::{find_total_line, is_earning_code, scan_items, TotalLine, EARNING_CODES};
pub use parser::PayrollParser;
