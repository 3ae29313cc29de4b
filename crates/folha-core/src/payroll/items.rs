//! Pay slip line items and the TOTAL line.

use crate::error::ExtractionError;
use crate::models::{NumberPolicy, PayrollItem, TextOrigin};
use crate::rules::{resolve_number, RuleMatch, PAYROLL_ITEM, PAYROLL_ITEM_OCR, TOTAL_LINE};

/// Codes counted as earnings even though they do not start with 0 or 1.
pub const EARNING_CODES: &[&str] = &[
    "0020", "0060", "1000", "1510", "1550", "1554", "1540", "M200", "0043", "0044",
];

/// Whether an item code denotes an earning ("provento").
pub fn is_earning_code(code: &str) -> bool {
    EARNING_CODES.contains(&code) || code.starts_with('0') || code.starts_with('1')
}

/// Raw numbers of a TOTAL line: earnings, then deductions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalLine {
    pub earnings: String,
    pub deductions: String,
}

pub fn find_total_line(text: &str) -> Option<RuleMatch<TotalLine>> {
    let caps = TOTAL_LINE.captures(text)?;
    let whole = caps.get(0)?;
    Some(RuleMatch::new(
        TotalLine {
            earnings: caps[1].to_string(),
            deductions: caps[2].to_string(),
        },
        whole,
    ))
}

/// Scan the whole text for line items, in document order.
///
/// Matches overlapping `exclude` (the TOTAL line) are not items.
pub fn scan_items(
    text: &str,
    origin: TextOrigin,
    exclude: Option<(usize, usize)>,
    policy: NumberPolicy,
    warnings: &mut Vec<String>,
) -> Result<Vec<PayrollItem>, ExtractionError> {
    let pattern = match origin {
        TextOrigin::Direct => &*PAYROLL_ITEM,
        TextOrigin::Ocr => &*PAYROLL_ITEM_OCR,
    };

    let mut items = Vec::new();
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some((start, end)) = exclude {
            if whole.start() < end && start < whole.end() {
                continue;
            }
        }

        let code = caps[1].to_uppercase();
        let quantity = resolve_number(&caps[3], &format!("{code} quantity"), policy, warnings)?;
        let value = resolve_number(&caps[4], &format!("{code} value"), policy, warnings)?;

        items.push(PayrollItem::new(code, caps[2].trim(), quantity, value));
    }

    Ok(items)
}
