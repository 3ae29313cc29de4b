//! Grammar rules shared by the time card and pay slip parsers.

pub mod numbers;
pub mod patterns;
pub mod text;

pub use numbers::{parse_number, resolve_number, try_parse_number};
pub use patterns::*;
pub use text::normalize_text;

/// A rule hit with its location in the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<T> {
    /// Parsed value.
    pub value: T,
    /// Byte span in the scanned text.
    pub position: (usize, usize),
    /// Text that was matched.
    pub source: String,
}

impl<T> RuleMatch<T> {
    pub fn new(value: T, m: regex::Match<'_>) -> Self {
        Self {
            value,
            position: (m.start(), m.end()),
            source: m.as_str().to_string(),
        }
    }

    pub fn start(&self) -> usize {
        self.position.0
    }

    pub fn end(&self) -> usize {
        self.position.1
    }

    /// Whether this match shares any byte with `[start, end)`.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start() < end && start < self.end()
    }
}
